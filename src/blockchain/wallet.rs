//! Wallet capability and a keypair-file implementation.
//!
//! # Security
//! - Secret key bytes come only from a keypair file or an environment variable
//! - Keys are never logged or serialized
//! - Connection state can be flipped from anywhere at any time; callers must
//!   re-read `connected_address` instead of caching it

use async_trait::async_trait;
use solana_sdk::signature::{keypair_from_seed, Keypair, Signer};
use solana_sdk::transaction::Transaction;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::blockchain::client::Connection;
use crate::blockchain::transaction::TransferInstruction;
use crate::blockchain::types::{BlockchainError, BlockchainResult, Hash, Pubkey, Signature};

/// Environment variable holding a keypair as a JSON byte array.
pub const KEYPAIR_ENV_VAR: &str = "SOL_DONATE_KEYPAIR";

/// Reasons a wallet declines or fails to sign and relay a transfer.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Wallet not connected")]
    NotConnected,

    /// The user or the wallet refused to sign.
    #[error("{0}")]
    Rejected(String),

    /// Signing went through but relaying it did not.
    #[error("Transaction failed: {0}")]
    Transport(String),
}

/// External, user-controlled signing agent.
#[async_trait]
pub trait WalletCapability: Send + Sync {
    /// Public address of the connected account, if any.
    fn connected_address(&self) -> Option<Pubkey>;

    /// Sign the transfer anchored at `blockhash` and relay it through `connection`.
    async fn sign_and_submit(
        &self,
        instruction: &TransferInstruction,
        blockhash: &Hash,
        connection: &dyn Connection,
    ) -> Result<Signature, WalletError>;
}

/// Wallet backed by a local ed25519 keypair.
pub struct KeypairWallet {
    keypair: Keypair,
    connected: AtomicBool,
}

impl KeypairWallet {
    /// Create a wallet from raw key bytes.
    ///
    /// Accepts the 64-byte keypair layout (secret || public) written by the
    /// Solana CLI, or a bare 32-byte secret.
    pub fn from_bytes(bytes: &[u8]) -> BlockchainResult<Self> {
        if bytes.len() != 64 && bytes.len() != 32 {
            return Err(BlockchainError::Wallet(format!(
                "Invalid keypair length: expected 64 or 32 bytes, got {}",
                bytes.len()
            )));
        }

        let keypair = keypair_from_seed(&bytes[..32])
            .map_err(|e| BlockchainError::Wallet(format!("Invalid keypair: {}", e)))?;
        if bytes.len() == 64 && keypair.pubkey().as_ref() != &bytes[32..] {
            return Err(BlockchainError::Wallet(
                "Invalid keypair: public half does not match the secret".to_string(),
            ));
        }

        tracing::info!(address = %keypair.pubkey(), "Wallet initialized");

        Ok(Self {
            keypair,
            connected: AtomicBool::new(true),
        })
    }

    /// Parse a JSON byte array such as `[12,34,...]`.
    pub fn from_json(text: &str) -> BlockchainResult<Self> {
        let bytes: Vec<u8> = serde_json::from_str(text.trim())
            .map_err(|e| BlockchainError::Wallet(format!("Invalid keypair format: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Load a keypair file.
    pub fn from_file(path: &Path) -> BlockchainResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BlockchainError::Wallet(format!("Cannot read keypair {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    /// Load wallet from environment variable.
    ///
    /// Reads `SOL_DONATE_KEYPAIR` from environment.
    pub fn from_env() -> BlockchainResult<Self> {
        let text = std::env::var(KEYPAIR_ENV_VAR).map_err(|_| {
            BlockchainError::Wallet(format!("Environment variable {} not set", KEYPAIR_ENV_VAR))
        })?;
        Self::from_json(&text)
    }

    pub fn address(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn connect(&self) {
        self.connected.store(true, Ordering::SeqCst);
        tracing::info!(address = %self.address(), "Wallet connected");
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        tracing::info!(address = %self.address(), "Wallet disconnected");
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Sign the transfer without relaying it.
    pub fn sign(
        &self,
        instruction: &TransferInstruction,
        blockhash: &Hash,
    ) -> Result<Transaction, WalletError> {
        let mut transaction = instruction.unsigned_transaction(blockhash);
        transaction
            .try_sign(&[&self.keypair], *blockhash)
            .map_err(|e| WalletError::Rejected(format!("Signing failed: {}", e)))?;
        Ok(transaction)
    }
}

#[async_trait]
impl WalletCapability for KeypairWallet {
    fn connected_address(&self) -> Option<Pubkey> {
        self.is_connected().then(|| self.address())
    }

    async fn sign_and_submit(
        &self,
        instruction: &TransferInstruction,
        blockhash: &Hash,
        connection: &dyn Connection,
    ) -> Result<Signature, WalletError> {
        if !self.is_connected() {
            return Err(WalletError::NotConnected);
        }
        if instruction.sender() != self.address() {
            return Err(WalletError::Rejected(format!(
                "Fee payer {} is not this wallet ({})",
                instruction.sender(),
                self.address()
            )));
        }

        let transaction = self.sign(instruction, blockhash)?;
        tracing::debug!(signature = %transaction.signatures[0], lamports = instruction.lamports(), "Transfer signed");

        connection
            .send_transaction(&transaction)
            .await
            .map_err(|e| match e {
                BlockchainError::Rpc(message) => WalletError::Transport(message),
                other => WalletError::Transport(other.to_string()),
            })
    }
}

impl std::fmt::Debug for KeypairWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypairWallet")
            .field("address", &self.address())
            .field("connected", &self.is_connected())
            .finish()
    }
}
