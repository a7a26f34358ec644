//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Keypair file / environment variable
//!     → wallet.rs (connected address, signing)
//!     → transaction.rs (System transfer instruction and message)
//!     → client.rs (JSON-RPC: blockhash, relay, status, record)
//! ```
//!
//! # Security Constraints
//! - Secret keys ONLY from a keypair file or environment variable
//! - Never log secret key material
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{Connection, RpcClient};
pub use transaction::TransferInstruction;
pub use types::{
    BlockchainError, ConfirmationStatus, FinalRecord, Hash, Pubkey, Signature, SignatureStatus,
};
pub use wallet::{KeypairWallet, WalletCapability, WalletError};
