//! Chain-specific types and error definitions.

use serde::{Serialize, Serializer};
use solana_transaction_status::TransactionConfirmationStatus;
use thiserror::Error;

pub use solana_sdk::hash::Hash;
pub use solana_sdk::pubkey::Pubkey;
pub use solana_sdk::signature::Signature;

// Re-export RpcConfig from config module to avoid duplication
pub use crate::config::schema::{Commitment, RpcConfig};

/// Number of lamports (the chain's minor unit) in one SOL.
pub use solana_sdk::native_token::LAMPORTS_PER_SOL;

/// Parse a base58 account address.
pub fn parse_pubkey(value: &str) -> BlockchainResult<Pubkey> {
    value
        .trim()
        .parse()
        .map_err(|e| BlockchainError::InvalidAddress(format!("address '{}': {}", value, e)))
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Every endpoint timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Malformed base58 key, blockhash or signature.
    #[error("Invalid {0}")]
    InvalidAddress(String),

    /// The node answered with something we could not interpret.
    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    /// Keypair loading or signing failed.
    #[error("Wallet error: {0}")]
    Wallet(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Network-reported provisional state of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Unknown to the node yet, or only processed.
    Pending,
    /// Voted on by a supermajority of the cluster.
    Confirmed,
    /// Rooted; cannot be rolled back.
    Finalized,
    /// Executed with an error.
    Failed(String),
}

impl ConfirmationStatus {
    /// Map the `confirmationStatus` / `err` pair of a status query.
    pub fn from_rpc(
        confirmation_status: Option<&TransactionConfirmationStatus>,
        err: Option<String>,
    ) -> Self {
        if let Some(reason) = err {
            return Self::Failed(reason);
        }
        match confirmation_status {
            Some(TransactionConfirmationStatus::Confirmed) => Self::Confirmed,
            Some(TransactionConfirmationStatus::Finalized) => Self::Finalized,
            Some(TransactionConfirmationStatus::Processed) | None => Self::Pending,
        }
    }

    /// Whether the status is good enough to go fetch the final record.
    pub fn is_landed(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Finalized)
    }
}

/// One answer to a signature status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureStatus {
    pub slot: u64,
    pub confirmation: ConfirmationStatus,
}

/// Authoritative transaction record fetched once the status looks good.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalRecord {
    #[serde(serialize_with = "as_base58")]
    pub signature: Signature,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub fee: Option<u64>,
    /// Execution error recorded in the transaction metadata, if any.
    pub execution_error: Option<String>,
}

impl FinalRecord {
    pub fn is_success(&self) -> bool {
        self.execution_error.is_none()
    }
}

fn as_base58<S: Serializer>(signature: &Signature, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPIENT: &str = "5sVDFVziSqhKXsPTKKknKnUgmzoxPytGuPtdSfpLQMSB";

    #[test]
    fn test_parse_pubkey() {
        let address = parse_pubkey(&format!(" {} ", RECIPIENT)).unwrap();
        assert_eq!(address.to_string(), RECIPIENT);

        let err = parse_pubkey("not-base58!").unwrap_err();
        assert!(err.to_string().contains("address"));
        assert!(parse_pubkey("abc").is_err());
    }

    #[test]
    fn test_confirmation_status_mapping() {
        assert_eq!(
            ConfirmationStatus::from_rpc(Some(&TransactionConfirmationStatus::Processed), None),
            ConfirmationStatus::Pending
        );
        assert_eq!(
            ConfirmationStatus::from_rpc(Some(&TransactionConfirmationStatus::Confirmed), None),
            ConfirmationStatus::Confirmed
        );
        assert_eq!(
            ConfirmationStatus::from_rpc(Some(&TransactionConfirmationStatus::Finalized), None),
            ConfirmationStatus::Finalized
        );
        assert_eq!(ConfirmationStatus::from_rpc(None, None), ConfirmationStatus::Pending);

        let status = ConfirmationStatus::from_rpc(
            Some(&TransactionConfirmationStatus::Confirmed),
            Some("InstructionError(0, Custom(1))".to_string()),
        );
        assert!(matches!(status, ConfirmationStatus::Failed(ref reason) if reason.contains("Custom")));
        assert!(!status.is_landed());
    }

    #[test]
    fn test_final_record_serializes_signature_as_base58() {
        let signature = Signature::from([4u8; 64]);
        let record = FinalRecord {
            signature,
            slot: 1,
            block_time: None,
            fee: Some(5000),
            execution_error: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["signature"], signature.to_string());
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");
    }
}
