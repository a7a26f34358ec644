//! Donation flow error taxonomy.
//!
//! - `ValidationError` (in `amount`): bad input, fix and resubmit
//! - `SubmissionError`: nothing definitive happened on-chain, not retried
//! - `ConfirmationError`: a signature exists; the transfer failed, or its
//!   fate is unknown

use thiserror::Error;

use crate::blockchain::types::BlockchainError;
use crate::blockchain::wallet::WalletError;

pub use crate::donation::amount::ValidationError;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Please connect your wallet first")]
    WalletNotConnected,

    /// The recent blockhash could not be fetched; nothing was signed.
    #[error("Could not reach the network: {0}")]
    Connection(#[source] BlockchainError),

    /// User cancel, insufficient funds, node rejection.
    #[error("{0}")]
    SubmitRejected(String),
}

impl From<WalletError> for SubmissionError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::NotConnected => SubmissionError::WalletNotConnected,
            other => SubmissionError::SubmitRejected(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfirmationError {
    /// The chain reported an execution error, either in a status query or in
    /// the final record.
    #[error("Transaction failed on-chain ({reason}) - please check the explorer for details")]
    ExecutionFailed { reason: String },

    /// No definitive status before the deadline. Not a failure: the
    /// transaction may still land.
    #[error("Transaction confirmation timed out after {elapsed_ms} ms - please check the explorer")]
    TimedOut { elapsed_ms: u64 },

    /// Status looked landed but the final record could not be fetched.
    #[error("Could not verify transaction: {0}")]
    Connection(#[source] BlockchainError),
}
