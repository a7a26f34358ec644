//! Donation attempt types.

use std::fmt;

use crate::blockchain::types::{FinalRecord, Pubkey, Signature};
use crate::donation::amount::{ParsedAmount, ValidationError};
use crate::donation::errors::SubmissionError;

/// What the user asked to send, after validation.
///
/// The sender is deliberately absent: it is read from the wallet at the
/// moment of submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    pub recipient: Pubkey,
    pub amount: ParsedAmount,
}

/// Outcome of a successful submission call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub signature: Signature,
}

/// Per-attempt state machine.
///
/// ```text
/// Idle → Validating → Submitting → Polling → {Confirmed, Failed, TimedOut}
///            │             │
///            └─────────────┴──────────────→ Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Validating,
    Submitting,
    Polling,
    Confirmed,
    Failed,
    TimedOut,
}

impl FlowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed | Self::TimedOut)
    }

    pub fn can_transition_to(self, next: FlowState) -> bool {
        use FlowState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Submitting)
                | (Validating, Failed)
                | (Submitting, Polling)
                | (Submitting, Failed)
                | (Polling, Confirmed)
                | (Polling, Failed)
                | (Polling, TimedOut)
        )
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowState::Idle => "idle",
            FlowState::Validating => "validating",
            FlowState::Submitting => "submitting",
            FlowState::Polling => "polling",
            FlowState::Confirmed => "confirmed",
            FlowState::Failed => "failed",
            FlowState::TimedOut => "timed_out",
        };
        f.write_str(s)
    }
}

/// Terminal result of one donation attempt.
#[derive(Debug)]
pub enum DonationOutcome {
    /// Input rejected before anything was sent.
    Invalid(ValidationError),
    /// Nothing reached the network, or the wallet refused.
    Rejected(SubmissionError),
    /// Landed without execution error.
    Confirmed {
        signature: Signature,
        record: FinalRecord,
    },
    /// The chain accepted and then rejected the transfer.
    Failed { signature: Signature, reason: String },
    /// No definitive status within the timeout; may still land.
    TimedOut { signature: Signature },
    /// Status looked good but the record could not be fetched.
    Unverified { signature: Signature, reason: String },
}

impl DonationOutcome {
    /// State the machine stopped in.
    pub fn final_state(&self) -> FlowState {
        match self {
            Self::Invalid(_) | Self::Rejected(_) | Self::Failed { .. } => FlowState::Failed,
            Self::Confirmed { .. } => FlowState::Confirmed,
            Self::TimedOut { .. } | Self::Unverified { .. } => FlowState::TimedOut,
        }
    }

    /// Signature, once a submission went out.
    pub fn signature(&self) -> Option<&Signature> {
        match self {
            Self::Invalid(_) | Self::Rejected(_) => None,
            Self::Confirmed { signature, .. }
            | Self::Failed { signature, .. }
            | Self::TimedOut { signature }
            | Self::Unverified { signature, .. } => Some(signature),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    /// Label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "invalid",
            Self::Rejected(_) => "rejected",
            Self::Confirmed { .. } => "confirmed",
            Self::Failed { .. } => "failed",
            Self::TimedOut { .. } => "timed_out",
            Self::Unverified { .. } => "unverified",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            FlowState::Idle,
            FlowState::Validating,
            FlowState::Submitting,
            FlowState::Polling,
            FlowState::Confirmed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [FlowState::Confirmed, FlowState::Failed, FlowState::TimedOut] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(FlowState::Idle));
            assert!(!terminal.can_transition_to(FlowState::Polling));
        }
    }

    #[test]
    fn test_no_skipping_submission() {
        assert!(!FlowState::Validating.can_transition_to(FlowState::Polling));
        assert!(!FlowState::Submitting.can_transition_to(FlowState::TimedOut));
    }

    #[test]
    fn test_outcome_states() {
        let sig = Signature::from([3u8; 64]);
        let outcome = DonationOutcome::TimedOut { signature: sig };
        assert_eq!(outcome.final_state(), FlowState::TimedOut);
        assert_eq!(outcome.signature(), Some(&sig));
        assert!(!outcome.is_success());

        let outcome = DonationOutcome::Invalid(ValidationError::NonPositive);
        assert_eq!(outcome.final_state(), FlowState::Failed);
        assert_eq!(outcome.signature(), None);
        assert_eq!(outcome.label(), "invalid");
    }
}
