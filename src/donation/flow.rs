//! Transaction submission and confirmation.
//!
//! # Responsibilities
//! - Turn a validated request into a signed, relayed transfer
//! - Poll the signature status until it is definitive or time runs out
//! - Double-check the final record before declaring success
//! - Report every terminal outcome through `OutcomeReporter`
//!
//! # Design Decisions
//! - Wallet, connection, clock and reporter are passed in; nothing ambient
//! - Polling is strictly sequential: one status query in flight at most
//! - No automatic retry anywhere; a relayed transfer is never resubmitted
//! - A status of Confirmed is not trusted alone: the final record can still
//!   carry an execution error detected late

use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::client::Connection;
use crate::blockchain::transaction::TransferInstruction;
use crate::blockchain::types::{
    parse_pubkey, BlockchainResult, ConfirmationStatus, FinalRecord, Pubkey, Signature,
};
use crate::blockchain::wallet::WalletCapability;
use crate::config::schema::{ConfirmationConfig, DonateConfig};
use crate::donation::amount;
use crate::donation::clock::Clock;
use crate::donation::errors::{ConfirmationError, SubmissionError};
use crate::donation::report::{ExplorerLink, Notice, OutcomeReporter};
use crate::donation::types::{DonationOutcome, FlowState, SubmissionResult, TransferRequest};
use crate::observability::metrics;

/// Shortest pause between two status queries.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Polling limits for `await_confirmation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ConfirmationOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(30_000),
            poll_interval: Duration::from_millis(1_000),
        }
    }
}

impl From<&ConfirmationConfig> for ConfirmationOptions {
    fn from(config: &ConfirmationConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }
}

/// Build the transfer and hand it to the wallet for signing and relay.
///
/// The wallet's connected address is read here, on every call. Nothing below
/// this layer guarantees at-most-once delivery: once the wallet has been
/// asked, the transfer may have landed even if an error comes back.
pub async fn submit(
    request: &TransferRequest,
    wallet: &dyn WalletCapability,
    connection: &dyn Connection,
) -> Result<SubmissionResult, SubmissionError> {
    let sender = wallet
        .connected_address()
        .ok_or(SubmissionError::WalletNotConnected)?;

    let instruction = TransferInstruction::new(sender, request.recipient, request.amount.lamports());
    tracing::debug!(
        sender = %sender,
        recipient = %request.recipient,
        lamports = instruction.lamports(),
        "Transfer instruction built"
    );

    let blockhash = connection
        .latest_blockhash()
        .await
        .map_err(SubmissionError::Connection)?;

    tracing::info!(blockhash = %blockhash, "Requesting wallet approval");
    let signature = wallet
        .sign_and_submit(&instruction, &blockhash, connection)
        .await?;

    tracing::info!(signature = %signature, "Transaction sent");
    Ok(SubmissionResult { signature })
}

/// Poll until the signature is definitively landed, failed, or timed out.
///
/// Elapsed time is checked before every query, so a permanently pending
/// signature is queried at most `timeout / poll_interval + 1` times. A query
/// that errors counts as "nothing definitive yet". Intervals shorter than
/// `MIN_POLL_INTERVAL` are raised to it.
pub async fn await_confirmation(
    signature: &Signature,
    connection: &dyn Connection,
    clock: &dyn Clock,
    options: &ConfirmationOptions,
) -> Result<FinalRecord, ConfirmationError> {
    let start = clock.now();
    let poll_interval = options.poll_interval.max(MIN_POLL_INTERVAL);
    let mut ticks = 0u32;

    loop {
        let elapsed = clock.now().saturating_sub(start);
        if elapsed >= options.timeout {
            metrics::record_poll_ticks(ticks);
            tracing::warn!(signature = %signature, ticks, "Confirmation timed out");
            return Err(ConfirmationError::TimedOut {
                elapsed_ms: elapsed.as_millis() as u64,
            });
        }

        ticks += 1;
        match connection.signature_status(signature).await {
            Ok(Some(status)) => match status.confirmation {
                ConfirmationStatus::Failed(reason) => {
                    metrics::record_poll_ticks(ticks);
                    tracing::warn!(signature = %signature, slot = status.slot, %reason, "Execution failed");
                    return Err(ConfirmationError::ExecutionFailed { reason });
                }
                ref landed if landed.is_landed() => {
                    tracing::debug!(signature = %signature, slot = status.slot, status = ?landed, "Status landed");
                    break;
                }
                pending => {
                    tracing::debug!(signature = %signature, tick = ticks, status = ?pending, "Transaction pending");
                }
            },
            Ok(None) => {
                tracing::debug!(signature = %signature, tick = ticks, "Signature not yet seen");
            }
            Err(e) => {
                tracing::warn!(signature = %signature, tick = ticks, error = %e, "Status query failed");
            }
        }

        clock.sleep(poll_interval).await;
    }

    metrics::record_poll_ticks(ticks);

    let record = connection
        .transaction(signature)
        .await
        .map_err(ConfirmationError::Connection)?;

    match record {
        Some(record) => match &record.execution_error {
            Some(reason) => {
                tracing::warn!(signature = %signature, %reason, "Final record carries an execution error");
                Err(ConfirmationError::ExecutionFailed {
                    reason: reason.clone(),
                })
            }
            None => {
                tracing::info!(signature = %signature, slot = record.slot, ticks, "Transaction confirmed");
                Ok(record)
            }
        },
        None => Err(ConfirmationError::ExecutionFailed {
            reason: "transaction record not found".to_string(),
        }),
    }
}

/// End-to-end donation: validate, submit, confirm, report.
///
/// Holds only configuration; every `run` is an independent attempt.
#[derive(Debug, Clone)]
pub struct DonationFlow {
    recipient: Pubkey,
    options: ConfirmationOptions,
    explorer_url: String,
}

impl DonationFlow {
    pub fn new(recipient: Pubkey, options: ConfirmationOptions, explorer_url: impl Into<String>) -> Self {
        Self {
            recipient,
            options,
            explorer_url: explorer_url.into(),
        }
    }

    pub fn from_config(config: &DonateConfig) -> BlockchainResult<Self> {
        let recipient = parse_pubkey(&config.donation.recipient)?;
        Ok(Self::new(
            recipient,
            ConfirmationOptions::from(&config.confirmation),
            config.donation.explorer_url.clone(),
        ))
    }

    pub fn recipient(&self) -> Pubkey {
        self.recipient
    }

    pub fn options(&self) -> &ConfirmationOptions {
        &self.options
    }

    pub fn explorer_link(&self, signature: &Signature) -> ExplorerLink {
        ExplorerLink::for_signature(&self.explorer_url, signature)
    }

    /// Run one attempt. Never returns an error: every failure ends up as a
    /// notice and a `DonationOutcome`.
    pub async fn run(
        &self,
        amount: &str,
        wallet: &dyn WalletCapability,
        connection: &dyn Connection,
        clock: &dyn Clock,
        reporter: &dyn OutcomeReporter,
    ) -> DonationOutcome {
        let attempt = Uuid::new_v4();
        let span = tracing::info_span!("donation", %attempt);

        let outcome = self
            .run_attempt(amount, wallet, connection, clock, reporter)
            .instrument(span)
            .await;

        metrics::record_donation_outcome(outcome.label());
        outcome
    }

    async fn run_attempt(
        &self,
        amount: &str,
        wallet: &dyn WalletCapability,
        connection: &dyn Connection,
        clock: &dyn Clock,
        reporter: &dyn OutcomeReporter,
    ) -> DonationOutcome {
        let mut state = FlowState::Idle;

        advance(&mut state, FlowState::Validating);
        let amount = match amount::validate(amount) {
            Ok(parsed) => parsed,
            Err(e) => {
                advance(&mut state, FlowState::Failed);
                reporter.report(Notice::failure(format!("Please enter a valid amount: {}", e)));
                return DonationOutcome::Invalid(e);
            }
        };

        advance(&mut state, FlowState::Submitting);
        reporter.report(Notice::loading("Processing..."));
        let request = TransferRequest {
            recipient: self.recipient,
            amount,
        };
        let submission = match submit(&request, wallet, connection).await {
            Ok(submission) => submission,
            Err(e) => {
                advance(&mut state, FlowState::Failed);
                tracing::warn!(error = %e, "Submission failed");
                reporter.report(Notice::failure(e.to_string()));
                return DonationOutcome::Rejected(e);
            }
        };
        let signature = submission.signature;
        let link = self.explorer_link(&signature);

        advance(&mut state, FlowState::Polling);
        reporter.report(Notice::loading("Confirming transaction...").with_link(link.clone()));

        match await_confirmation(&signature, connection, clock, &self.options).await {
            Ok(record) => {
                advance(&mut state, FlowState::Confirmed);
                reporter.report(
                    Notice::success(format!("Thank you for your donation of {}!", amount))
                        .with_link(link),
                );
                DonationOutcome::Confirmed { signature, record }
            }
            Err(ConfirmationError::TimedOut { .. }) => {
                advance(&mut state, FlowState::TimedOut);
                reporter.report(
                    Notice::info(format!(
                        "Confirmation is taking longer than expected. Check the explorer for {}",
                        link.label
                    ))
                    .with_link(link),
                );
                DonationOutcome::TimedOut { signature }
            }
            Err(ConfirmationError::Connection(e)) => {
                advance(&mut state, FlowState::TimedOut);
                let reason = e.to_string();
                reporter.report(
                    Notice::info("Could not verify the transaction. Check its status on the explorer")
                        .with_link(link),
                );
                DonationOutcome::Unverified { signature, reason }
            }
            Err(e @ ConfirmationError::ExecutionFailed { .. }) => {
                advance(&mut state, FlowState::Failed);
                reporter.report(Notice::failure(e.to_string()).with_link(link));
                let reason = match e {
                    ConfirmationError::ExecutionFailed { reason } => reason,
                    other => other.to_string(),
                };
                DonationOutcome::Failed { signature, reason }
            }
        }
    }
}

fn advance(state: &mut FlowState, next: FlowState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal transition {} -> {}",
        state,
        next
    );
    tracing::debug!(from = %state, to = %next, "Donation state");
    *state = next;
}
