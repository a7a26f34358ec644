//! Donation subsystem.
//!
//! # Data Flow
//! ```text
//! amount text
//!     → amount.rs (validate → ParsedAmount)
//!     → flow.rs::submit (wallet check → instruction → blockhash → sign & relay)
//!     → flow.rs::await_confirmation (status polling → final record check)
//!     → report.rs (notices to whoever is listening)
//! ```

pub mod amount;
pub mod clock;
pub mod errors;
pub mod flow;
pub mod report;
pub mod types;

pub use amount::{validate, ParsedAmount, ValidationError};
pub use clock::{Clock, ManualClock, TokioClock};
pub use errors::{ConfirmationError, SubmissionError};
pub use flow::{await_confirmation, submit, ConfirmationOptions, DonationFlow};
pub use report::{format_error_message, ConsoleReporter, Notice, NoticeLevel, OutcomeReporter, TracingReporter};
pub use types::{DonationOutcome, FlowState, SubmissionResult, TransferRequest};
