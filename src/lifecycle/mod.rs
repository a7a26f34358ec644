//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Subscribers stop waiting; an in-flight donation outcome is dropped
//! ```
//!
//! Dropping a donation attempt never cancels a transfer that was already
//! relayed. It only stops anyone from hearing how it ended.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
