//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Donation flow and RPC client produce:
//!     → logging.rs (structured log events, one span per attempt)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stderr
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
