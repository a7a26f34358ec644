//! Solana donation client library.
//!
//! Validates an amount, relays a native transfer through a wallet
//! capability and follows it to a definitive outcome.

pub mod blockchain;
pub mod config;
pub mod donation;
pub mod lifecycle;
pub mod observability;

pub use config::schema::DonateConfig;
pub use donation::DonationFlow;
pub use lifecycle::Shutdown;
