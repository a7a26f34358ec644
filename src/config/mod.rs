//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → SOLANA_RPC_URL override
//!     → validation.rs (semantic checks)
//!     → DonateConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; running without a file is supported
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::ConfirmationConfig;
pub use schema::DonateConfig;
pub use schema::DonationConfig;
pub use schema::RpcConfig;
