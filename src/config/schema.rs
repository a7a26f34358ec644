//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the donation
//! client. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Public mainnet endpoint used when nothing else is configured.
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Environment variable overriding `rpc.url`.
pub const RPC_URL_ENV_VAR: &str = "SOLANA_RPC_URL";

/// Donation recipient.
pub const DEFAULT_RECIPIENT: &str = "5sVDFVziSqhKXsPTKKknKnUgmzoxPytGuPtdSfpLQMSB";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DonateConfig {
    /// Network endpoint settings.
    pub rpc: RpcConfig,

    /// Recipient, suggested amounts and explorer links.
    pub donation: DonationConfig,

    /// Confirmation polling.
    pub confirmation: ConfirmationConfig,

    /// Where the signing key lives.
    pub wallet: WalletConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl DonateConfig {
    /// Apply `SOLANA_RPC_URL` if set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(RPC_URL_ENV_VAR).filter(|u| !u.trim().is_empty()) {
            tracing::debug!(rpc_url = %url, "RPC URL overridden from environment");
            self.rpc.url = url;
        }
    }
}

/// Commitment level requested from the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        };
        f.write_str(s)
    }
}

/// JSON-RPC connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// RPC request timeout in seconds.
    pub timeout_secs: u64,

    /// Commitment for reads and preflight.
    pub commitment: Commitment,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            failover_urls: Vec::new(),
            timeout_secs: 10,
            commitment: Commitment::Confirmed,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DonationConfig {
    /// Base58 address receiving donations.
    pub recipient: String,

    /// Suggested amounts in SOL, offered as presets.
    pub presets: Vec<String>,

    /// Explorer transaction URL prefix; the signature is appended.
    pub explorer_url: String,
}

impl Default for DonationConfig {
    fn default() -> Self {
        Self {
            recipient: DEFAULT_RECIPIENT.to_string(),
            presets: vec!["0.1".to_string(), "0.5".to_string(), "1".to_string()],
            explorer_url: "https://solscan.io/tx".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Give up polling after this long.
    pub timeout_ms: u64,

    /// Pause between status queries.
    pub poll_interval_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            poll_interval_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WalletConfig {
    /// Solana CLI keypair file. Falls back to `SOL_DONATE_KEYPAIR` when unset.
    pub keypair_path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
