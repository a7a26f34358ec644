//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that addresses, URLs and presets actually parse
//! - Validate value ranges (timeouts > 0, interval within timeout)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DonateConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;
use url::Url;

use crate::blockchain::types::parse_pubkey;
use crate::config::schema::DonateConfig;
use crate::donation::amount;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One rejected configuration field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn check_http_url(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &DonateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_http_url("rpc.url", &config.rpc.url, &mut errors);
    for (i, url) in config.rpc.failover_urls.iter().enumerate() {
        check_http_url(&format!("rpc.failover_urls[{}]", i), url, &mut errors);
    }
    if config.rpc.timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.timeout_secs", "must be greater than 0"));
    }

    if let Err(e) = parse_pubkey(&config.donation.recipient) {
        errors.push(ValidationError::new("donation.recipient", e.to_string()));
    }
    for (i, preset) in config.donation.presets.iter().enumerate() {
        if let Err(e) = amount::validate(preset) {
            errors.push(ValidationError::new(
                format!("donation.presets[{}]", i),
                e.to_string(),
            ));
        }
    }
    check_http_url("donation.explorer_url", &config.donation.explorer_url, &mut errors);

    let confirmation = &config.confirmation;
    if confirmation.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "confirmation.poll_interval_ms",
            "must be greater than 0",
        ));
    }
    if confirmation.timeout_ms < confirmation.poll_interval_ms {
        errors.push(ValidationError::new(
            "confirmation.timeout_ms",
            "must be at least poll_interval_ms",
        ));
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", observability.log_level),
        ));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
