//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::DonateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
///
/// Environment overrides are applied before validation so an override is
/// held to the same rules as the file.
pub fn load_config(path: &Path) -> Result<DonateConfig, ConfigError> {
    let config = read_config(path)?;
    finish(config, None)
}

/// Load `path` when given, otherwise start from defaults.
///
/// `rpc_url` comes from the command line and wins over both the file and
/// `SOLANA_RPC_URL`.
pub fn load_or_default(
    path: Option<&Path>,
    rpc_url: Option<&str>,
) -> Result<DonateConfig, ConfigError> {
    let config = match path {
        Some(path) => read_config(path)?,
        None => DonateConfig::default(),
    };
    finish(config, rpc_url)
}

fn read_config(path: &Path) -> Result<DonateConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

fn finish(mut config: DonateConfig, rpc_url: Option<&str>) -> Result<DonateConfig, ConfigError> {
    config.apply_env_overrides();
    if let Some(url) = rpc_url {
        tracing::debug!(rpc_url = %url, "RPC URL overridden from command line");
        config.rpc.url = url.to_string();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
