//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the config file to load.
pub const CONFIG_PATH_ENV: &str = "PROXY_CONFIG";

/// Environment variable carrying the static upstream API key. When set it
/// overrides any `upstream.api_key` from the config file.
pub const API_KEY_ENV: &str = "SONAUTO_API_KEY";

const DEFAULT_CONFIG_PATH: &str = "proxy.toml";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Resolve, load, and validate the process configuration.
///
/// The file named by `PROXY_CONFIG` is used when set; otherwise `proxy.toml`
/// in the working directory when present; otherwise built-in defaults. The
/// `SONAUTO_API_KEY` environment override is applied before validation.
pub fn load() -> Result<ProxyConfig, ConfigError> {
    let config = match env::var_os(CONFIG_PATH_ENV) {
        Some(path) => read_config(Path::new(&path))?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                read_config(default_path)?
            } else {
                ProxyConfig::default()
            }
        }
    };

    let config = with_api_key_override(config, env::var(API_KEY_ENV).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a specific TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

fn with_api_key_override(mut config: ProxyConfig, key: Option<String>) -> ProxyConfig {
    if let Some(key) = key.filter(|k| !k.is_empty()) {
        config.upstream.api_key = Some(key);
    }
    config
}
