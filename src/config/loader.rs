//! Configuration loading from and saving to disk.
//!
//! JSON is the native format; a `.toml` extension switches to TOML.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use crate::config::schema::{BalancerConfig, DEFAULT_PORT};
use crate::config::validation::{join_errors, validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

/// Load and validate configuration from a JSON (or TOML) file.
pub fn load_config(path: &Path) -> Result<BalancerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut config: BalancerConfig = if is_toml(path) {
        toml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    if config.port.trim().is_empty() {
        config.port = DEFAULT_PORT.to_string();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Persist configuration, picking the format from the file extension.
pub fn save_config(path: &Path, config: &BalancerConfig) -> Result<(), ConfigError> {
    let content = if is_toml(path) {
        toml::to_string_pretty(config)?
    } else {
        serde_json::to_string_pretty(config)?
    };

    fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
