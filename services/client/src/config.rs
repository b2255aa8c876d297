//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

const DEFAULT_STORE_URL: &str = "https://project-learn.onrender.com";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub store_url: String,
    pub log_level: Level,
    pub request_timeout: Duration,
    /// Where the remembered username lives.
    pub config_dir: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Progress Store ---
        let store_url = lookup("PROGRESS_STORE_URL")
            .unwrap_or_else(|| DEFAULT_STORE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !(store_url.starts_with("http://") || store_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "PROGRESS_STORE_URL".to_string(),
                format!("'{}' is not an http(s) URL", store_url),
            ));
        }

        let timeout_str = lookup("REQUEST_TIMEOUT_SECS").unwrap_or_else(|| "60".to_string());
        let timeout_secs = timeout_str.parse::<u64>().map_err(|e| {
            ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        // --- Logging ---
        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "WARN".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Local State ---
        let config_dir = match lookup("LEARN_CONFIG_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .map(|dir| dir.join("project-learn"))
                .ok_or_else(|| ConfigError::MissingVar("LEARN_CONFIG_DIR".to_string()))?,
        };

        Ok(Self {
            store_url,
            log_level,
            request_timeout: Duration::from_secs(timeout_secs),
            config_dir,
        })
    }
}
