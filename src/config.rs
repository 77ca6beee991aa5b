//! Application configuration loaded from environment variables.
//!
//! The engine itself is configuration-light: season rules live on the
//! `Season` records, so only transport and collaborator settings are read
//! from the environment.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Base URL of the external fitness source API.
    /// When unset, external workout fetching is disabled.
    pub fitness_source_url: Option<String>,
    /// Per-player timeout for external workout fetches (seconds).
    pub fitness_fetch_timeout_secs: u64,
    /// Allowed CORS origin for browser clients.
    pub frontend_url: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            fitness_source_url: None,
            fitness_fetch_timeout_secs: 10,
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            fitness_source_url: env::var("FITNESS_SOURCE_URL")
                .ok()
                .map(|v| v.trim_end_matches('/').to_string()),
            fitness_fetch_timeout_secs: match env::var("FITNESS_FETCH_TIMEOUT_SECS") {
                Ok(v) => v
                    .parse()
                    .map_err(|_| ConfigError::Invalid("FITNESS_FETCH_TIMEOUT_SECS", v))?,
                Err(_) => 10,
            },
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
