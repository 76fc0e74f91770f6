//! Runtime configuration for the API client.
//!
//! Resolution order: CLI flag > environment (including `.env`) > default.

use std::time::Duration;

use thiserror::Error;

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "ORDERDESK_API_URL";

/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "ORDERDESK_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("ORDERDESK_TIMEOUT_SECS must be a positive number of seconds, got {0:?}")]
    InvalidTimeout(String),
}

/// Settings the `ApiClient` is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: CONNECT_TIMEOUT,
        }
    }

    /// Build the config from an explicit URL override and the process environment.
    pub fn resolve(url_override: Option<String>) -> Result<Self, ConfigError> {
        Self::resolve_with(url_override, |key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::resolve`] with an injectable variable lookup.
    pub fn resolve_with<F>(url_override: Option<String>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |url: &String| !url.trim().is_empty();
        let base_url = url_override
            .filter(non_empty)
            .or_else(|| lookup(API_URL_ENV).filter(non_empty))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout = match lookup(TIMEOUT_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            base_url,
            timeout,
            connect_timeout: CONNECT_TIMEOUT,
        })
    }
}
