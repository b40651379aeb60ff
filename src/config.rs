//! Configuration for HTTP-backed lazy files

use crate::error::{LazyError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Settings for the HTTP range provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LazyConfig {
    /// Timeout for a whole request in seconds (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for establishing a connection in seconds (default: 10)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum number of retries for a failed fetch (default: 3)
    /// Valid range: 0 to 10
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Backoff before the first retry in milliseconds, doubled for each
    /// further retry (default: 100)
    #[serde(default = "default_retry_base_backoff")]
    pub retry_base_backoff_ms: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Fail size discovery when the origin does not advertise
    /// `Accept-Ranges: bytes` (default: false)
    #[serde(default)]
    pub require_accept_ranges: bool,
}

// Default value functions for serde
fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_base_backoff() -> u64 {
    100
}

fn default_user_agent() -> String {
    format!("lazyfile/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for LazyConfig {
    fn default() -> Self {
        LazyConfig {
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_retries: default_max_retries(),
            retry_base_backoff_ms: default_retry_base_backoff(),
            user_agent: default_user_agent(),
            require_accept_ranges: false,
        }
    }
}

impl LazyConfig {
    /// Load configuration from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Returns
    /// * `Ok(LazyConfig)` if loading and validation succeed
    /// * `Err(LazyError)` if file cannot be read or config is invalid
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            LazyError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: LazyConfig = serde_yaml::from_str(content).map_err(|e| {
            LazyError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Validation Rules
    /// - both timeouts must be > 0
    /// - max_retries must be <= 10
    /// - retry_base_backoff_ms must be <= 60000
    /// - user_agent must not be empty
    pub fn validate(&self) -> Result<()> {
        const MAX_RETRIES: usize = 10;
        const MAX_BACKOFF_MS: u64 = 60_000;

        if self.request_timeout_secs == 0 {
            return Err(LazyError::ConfigError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.connect_timeout_secs == 0 {
            return Err(LazyError::ConfigError(
                "connect_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.max_retries > MAX_RETRIES {
            return Err(LazyError::ConfigError(format!(
                "max_retries must be at most {}, got {}",
                MAX_RETRIES, self.max_retries
            )));
        }

        if self.retry_base_backoff_ms > MAX_BACKOFF_MS {
            return Err(LazyError::ConfigError(format!(
                "retry_base_backoff_ms must be at most {}, got {}",
                MAX_BACKOFF_MS, self.retry_base_backoff_ms
            )));
        }

        if self.user_agent.trim().is_empty() {
            return Err(LazyError::ConfigError(
                "user_agent must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
