//! Client configuration: request origin and per-call timeout.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://britishfasttrack.co.uk/admin/backend/web/v1";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

const BASE_URL_VAR: &str = "DRIVER_API_BASE_URL";
const TIMEOUT_VAR: &str = "DRIVER_API_TIMEOUT_MS";

/// Settings shared read-only by every call a client makes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin every operation path is appended to.
    pub base_url: String,
    /// Applied uniformly to every request.
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Defaults overridden by `DRIVER_API_BASE_URL` and `DRIVER_API_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(base_url) = lookup(BASE_URL_VAR) {
            let trimmed = base_url.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::EmptyBaseUrl);
            }
            config.base_url = trimmed.to_string();
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            config.timeout_ms = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    name: TIMEOUT_VAR,
                    value: raw.clone(),
                })?;
        }

        Ok(config)
    }
}
