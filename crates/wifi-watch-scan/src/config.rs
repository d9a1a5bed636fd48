//! Tuning options for the polling pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for the [`PollingScheduler`](crate::pipeline::PollingScheduler).
///
/// Field names accept both `snake_case` and the `camelCase` spellings used by
/// the dashboard (`pollIntervalMs`, `maxHistoryLength`, `acquisitionTimeoutMs`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Period of the repeating timer, measured from cycle start.
    #[serde(alias = "pollIntervalMs")]
    pub poll_interval_ms: u64,
    /// Maximum number of signal samples kept per network.
    #[serde(alias = "maxHistoryLength")]
    pub max_history_length: usize,
    /// Upper bound on a single acquisition call.
    #[serde(alias = "acquisitionTimeoutMs")]
    pub acquisition_timeout_ms: u64,
}

impl PollerConfig {
    /// Default polling period (10 s).
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;

    /// Default history length per network.
    pub const DEFAULT_MAX_HISTORY_LENGTH: usize = 10;

    /// Default acquisition timeout (7 s).
    pub const DEFAULT_ACQUISITION_TIMEOUT_MS: u64 = 7_000;

    /// Set the polling period in milliseconds.
    #[must_use]
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the per-network history length.
    #[must_use]
    pub fn with_max_history_length(mut self, len: usize) -> Self {
        self.max_history_length = len;
        self
    }

    /// Set the acquisition timeout in milliseconds.
    #[must_use]
    pub fn with_acquisition_timeout_ms(mut self, ms: u64) -> Self {
        self.acquisition_timeout_ms = ms;
        self
    }

    /// The polling period as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// The acquisition timeout as a [`Duration`].
    pub fn acquisition_timeout(&self) -> Duration {
        Duration::from_millis(self.acquisition_timeout_ms)
    }

    /// Parse a configuration from a JSON document. Missing fields keep
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the document is not valid JSON for
    /// this shape, or any error from [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every option is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Zero`] for a zero interval, history length or
    /// timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Zero {
                field: "poll_interval_ms",
            });
        }
        if self.max_history_length == 0 {
            return Err(ConfigError::Zero {
                field: "max_history_length",
            });
        }
        if self.acquisition_timeout_ms == 0 {
            return Err(ConfigError::Zero {
                field: "acquisition_timeout_ms",
            });
        }
        Ok(())
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: Self::DEFAULT_POLL_INTERVAL_MS,
            max_history_length: Self::DEFAULT_MAX_HISTORY_LENGTH,
            acquisition_timeout_ms: Self::DEFAULT_ACQUISITION_TIMEOUT_MS,
        }
    }
}
