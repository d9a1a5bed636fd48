//! Error types for the wifi-watch-scan crate.
//!
//! Acquisition failures are always recoverable at the scheduler level: they
//! end the current cycle, surface a message on the published view and leave
//! the next cycle free to run. Nothing in the pipeline is fatal.

use thiserror::Error;

/// A specialized `Result` type for acquisition calls.
pub type AcquisitionResult<T> = Result<T, AcquisitionError>;

/// Errors surfaced by a scanning backend during one acquisition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    /// The backend could not be reached (connection refused, DNS, reset).
    #[error("Failed to reach scanning backend: {reason}")]
    Transport {
        /// Human-readable description of what went wrong.
        reason: String,
    },

    /// The acquisition did not finish within the configured bound.
    #[error("Scan timed out after {timeout_ms} ms")]
    Timeout {
        /// The bound that was exceeded, in milliseconds.
        timeout_ms: u64,
    },

    /// The backend answered, but not with a network collection.
    #[error("Unexpected response from backend: {detail}")]
    MalformedResponse {
        /// What was wrong with the response body.
        detail: String,
    },
}

/// Coarse classification of an [`AcquisitionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcquisitionErrorKind {
    /// See [`AcquisitionError::Transport`].
    Transport,
    /// See [`AcquisitionError::Timeout`].
    Timeout,
    /// See [`AcquisitionError::MalformedResponse`].
    MalformedResponse,
}

impl AcquisitionError {
    /// Creates a new transport error.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Creates a new timeout error.
    #[must_use]
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout { timeout_ms }
    }

    /// Creates a new malformed-response error.
    #[must_use]
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            detail: detail.into(),
        }
    }

    /// Returns the coarse kind of this error.
    #[must_use]
    pub fn kind(&self) -> AcquisitionErrorKind {
        match self {
            Self::Transport { .. } => AcquisitionErrorKind::Transport,
            Self::Timeout { .. } => AcquisitionErrorKind::Timeout,
            Self::MalformedResponse { .. } => AcquisitionErrorKind::MalformedResponse,
        }
    }

    /// Returns `true` if the acquisition exceeded its time bound.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Errors raised when validating a [`PollerConfig`](crate::config::PollerConfig).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A value that must be positive was zero.
    #[error("Configuration error: {field} must be greater than zero")]
    Zero {
        /// Name of the offending option.
        field: &'static str,
    },

    /// The configuration source could not be parsed.
    #[error("Configuration error: {message}")]
    Invalid {
        /// Parser diagnostic.
        message: String,
    },
}

/// A hardware address string that is not six hex octets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to parse MAC address from '{input}': expected aa:bb:cc:dd:ee:ff")]
pub struct MacParseError {
    /// The input string that could not be parsed.
    pub input: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_distinct_per_kind() {
        let transport = AcquisitionError::transport("connection refused").to_string();
        let timeout = AcquisitionError::timeout(7000).to_string();
        let malformed = AcquisitionError::malformed("missing `networks`").to_string();

        assert!(transport.contains("connection refused"));
        assert_eq!(timeout, "Scan timed out after 7000 ms");
        assert!(malformed.starts_with("Unexpected response from backend"));
        assert_ne!(transport, malformed);
    }

    #[test]
    fn kind_and_timeout_helpers() {
        assert!(AcquisitionError::timeout(1).is_timeout());
        assert!(!AcquisitionError::transport("x").is_timeout());
        assert_eq!(
            AcquisitionError::malformed("x").kind(),
            AcquisitionErrorKind::MalformedResponse
        );
    }

    #[test]
    fn config_error_names_field() {
        let err = ConfigError::Zero {
            field: "poll_interval_ms",
        };
        assert!(err.to_string().contains("poll_interval_ms"));
    }
}
