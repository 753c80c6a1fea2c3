//! Core error types for countdown-core.
//!
//! Every timer error is a caller-contract violation: it is reported to the
//! caller of the offending operation and the engine keeps its prior state.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::TimerStatus;

/// Core error type for countdown-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timer engine errors
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the countdown engine and its collaborators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimerError {
    /// Duration must be a positive number of seconds
    #[error("invalid duration: {0} (must be a positive number of seconds)")]
    InvalidDuration(i64),

    /// Interval must be positive unless notifications are disabled
    #[error("invalid notification interval: {0} (must be positive or \"disabled\")")]
    InvalidInterval(i64),

    /// Progress tracker scale must be positive and finite
    #[error("invalid progress scale: {0}")]
    InvalidScale(f64),

    /// Reconfiguration attempted while the countdown is running
    #[error("configuration is locked while the timer is running")]
    ConfigLocked,

    /// Start requested while the clock is already pulsing
    #[error("timer is already active")]
    AlreadyActive,

    /// Operation not supported from the current status
    #[error("cannot {action} while {status}")]
    InvalidTransition {
        action: &'static str,
        status: TimerStatus,
    },

    /// The runtime task has shut down
    #[error("timer runtime has stopped")]
    RuntimeStopped,
}

/// Configuration-file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_names_action_and_status() {
        let err = TimerError::InvalidTransition {
            action: "pause",
            status: TimerStatus::Idle,
        };
        assert_eq!(err.to_string(), "cannot pause while idle");
    }

    #[test]
    fn timer_error_converts_into_core_error() {
        let err: CoreError = TimerError::ConfigLocked.into();
        assert!(matches!(err, CoreError::Timer(TimerError::ConfigLocked)));
        assert!(err.to_string().contains("locked"));
    }
}
