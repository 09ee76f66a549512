//! Core error types for lanepace-core.
//!
//! Engine commands never fail for ordinary misuse (bad lane index, empty
//! series); those are no-ops. Errors are reserved for configuration,
//! validation of interval parameters and a dead engine task.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lanepace-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Engine runtime errors
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not resolve a directory for the config file
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Dot-path key does not exist
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors for interval and lane parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Repetition count below one
    #[error("Interval set needs at least one repetition, got {0}")]
    NoRepetitions(u32),

    /// Work time zero, negative or not finite
    #[error("Work time must be a positive number of seconds, got {0}")]
    InvalidWorkTime(f64),

    /// Rest time negative or not finite
    #[error("Rest time must be zero or more seconds, got {0}")]
    InvalidRestTime(f64),

    /// Series generator called with zero steps
    #[error("Series generation needs at least one step")]
    NoSteps,
}

/// Errors surfaced by the async engine handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine task has exited and no longer accepts commands
    #[error("Engine task is no longer running")]
    Closed,
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
