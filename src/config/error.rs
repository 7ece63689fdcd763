//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid backend timeout")]
    InvalidTimeout,

    #[error("Invalid navigation delay")]
    InvalidDelay,

    #[error("Invalid limit: {0}")]
    InvalidLimit(&'static str),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}
