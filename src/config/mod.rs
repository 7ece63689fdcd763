//! Application configuration module
//!
//! Configuration is read from an optional TOML file and then from environment
//! variables using the `config` and `dotenvy` crates. Variables carry the
//! `CIVIC_SECRETARY` prefix and nested values use double underscores.
//!
//! # Example
//!
//! ```no_run
//! use civic_secretary::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Backend timeout: {:?}", config.secretary.backend_timeout());
//! ```

mod error;
mod logging;
mod secretary;

pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use secretary::SecretaryConfig;

use serde::Deserialize;
use std::path::Path;

const ENV_PREFIX: &str = "CIVIC_SECRETARY";

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable config.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Conversation engine settings
    #[serde(default)]
    pub secretary: SecretaryConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CIVIC_SECRETARY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `CIVIC_SECRETARY__SECRETARY__BACKEND_TIMEOUT_MS=2000` -> `secretary.backend_timeout_ms = 2000`
    /// - `CIVIC_SECRETARY__LOGGING__JSON=true` -> `logging.json = true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load configuration from a file, with environment variables layered on top.
    ///
    /// The format follows the file extension (`.toml`, `.json`, ...).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or malformed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.secretary.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::default()
        .prefix(ENV_PREFIX)
        .separator("__")
}
