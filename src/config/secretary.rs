//! Conversation engine configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Timing and sizing knobs for the conversation engine.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SecretaryConfig {
    /// Pause before a completed intent hands off to the host, in milliseconds
    #[serde(default = "default_navigation_delay")]
    pub navigation_delay_ms: u64,

    /// Upper bound on any single backend call, in milliseconds
    #[serde(default = "default_backend_timeout")]
    pub backend_timeout_ms: u64,

    /// Most category chips shown at once
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    /// Most picker entries shown at once
    #[serde(default = "default_max_typeahead_options")]
    pub max_typeahead_options: usize,

    /// Shortest accepted issue description, in characters
    #[serde(default = "default_min_description_chars")]
    pub min_description_chars: usize,
}

impl SecretaryConfig {
    pub fn navigation_delay(&self) -> Duration {
        Duration::from_millis(self.navigation_delay_ms)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }

    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend_timeout_ms == 0 || self.backend_timeout_ms > 60_000 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.navigation_delay_ms > 10_000 {
            return Err(ValidationError::InvalidDelay);
        }
        if self.max_suggestions == 0 {
            return Err(ValidationError::InvalidLimit("max_suggestions"));
        }
        if self.max_typeahead_options == 0 {
            return Err(ValidationError::InvalidLimit("max_typeahead_options"));
        }
        if self.min_description_chars == 0 {
            return Err(ValidationError::InvalidLimit("min_description_chars"));
        }
        Ok(())
    }
}

impl Default for SecretaryConfig {
    fn default() -> Self {
        Self {
            navigation_delay_ms: default_navigation_delay(),
            backend_timeout_ms: default_backend_timeout(),
            max_suggestions: default_max_suggestions(),
            max_typeahead_options: default_max_typeahead_options(),
            min_description_chars: default_min_description_chars(),
        }
    }
}

fn default_navigation_delay() -> u64 {
    800
}

fn default_backend_timeout() -> u64 {
    5_000
}

fn default_max_suggestions() -> usize {
    6
}

fn default_max_typeahead_options() -> usize {
    50
}

fn default_min_description_chars() -> usize {
    5
}
