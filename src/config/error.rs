//! Configuration Error Types

use thiserror::Error;

/// Configuration-related errors with detailed context
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A configuration source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {error}")]
    ValidationError { error: String },

    /// `cache.scope` names no known backend
    #[error("Unknown cache scope '{0}' (expected 'in-process' or 'shared')")]
    UnknownCacheScope(String),
}

impl ConfigurationError {
    /// Create a validation error
    pub fn validation_error<S: Into<String>>(error: S) -> Self {
        Self::ValidationError {
            error: error.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(err: config::ConfigError) -> Self {
        Self::LoadError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigurationError>;
