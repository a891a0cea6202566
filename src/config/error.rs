//! Configuration error types

use thiserror::Error;

use crate::domain::foundation::{ConfigurationError, ValidationError as OptionError};

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid attribution option: {0}")]
    InvalidOption(#[from] OptionError),

    #[error("Unknown default model: {0}")]
    UnknownDefaultModel(String),

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),
}

impl From<ConfigurationError> for ValidationError {
    fn from(err: ConfigurationError) -> Self {
        match err {
            ConfigurationError::UnknownModel { name } => ValidationError::UnknownDefaultModel(name),
            ConfigurationError::InvalidOption(inner) => ValidationError::InvalidOption(inner),
        }
    }
}
