//! Application-level error aggregate.

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::foundation::{
    ComputationError, ConfigurationError, DomainError, ErrorCode, ValidationError,
};

/// Any failure surfaced by an attribution request or the binary around it.
#[derive(Debug, Error)]
pub enum AttributionError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Computation(#[from] ComputationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read journeys: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed journey input: {0}")]
    Input(#[from] serde_json::Error),
}

impl From<AttributionError> for DomainError {
    fn from(err: AttributionError) -> Self {
        match err {
            AttributionError::Configuration(e) => e.into(),
            AttributionError::Validation(e) => e.into(),
            AttributionError::Computation(e) => e.into(),
            other => DomainError::new(ErrorCode::InternalError, other.to_string()),
        }
    }
}
