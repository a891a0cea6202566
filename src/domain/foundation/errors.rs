//! Error types for the domain layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object or option construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Caller-side mistakes that must fail loudly instead of degrading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("Unknown attribution model '{name}'")]
    UnknownModel { name: String },

    #[error("Invalid attribution option: {0}")]
    InvalidOption(#[from] ValidationError),
}

/// Numerical failures inside a single computation.
///
/// These never escape the engine; callers collapse them to a documented
/// fallback value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputationError {
    #[error("Matrix of size {size}x{size} is singular")]
    SingularMatrix { size: usize },

    #[error("Computation produced a non-finite value")]
    NonFiniteValue,
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    InvalidOption,

    // Configuration errors
    UnknownModel,

    // Computation errors
    SingularMatrix,
    NonFiniteValue,

    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidOption => "INVALID_OPTION",
            ErrorCode::UnknownModel => "UNKNOWN_MODEL",
            ErrorCode::SingularMatrix => "SINGULAR_MATRIX",
            ErrorCode::NonFiniteValue => "NON_FINITE_VALUE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
///
/// This is the serializable shape reported back to callers when one model
/// in a batch fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field.clone(),
        };
        DomainError::validation(field, err.to_string())
    }
}

impl From<ConfigurationError> for DomainError {
    fn from(err: ConfigurationError) -> Self {
        match &err {
            ConfigurationError::UnknownModel { name } => {
                DomainError::new(ErrorCode::UnknownModel, err.to_string()).with_detail("model", name)
            }
            ConfigurationError::InvalidOption(_) => {
                DomainError::new(ErrorCode::InvalidOption, err.to_string())
            }
        }
    }
}

impl From<ComputationError> for DomainError {
    fn from(err: ComputationError) -> Self {
        let code = match err {
            ComputationError::SingularMatrix { .. } => ErrorCode::SingularMatrix,
            ComputationError::NonFiniteValue => ErrorCode::NonFiniteValue,
        };
        DomainError::new(code, err.to_string())
    }
}
