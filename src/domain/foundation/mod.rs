//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, numeric helpers, and error types
//! that form the vocabulary of the attribution domain.

mod errors;
mod numeric;
mod timestamp;

pub use errors::{ComputationError, ConfigurationError, DomainError, ErrorCode, ValidationError};
pub use numeric::{mean, percentile, round_to, safe_ratio, std_dev};
pub use timestamp::Timestamp;
