//! Adapters - Implementations of port interfaces.
//!
//! - `revenue` - Revenue resolvers

pub mod revenue;

pub use revenue::ConversionValueResolver;
