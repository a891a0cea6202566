//! Revenue resolver adapters.
//!
//! ## Available Adapters
//!
//! - `ConversionValueResolver` - Uses the journey's own conversion value,
//!   deduplicated by conversion id

mod conversion_value;

pub use conversion_value::ConversionValueResolver;
