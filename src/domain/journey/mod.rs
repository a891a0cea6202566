//! Journey Module - Validated touchpoint and journey records.
//!
//! Records are validated once at the deserialization boundary (defaulted
//! channel, lenient timestamps) so the attribution core only ever sees
//! these types.

#[allow(clippy::module_inception)]
mod journey;
mod touchpoint;

pub use journey::Journey;
pub use touchpoint::{StepGranularity, Touchpoint, CAMPAIGN_SEPARATOR, UNKNOWN_CHANNEL};
