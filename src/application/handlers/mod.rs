//! Application handlers.
//!
//! Query handlers that orchestrate domain operations over one request.

pub mod attribution;
pub mod insights;

pub use attribution::{AllModelRuns, RunAllModelsHandler, RunAttributionHandler, RunAttributionQuery};
pub use insights::{InsightsOptions, JourneyInsights, JourneyInsightsHandler};
