//! Application layer - Queries and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Each top-level call owns its own revenue dedupe scope.

mod error;
pub mod handlers;
mod revenue;

pub use error::AttributionError;
pub use handlers::{
    AllModelRuns, InsightsOptions, JourneyInsights, JourneyInsightsHandler, RunAllModelsHandler,
    RunAttributionHandler, RunAttributionQuery,
};
pub use revenue::{resolve_journeys, ResolvedJourneys};
