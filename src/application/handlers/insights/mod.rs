//! Insights handlers - Path analytics, next-best-action, and uplift.

mod analyze_journeys;

pub use analyze_journeys::{InsightsOptions, JourneyInsights, JourneyInsightsHandler};
