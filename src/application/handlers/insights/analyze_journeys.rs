//! JourneyInsights - Path analytics, next-best-action, and uplift in one pass.
//!
//! All three analyses share one dedupe scope, so a duplicated conversion
//! contributes value once across the whole pass.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::revenue::{resolve_journeys, ResolvedJourneys};
use crate::domain::journey::{Journey, StepGranularity};
use crate::domain::paths::{
    CampaignUplift, NextBestActions, PathAnalysis, PathAnalyzer, UpliftEstimator,
};
use crate::ports::{DedupeScope, RevenueResolver};

/// Options for the insights pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightsOptions {
    /// Count non-converted journeys in path statistics.
    #[serde(default = "default_include_non_converted")]
    pub include_non_converted: bool,
    /// Key paths and next steps by `channel:campaign`.
    #[serde(default)]
    pub campaign_level: bool,
}

fn default_include_non_converted() -> bool {
    true
}

impl Default for InsightsOptions {
    fn default() -> Self {
        Self {
            include_non_converted: default_include_non_converted(),
            campaign_level: false,
        }
    }
}

/// Combined output of the insights pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyInsights {
    pub paths: PathAnalysis,
    pub next_best_actions: NextBestActions,
    /// Observational only; never a causal estimate.
    pub uplift: Vec<CampaignUplift>,
}

impl JourneyInsights {
    /// Runs every analysis over `journeys` with a single dedupe scope.
    ///
    /// Uplift is always keyed by campaign step. Paths and next-step
    /// candidates follow `options.campaign_level`.
    pub fn analyze(
        journeys: &[Journey],
        options: &InsightsOptions,
        resolver: &dyn RevenueResolver,
    ) -> Self {
        let mut scope = DedupeScope::new();
        let ResolvedJourneys {
            journeys: resolved,
            distinct_conversions,
        } = resolve_journeys(journeys, resolver, &mut scope);

        let granularity = StepGranularity::from_campaign_flag(options.campaign_level);
        let projected: Vec<Journey> = match granularity {
            StepGranularity::Campaign => resolved
                .iter()
                .map(|j| j.project_steps(granularity))
                .collect(),
            StepGranularity::Channel => resolved.clone(),
        };

        let paths = PathAnalyzer::analyze(&projected, options.include_non_converted);
        let next_best_actions = NextBestActions::build(&resolved, granularity);
        let uplift = UpliftEstimator::estimate(&resolved, StepGranularity::Campaign);

        debug!(
            request_id = %scope.request_id(),
            journeys = journeys.len(),
            distinct_conversions,
            prefixes = next_best_actions.prefix_count(),
            uplift_steps = uplift.len(),
            "Journey insights computed"
        );

        Self {
            paths,
            next_best_actions,
            uplift,
        }
    }
}

/// Handler wrapper holding the revenue resolver.
pub struct JourneyInsightsHandler {
    resolver: Arc<dyn RevenueResolver>,
}

impl JourneyInsightsHandler {
    pub fn new(resolver: Arc<dyn RevenueResolver>) -> Self {
        Self { resolver }
    }

    pub fn analyze(&self, journeys: &[Journey], options: &InsightsOptions) -> JourneyInsights {
        JourneyInsights::analyze(journeys, options, self.resolver.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ConversionValueResolver;
    use crate::domain::journey::Touchpoint;

    fn handler() -> JourneyInsightsHandler {
        JourneyInsightsHandler::new(Arc::new(ConversionValueResolver::new()))
    }

    #[test]
    fn empty_input_yields_empty_insights() {
        let insights = handler().analyze(&[], &InsightsOptions::default());

        assert_eq!(insights.paths.journeys_analyzed, 0);
        assert!(insights.next_best_actions.is_empty());
        assert!(insights.uplift.is_empty());
    }

    #[test]
    fn duplicated_conversion_value_counted_once_across_pass() {
        let journeys = vec![
            Journey::from_channels("c1", &["email", "search"], 90.0, true)
                .with_conversion_id("o-1"),
            Journey::from_channels("c1", &["email", "search"], 90.0, true)
                .with_conversion_id("o-1"),
        ];
        let insights = handler().analyze(&journeys, &InsightsOptions::default());

        let first = insights.next_best_actions.recommend(&[], 1);
        assert_eq!(first[0].step, "email");
        assert_eq!(first[0].count, 2);
        assert_eq!(first[0].conversions, 2);
        assert_eq!(first[0].avg_value_converted, 45.0);
    }

    #[test]
    fn uplift_is_keyed_by_campaign_step() {
        let journeys = vec![
            Journey::converted(
                "c1",
                vec![Touchpoint::new("email").in_campaign("spring")],
                10.0,
            ),
            Journey::non_converted("c2", vec![Touchpoint::new("search")]),
        ];
        let insights = handler().analyze(&journeys, &InsightsOptions::default());

        let steps: Vec<&str> = insights.uplift.iter().map(|u| u.step.as_str()).collect();
        assert!(steps.contains(&"email:spring"));
        assert!(insights.uplift.iter().all(|u| u.methodology == "observational"));
    }

    #[test]
    fn campaign_level_paths_use_campaign_keys() {
        let journeys = vec![Journey::converted(
            "c1",
            vec![
                Touchpoint::new("email").in_campaign("spring"),
                Touchpoint::new("direct"),
            ],
            10.0,
        )];
        let options = InsightsOptions {
            include_non_converted: true,
            campaign_level: true,
        };
        let insights = handler().analyze(&journeys, &options);

        assert_eq!(insights.paths.common_paths[0].path, "email:spring>direct");
        assert_eq!(
            insights.next_best_actions.recommend(&["email:spring"], 5)[0].step,
            "direct"
        );
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: InsightsOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, InsightsOptions::default());
        assert!(options.include_non_converted);
    }
}
