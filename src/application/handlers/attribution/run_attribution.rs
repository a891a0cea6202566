//! RunAttributionHandler - Query handler for a single attribution model.
//!
//! Filters to converted journeys with at least one touchpoint, resolves totals through the revenue port
//! with one dedupe scope for the whole call, dispatches to the model, and
//! assembles the rounded result.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::revenue::{resolve_journeys, ResolvedJourneys};
use crate::domain::attribution::{
    AttributionModel, AttributionOptions, AttributionResult, ChannelCredit, HeuristicModels,
    MarkovAttribution, MarkovDiagnostics, MarkovFallback, PositionBasedModel, TimeDecayModel,
};
use crate::domain::foundation::ConfigurationError;
use crate::domain::journey::{Journey, StepGranularity};
use crate::ports::{DedupeScope, RevenueResolver};

/// Query to run one model over a set of journeys.
#[derive(Debug, Clone)]
pub struct RunAttributionQuery {
    pub journeys: Vec<Journey>,
    pub model: AttributionModel,
    pub options: AttributionOptions,
}

/// Handler for single-model attribution.
pub struct RunAttributionHandler {
    resolver: Arc<dyn RevenueResolver>,
}

impl RunAttributionHandler {
    pub fn new(resolver: Arc<dyn RevenueResolver>) -> Self {
        Self { resolver }
    }

    pub fn handle(&self, query: &RunAttributionQuery) -> Result<AttributionResult, ConfigurationError> {
        self.run_attribution(&query.journeys, query.model, &query.options)
    }

    /// Runs `model` over `journeys`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidOption` when `options` fail
    /// validation. Data problems never error; they follow the documented
    /// fallbacks.
    pub fn run_attribution(
        &self,
        journeys: &[Journey],
        model: AttributionModel,
        options: &AttributionOptions,
    ) -> Result<AttributionResult, ConfigurationError> {
        options.validate()?;

        let granularity = StepGranularity::from_campaign_flag(options.campaign_level);
        let projected: Vec<Journey> = match granularity {
            StepGranularity::Campaign => journeys
                .iter()
                .map(|j| j.project_steps(granularity))
                .collect(),
            StepGranularity::Channel => journeys.to_vec(),
        };

        let mut scope = DedupeScope::new();
        let ResolvedJourneys {
            journeys: population,
            distinct_conversions: total_conversions,
        } = resolve_journeys(&projected, self.resolver.as_ref(), &mut scope);
        let converted: Vec<Journey> = population
            .iter()
            .filter(|j| j.converted && !j.is_empty())
            .cloned()
            .collect();
        let total_value: f64 = converted.iter().map(|j| j.conversion_value).sum();

        debug!(
            request_id = %scope.request_id(),
            model = %model,
            journeys = journeys.len(),
            conversions = total_conversions,
            total_value,
            campaign_level = options.campaign_level,
            "Running attribution"
        );

        let (credit, markov) = match model {
            AttributionModel::LastTouch => (HeuristicModels::last_touch(&converted), None),
            AttributionModel::FirstTouch => (HeuristicModels::first_touch(&converted), None),
            AttributionModel::Linear => (HeuristicModels::linear(&converted), None),
            AttributionModel::TimeDecay => (
                TimeDecayModel::attribute(&converted, options.half_life_days),
                None,
            ),
            AttributionModel::PositionBased => (
                PositionBasedModel::attribute(&converted, options.first_pct, options.last_pct),
                None,
            ),
            AttributionModel::Markov => {
                let (credit, extras) = Self::run_markov(&population, options, &scope);
                (credit, Some(extras))
            }
        };

        let result = AttributionResult::assemble(model, credit, total_conversions, total_value);
        Ok(match markov {
            Some((diagnostics, fallback)) => result
                .with_diagnostics(diagnostics)
                .with_fallback(fallback),
            None => result,
        })
    }

    /// Parses `name` and runs that model.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::UnknownModel` for an unrecognized name.
    pub fn run_attribution_by_name(
        &self,
        journeys: &[Journey],
        name: &str,
        options: &AttributionOptions,
    ) -> Result<AttributionResult, ConfigurationError> {
        let model: AttributionModel = name.parse()?;
        self.run_attribution(journeys, model, options)
    }

    fn run_markov(
        population: &[Journey],
        options: &AttributionOptions,
        scope: &DedupeScope,
    ) -> (ChannelCredit, (Option<MarkovDiagnostics>, Option<MarkovFallback>)) {
        let outcome = MarkovAttribution::attribute(population, options.max_markov_channels);

        match &outcome.fallback {
            Some(MarkovFallback::NonPositiveBaseline) => warn!(
                request_id = %scope.request_id(),
                baseline = outcome.baseline_probability,
                "Markov baseline is not positive, using linear credit"
            ),
            Some(MarkovFallback::TooManyChannels { channels, limit }) => warn!(
                request_id = %scope.request_id(),
                channels,
                limit,
                "Too many channels for Markov removal effects, using linear credit"
            ),
            None => {}
        }

        let diagnostics = if options.include_diagnostics {
            let diagnostics = MarkovDiagnostics::compute(&outcome);
            if diagnostics.is_none() {
                debug!(request_id = %scope.request_id(), "Markov diagnostics omitted");
            }
            diagnostics
        } else {
            None
        };

        let fallback = outcome.fallback.clone();
        (outcome.credit, (diagnostics, fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ConversionValueResolver;
    use crate::domain::attribution::Reliability;
    use crate::domain::journey::Touchpoint;

    fn handler() -> RunAttributionHandler {
        RunAttributionHandler::new(Arc::new(ConversionValueResolver::new()))
    }

    fn ab_journey() -> Vec<Journey> {
        vec![Journey::from_channels("c1", &["A", "B"], 100.0, true)]
    }

    fn run(model: AttributionModel) -> AttributionResult {
        handler()
            .run_attribution(&ab_journey(), model, &AttributionOptions::default())
            .unwrap()
    }

    #[test]
    fn linear_splits_two_touch_journey() {
        let result = run(AttributionModel::Linear);
        assert_eq!(result.credit_for("A"), 50.0);
        assert_eq!(result.credit_for("B"), 50.0);
        assert_eq!(result.total_conversions, 1);
        assert_eq!(result.total_value, 100.0);
    }

    #[test]
    fn last_touch_credits_b() {
        let result = run(AttributionModel::LastTouch);
        assert_eq!(result.channel_credit.len(), 1);
        assert_eq!(result.credit_for("B"), 100.0);
        assert_eq!(result.channels[0].attributed_share, 1.0);
        assert_eq!(result.channels[0].attributed_conversions, 1.0);
    }

    #[test]
    fn position_based_defaults_split_evenly() {
        let result = run(AttributionModel::PositionBased);
        assert_eq!(result.credit_for("A"), 50.0);
        assert_eq!(result.credit_for("B"), 50.0);
    }

    #[test]
    fn non_converted_journeys_excluded_from_rule_models() {
        let journeys = vec![
            Journey::from_channels("c1", &["A"], 100.0, true),
            Journey::from_channels("c2", &["B"], 900.0, false),
        ];
        let result = handler()
            .run_attribution(&journeys, AttributionModel::Linear, &AttributionOptions::default())
            .unwrap();

        assert_eq!(result.total_conversions, 1);
        assert_eq!(result.total_value, 100.0);
        assert_eq!(result.credit_for("B"), 0.0);
    }

    #[test]
    fn markov_attaches_diagnostics() {
        let result = run(AttributionModel::Markov);
        let diagnostics = result.diagnostics.as_ref().unwrap();

        assert_eq!(diagnostics.verdict, Reliability::Unreliable);
        assert!(result.fallback.is_none());
        assert_eq!(result.credit_for("A"), 50.0);
    }

    #[test]
    fn markov_diagnostics_can_be_disabled() {
        let options = AttributionOptions {
            include_diagnostics: false,
            ..AttributionOptions::default()
        };
        let result = handler()
            .run_attribution(&ab_journey(), AttributionModel::Markov, &options)
            .unwrap();
        assert!(result.diagnostics.is_none());
    }

    #[test]
    fn markov_without_conversions_degrades_to_linear() {
        let journeys = vec![Journey::from_channels("c1", &["A", "B"], 0.0, false)];
        let result = handler()
            .run_attribution(&journeys, AttributionModel::Markov, &AttributionOptions::default())
            .unwrap();

        assert_eq!(result.fallback, Some(MarkovFallback::NonPositiveBaseline));
        assert!(result.channel_credit.is_empty());
        assert_eq!(result.model, AttributionModel::Markov);
    }

    #[test]
    fn unknown_model_name_is_a_hard_error() {
        let err = handler()
            .run_attribution_by_name(&ab_journey(), "shapley", &AttributionOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownModel {
                name: "shapley".to_string()
            }
        );
    }

    #[test]
    fn invalid_options_are_rejected() {
        let options = AttributionOptions::default().with_half_life_days(-1.0);
        let err = handler()
            .run_attribution(&ab_journey(), AttributionModel::TimeDecay, &options)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidOption(_)));
    }

    #[test]
    fn campaign_level_rewrites_channel_keys() {
        let journeys = vec![Journey::converted(
            "c1",
            vec![
                Touchpoint::new("email").in_campaign("welcome"),
                Touchpoint::new("direct"),
            ],
            80.0,
        )];
        let options = AttributionOptions::default().at_campaign_level();
        let result = handler()
            .run_attribution(&journeys, AttributionModel::FirstTouch, &options)
            .unwrap();

        assert_eq!(result.credit_for("email:welcome"), 80.0);
        assert_eq!(result.channels[0].channel, "email:welcome");
    }

    #[test]
    fn duplicate_conversion_is_counted_once() {
        let journeys = vec![
            Journey::from_channels("c1", &["A"], 60.0, true).with_conversion_id("o-1"),
            Journey::from_channels("c1", &["B"], 60.0, true).with_conversion_id("o-1"),
        ];
        let result = handler()
            .run_attribution(&journeys, AttributionModel::Linear, &AttributionOptions::default())
            .unwrap();

        assert_eq!(result.total_value, 60.0);
        assert_eq!(result.total_conversions, 1);
        assert_eq!(result.credit_for("A"), 60.0);
        assert_eq!(result.credit_for("B"), 0.0);
        assert_eq!(result.channels[0].attributed_conversions, 1.0);
    }

    #[test]
    fn repeated_fingerprint_does_not_inflate_conversions() {
        let journeys = vec![
            Journey::converted("c1", vec![Touchpoint::new("A").at("2024-01-01")], 40.0),
            Journey::converted("c1", vec![Touchpoint::new("B").at("2024-01-01")], 40.0),
            Journey::converted("c2", vec![Touchpoint::new("C").at("2024-01-02")], 0.0),
        ];
        let result = handler()
            .run_attribution(&journeys, AttributionModel::LastTouch, &AttributionOptions::default())
            .unwrap();

        assert_eq!(result.total_conversions, 2);
        assert_eq!(result.total_value, 40.0);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let journeys = vec![
            Journey::from_channels("c1", &["A", "B", "C"], 30.0, true).with_conversion_id("1"),
            Journey::from_channels("c2", &["C", "B"], 0.0, false),
            Journey::from_channels("c3", &["B"], 12.5, true).with_conversion_id("2"),
        ];
        let h = handler();
        for model in AttributionModel::all() {
            let first = h.run_attribution(&journeys, *model, &AttributionOptions::default());
            let second = h.run_attribution(&journeys, *model, &AttributionOptions::default());
            assert_eq!(first, second, "model {}", model);
        }
    }

    #[test]
    fn handle_runs_query() {
        let query = RunAttributionQuery {
            journeys: ab_journey(),
            model: AttributionModel::FirstTouch,
            options: AttributionOptions::default(),
        };
        let result = handler().handle(&query).unwrap();
        assert_eq!(result.credit_for("A"), 100.0);
    }
}
