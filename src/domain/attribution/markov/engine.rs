//! Removal-effect attribution over the absorbing chain.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::absorbing_chain::AbsorbingChain;
use super::transitions::TransitionCounts;
use crate::domain::attribution::{ChannelCredit, HeuristicModels};
use crate::domain::journey::Journey;

/// Why the engine handed the journeys to the Linear model instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum MarkovFallback {
    /// The chain never reaches `conversion` from `start`.
    NonPositiveBaseline,
    /// Too many channels for `k + 1` dense solves.
    TooManyChannels { channels: usize, limit: usize },
}

/// Everything the engine produced for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkovOutcome {
    pub credit: ChannelCredit,
    pub transitions: TransitionCounts,
    pub baseline_probability: f64,
    /// Raw `max(baseline - p_without_channel, 0)` per channel.
    pub removal_effects: BTreeMap<String, f64>,
    pub fallback: Option<MarkovFallback>,
}

/// Data-driven attribution by channel removal effect.
pub struct MarkovAttribution;

impl MarkovAttribution {
    /// Runs the engine.
    ///
    /// `journeys` must be the full population: non-converted journeys shape
    /// the transition probabilities, converted ones also supply the value
    /// that gets distributed.
    ///
    /// # Algorithm
    /// 1. Count transitions over `start -> channels -> conversion|null`
    /// 2. baseline = P(conversion | start) on the full chain
    /// 3. effect(c) = max(baseline - P(conversion | start, c removed), 0)
    /// 4. credit(c) = effect(c) / Σ effects × total converted value
    ///
    /// # Edge Cases
    /// - Singular `I - Q`: that evaluation counts as probability 0
    /// - baseline <= 0, or more channels than `max_channels`: Linear credit
    /// - Σ effects = 0: empty credit
    pub fn attribute(journeys: &[Journey], max_channels: usize) -> MarkovOutcome {
        let transitions = TransitionCounts::from_journeys(journeys);
        let converted: Vec<Journey> = journeys
            .iter()
            .filter(|j| j.converted && !j.is_empty())
            .cloned()
            .collect();

        let channel_count = transitions.channels().len();
        if channel_count > max_channels {
            return Self::linear_fallback(
                &converted,
                transitions,
                0.0,
                MarkovFallback::TooManyChannels {
                    channels: channel_count,
                    limit: max_channels,
                },
            );
        }

        let baseline = Self::probability(&transitions, None);
        if baseline <= 0.0 {
            return Self::linear_fallback(
                &converted,
                transitions,
                baseline,
                MarkovFallback::NonPositiveBaseline,
            );
        }

        let removal_effects: BTreeMap<String, f64> = transitions
            .channels()
            .iter()
            .map(|channel| {
                let without = Self::probability(&transitions, Some(channel));
                (channel.clone(), (baseline - without).max(0.0))
            })
            .collect();

        let total_value: f64 = converted.iter().map(|j| j.conversion_value).sum();
        let total_effect: f64 = removal_effects.values().sum();

        let credit = if total_effect > 0.0 {
            removal_effects
                .iter()
                .map(|(channel, effect)| (channel.clone(), effect / total_effect * total_value))
                .collect()
        } else {
            ChannelCredit::new()
        };

        MarkovOutcome {
            credit,
            transitions,
            baseline_probability: baseline,
            removal_effects,
            fallback: None,
        }
    }

    /// Conversion probability with an optional channel removed; 0.0 when
    /// the solve fails.
    pub fn probability(transitions: &TransitionCounts, excluded: Option<&str>) -> f64 {
        AbsorbingChain::build(transitions, excluded)
            .conversion_probability()
            .unwrap_or(0.0)
    }

    fn linear_fallback(
        converted: &[Journey],
        transitions: TransitionCounts,
        baseline: f64,
        reason: MarkovFallback,
    ) -> MarkovOutcome {
        MarkovOutcome {
            credit: HeuristicModels::linear(converted),
            transitions,
            baseline_probability: baseline,
            removal_effects: BTreeMap::new(),
            fallback: Some(reason),
        }
    }
}
