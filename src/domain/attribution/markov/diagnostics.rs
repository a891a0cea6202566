//! Markov Diagnostics - Advisory reliability scoring for removal-effect credit.
//!
//! Nothing here feeds back into credit values. The verdict only tells a
//! reader how much to trust the data-driven split.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::engine::MarkovOutcome;
use super::transitions::ChainState;
use crate::domain::attribution::ChannelCredit;
use crate::domain::foundation::{round_to, std_dev};

/// Number of transitions reported in `top_transitions`.
pub const TOP_TRANSITIONS: usize = 10;

/// Channel name whose share is watched for last-click leakage.
pub const DIRECT_CHANNEL: &str = "direct";

const MIN_CONVERTED_RELIABLE: usize = 20;
const MIN_JOURNEYS_RELIABLE: usize = 50;
const MIN_UNIQUE_TRANSITIONS: usize = 3;
const MAX_UNIQUE_STATES_DEGENERATE: usize = 2;
const MAX_DIRECT_SHARE: f64 = 0.6;
const MIN_CONVERTED_OK: usize = 100;
const MIN_JOURNEYS_OK: usize = 200;
const MAX_SINGLE_CHANNEL_SHARE: f64 = 0.7;
const MIN_SHARE_STD_DEV: f64 = 0.02;
const MIN_CHANNELS_FOR_UNIFORMITY_CHECK: usize = 4;

/// Categorical trust level for a Markov result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    Ok,
    Warning,
    Unreliable,
}

/// One of the most frequent transitions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionShare {
    pub from: ChainState,
    pub to: ChainState,
    pub count: u64,
    pub share: f64,
}

/// Reliability report for a Markov attribution run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkovDiagnostics {
    pub journeys: usize,
    pub converted_journeys: usize,
    pub unique_states: usize,
    pub unique_transitions: usize,
    pub top_transitions: Vec<TransitionShare>,
    pub channel_shares: BTreeMap<String, f64>,
    pub credit_share_std_dev: f64,
    pub max_channel_share: f64,
    pub direct_share: f64,
    pub baseline_conversion_probability: f64,
    pub removal_effects: BTreeMap<String, f64>,
    pub fell_back_to_linear: bool,
    pub verdict: Reliability,
    pub reasons: Vec<String>,
}

impl MarkovDiagnostics {
    /// Computes diagnostics for an engine outcome.
    ///
    /// Returns `None` instead of failing when any derived figure comes out
    /// non-finite; the caller then omits diagnostics entirely.
    pub fn compute(outcome: &MarkovOutcome) -> Option<Self> {
        let transitions = &outcome.transitions;
        let total_transitions = transitions.total_transitions();

        let mut ranked: Vec<_> = transitions.iter().collect();
        ranked.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| (a.0, a.1).cmp(&(b.0, b.1))));
        let top_transitions = ranked
            .into_iter()
            .take(TOP_TRANSITIONS)
            .map(|(from, to, count)| TransitionShare {
                from: from.clone(),
                to: to.clone(),
                count,
                share: round_to(count as f64 / total_transitions as f64, 4),
            })
            .collect();

        let channel_shares = Self::shares(&outcome.credit);
        let share_values: Vec<f64> = channel_shares.values().copied().collect();
        let credit_share_std_dev = std_dev(&share_values).unwrap_or(0.0);
        let max_channel_share = share_values.iter().copied().fold(0.0, f64::max);
        let direct_share = channel_shares
            .iter()
            .filter(|(channel, _)| channel.eq_ignore_ascii_case(DIRECT_CHANNEL))
            .map(|(_, share)| share)
            .sum::<f64>();

        let figures = [
            credit_share_std_dev,
            max_channel_share,
            direct_share,
            outcome.baseline_probability,
        ];
        if figures.iter().any(|f| !f.is_finite()) {
            return None;
        }

        let mut diagnostics = Self {
            journeys: transitions.journeys(),
            converted_journeys: transitions.converted_journeys(),
            unique_states: transitions.unique_states(),
            unique_transitions: transitions.unique_transitions(),
            top_transitions,
            channel_shares: channel_shares
                .into_iter()
                .map(|(c, s)| (c, round_to(s, 4)))
                .collect(),
            credit_share_std_dev: round_to(credit_share_std_dev, 4),
            max_channel_share: round_to(max_channel_share, 4),
            direct_share: round_to(direct_share, 4),
            baseline_conversion_probability: round_to(outcome.baseline_probability, 4),
            removal_effects: outcome
                .removal_effects
                .iter()
                .map(|(c, e)| (c.clone(), round_to(*e, 4)))
                .collect(),
            fell_back_to_linear: outcome.fallback.is_some(),
            verdict: Reliability::Ok,
            reasons: Vec::new(),
        };
        let (verdict, reasons) = Self::assess(
            &diagnostics,
            credit_share_std_dev,
            max_channel_share,
            direct_share,
            share_values.len(),
        );
        diagnostics.verdict = verdict;
        diagnostics.reasons = reasons;
        Some(diagnostics)
    }

    /// Normalized credit shares per channel.
    fn shares(credit: &ChannelCredit) -> BTreeMap<String, f64> {
        let total: f64 = credit.values().sum();
        if total <= 0.0 {
            return BTreeMap::new();
        }
        credit
            .iter()
            .map(|(channel, value)| (channel.clone(), value / total))
            .collect()
    }

    /// Applies the unreliable / warning thresholds in order.
    fn assess(
        d: &MarkovDiagnostics,
        share_std_dev: f64,
        max_share: f64,
        direct_share: f64,
        channel_count: usize,
    ) -> (Reliability, Vec<String>) {
        let mut unreliable = Vec::new();
        if d.converted_journeys < MIN_CONVERTED_RELIABLE {
            unreliable.push(format!(
                "only {} converted journeys (< {})",
                d.converted_journeys, MIN_CONVERTED_RELIABLE
            ));
        }
        if d.journeys < MIN_JOURNEYS_RELIABLE {
            unreliable.push(format!(
                "only {} journeys (< {})",
                d.journeys, MIN_JOURNEYS_RELIABLE
            ));
        }
        if d.unique_transitions < MIN_UNIQUE_TRANSITIONS {
            unreliable.push(format!(
                "only {} distinct transitions (< {})",
                d.unique_transitions, MIN_UNIQUE_TRANSITIONS
            ));
        }
        if d.unique_states <= MAX_UNIQUE_STATES_DEGENERATE {
            unreliable.push(format!("only {} distinct states", d.unique_states));
        }
        if direct_share >= MAX_DIRECT_SHARE {
            unreliable.push(format!("direct holds {:.0}% of credit", direct_share * 100.0));
        }
        if !unreliable.is_empty() {
            return (Reliability::Unreliable, unreliable);
        }

        let mut warnings = Vec::new();
        if d.converted_journeys < MIN_CONVERTED_OK {
            warnings.push(format!(
                "{} converted journeys (< {})",
                d.converted_journeys, MIN_CONVERTED_OK
            ));
        }
        if d.journeys < MIN_JOURNEYS_OK {
            warnings.push(format!("{} journeys (< {})", d.journeys, MIN_JOURNEYS_OK));
        }
        if max_share >= MAX_SINGLE_CHANNEL_SHARE {
            warnings.push(format!(
                "one channel holds {:.0}% of credit",
                max_share * 100.0
            ));
        }
        if channel_count >= MIN_CHANNELS_FOR_UNIFORMITY_CHECK && share_std_dev < MIN_SHARE_STD_DEV
        {
            warnings.push("credit is split suspiciously evenly".to_string());
        }
        if !warnings.is_empty() {
            return (Reliability::Warning, warnings);
        }

        (Reliability::Ok, Vec::new())
    }
}
