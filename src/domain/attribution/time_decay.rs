//! Time-decay model - exponential decay toward the converting touch.

use super::ChannelCredit;
use crate::domain::foundation::Timestamp;
use crate::domain::journey::{Journey, Touchpoint};

/// Exponential half-life attribution.
pub struct TimeDecayModel;

impl TimeDecayModel {
    /// Attributes each journey's value by normalized decay weights.
    pub fn attribute(journeys: &[Journey], half_life_days: f64) -> ChannelCredit {
        let mut credit = ChannelCredit::new();
        for journey in journeys {
            let weights = Self::weights(&journey.touchpoints, half_life_days);
            for (tp, weight) in journey.touchpoints.iter().zip(weights) {
                *credit.entry(tp.channel.clone()).or_insert(0.0) +=
                    journey.conversion_value * weight;
            }
        }
        credit
    }

    /// Per-touchpoint weights, normalized to sum to 1.
    ///
    /// # Algorithm
    /// With at least one parsable timestamp, weight = 2^(-d / half_life)
    /// where d is days before the last touchpoint. Touchpoints with a missing
    /// or malformed timestamp inherit the nearest earlier parsed time (or the
    /// first parsed time when none precedes them). Negative gaps count as 0.
    ///
    /// With no parsable timestamp at all, weight = 2^(-(n-1-i) / max(n/2, 1)).
    ///
    /// # Edge Cases
    /// - Empty slice: Returns empty Vec
    pub fn weights(touchpoints: &[Touchpoint], half_life_days: f64) -> Vec<f64> {
        if touchpoints.is_empty() {
            return Vec::new();
        }

        let raw = match Self::effective_timestamps(touchpoints) {
            Some(times) => {
                let reference = times[times.len() - 1];
                times
                    .iter()
                    .map(|t| {
                        let days = reference.days_since(t).max(0.0);
                        2f64.powf(-days / half_life_days)
                    })
                    .collect::<Vec<_>>()
            }
            None => Self::positional_weights(touchpoints.len()),
        };

        let total: f64 = raw.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            let even = 1.0 / touchpoints.len() as f64;
            return vec![even; touchpoints.len()];
        }
        raw.into_iter().map(|w| w / total).collect()
    }

    /// Position-only decay used when no timestamp can be parsed.
    fn positional_weights(n: usize) -> Vec<f64> {
        let scale = (n as f64 / 2.0).max(1.0);
        (0..n)
            .map(|i| 2f64.powf(-((n - 1 - i) as f64) / scale))
            .collect()
    }

    /// Parsed timestamps with gaps filled, or `None` if nothing parses.
    fn effective_timestamps(touchpoints: &[Touchpoint]) -> Option<Vec<Timestamp>> {
        let parsed: Vec<Option<Timestamp>> =
            touchpoints.iter().map(Touchpoint::parsed_timestamp).collect();
        let mut carried = parsed.iter().flatten().next().copied()?;

        Some(
            parsed
                .into_iter()
                .map(|ts| {
                    if let Some(t) = ts {
                        carried = t;
                    }
                    carried
                })
                .collect(),
        )
    }
}
