//! Position-based (U-shaped) model.

use super::ChannelCredit;
use crate::domain::journey::Journey;

/// Weights the first and last touches, spreading the rest over the middle.
pub struct PositionBasedModel;

impl PositionBasedModel {
    /// Attributes each journey's value by position.
    ///
    /// # Algorithm
    /// - n = 1: the single touch takes everything
    /// - n = 2: value split `first_pct : last_pct`, renormalized to the full value
    /// - n >= 3: first gets `first_pct`, last gets `last_pct`, interior touches
    ///   split `1 - first_pct - last_pct` evenly
    pub fn attribute(journeys: &[Journey], first_pct: f64, last_pct: f64) -> ChannelCredit {
        let mut credit = ChannelCredit::new();
        for journey in journeys {
            let shares = Self::shares(journey.len(), first_pct, last_pct);
            for (channel, share) in journey.channels().zip(shares) {
                *credit.entry(channel.to_string()).or_insert(0.0) +=
                    journey.conversion_value * share;
            }
        }
        credit
    }

    /// Fraction of value per position for a journey of length `n`.
    pub fn shares(n: usize, first_pct: f64, last_pct: f64) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![1.0],
            2 => {
                let ends = first_pct + last_pct;
                if ends <= 0.0 {
                    vec![0.5, 0.5]
                } else {
                    vec![first_pct / ends, last_pct / ends]
                }
            }
            _ => {
                let middle = (1.0 - first_pct - last_pct).max(0.0) / (n - 2) as f64;
                let mut shares = vec![middle; n];
                shares[0] = first_pct;
                shares[n - 1] = last_pct;
                shares
            }
        }
    }
}
