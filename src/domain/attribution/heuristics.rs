//! Rule-based models - last touch, first touch, and linear.

use super::ChannelCredit;
use crate::domain::journey::Journey;

/// Single-touch and even-split attribution rules.
///
/// Every function expects journeys that already converted. Journeys without
/// touchpoints are skipped and a channel seen twice in one journey collects
/// both shares.
pub struct HeuristicModels;

impl HeuristicModels {
    /// All of each journey's value goes to its last touchpoint's channel.
    pub fn last_touch(journeys: &[Journey]) -> ChannelCredit {
        let mut credit = ChannelCredit::new();
        for journey in journeys {
            if let Some(tp) = journey.last_touchpoint() {
                *credit.entry(tp.channel.clone()).or_insert(0.0) += journey.conversion_value;
            }
        }
        credit
    }

    /// All of each journey's value goes to its first touchpoint's channel.
    pub fn first_touch(journeys: &[Journey]) -> ChannelCredit {
        let mut credit = ChannelCredit::new();
        for journey in journeys {
            if let Some(tp) = journey.first_touchpoint() {
                *credit.entry(tp.channel.clone()).or_insert(0.0) += journey.conversion_value;
            }
        }
        credit
    }

    /// Each journey's value is split evenly across its touchpoints.
    pub fn linear(journeys: &[Journey]) -> ChannelCredit {
        let mut credit = ChannelCredit::new();
        for journey in journeys {
            if journey.is_empty() {
                continue;
            }
            let share = journey.conversion_value / journey.len() as f64;
            for channel in journey.channels() {
                *credit.entry(channel.to_string()).or_insert(0.0) += share;
            }
        }
        credit
    }
}
