//! Attribution results as presented to callers.

use serde::Serialize;
use std::cmp::Ordering;

use super::markov::{MarkovDiagnostics, MarkovFallback};
use super::{AttributionModel, ChannelCredit};
use crate::domain::foundation::{round_to, safe_ratio, DomainError};

/// Decimal places for monetary fields.
pub const MONEY_PLACES: u32 = 2;

/// Decimal places for share fields.
pub const SHARE_PLACES: u32 = 4;

/// One channel's row in a result, sorted by credit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelAttribution {
    pub channel: String,
    pub attributed_value: f64,
    pub attributed_share: f64,
    pub attributed_conversions: f64,
}

/// Output of one attribution model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributionResult {
    pub model: AttributionModel,
    pub channel_credit: ChannelCredit,
    pub total_conversions: usize,
    pub total_value: f64,
    pub channels: Vec<ChannelAttribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<MarkovDiagnostics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<MarkovFallback>,
}

impl AttributionResult {
    /// Builds the presentation view from raw credit.
    ///
    /// Channels are sorted by credit descending (ties by name). Shares are
    /// relative to total credit; attributed conversions divide credit by the
    /// average value per conversion, or are 0 when total value is 0.
    pub fn assemble(
        model: AttributionModel,
        credit: ChannelCredit,
        total_conversions: usize,
        total_value: f64,
    ) -> Self {
        let total_credit: f64 = credit.values().sum();
        let value_per_conversion = if total_value > 0.0 && total_conversions > 0 {
            total_value / total_conversions as f64
        } else {
            0.0
        };

        let mut ranked: Vec<(&String, f64)> = credit.iter().map(|(c, v)| (c, *v)).collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });

        let channels = ranked
            .into_iter()
            .map(|(channel, value)| ChannelAttribution {
                channel: channel.clone(),
                attributed_value: round_to(value, MONEY_PLACES),
                attributed_share: round_to(safe_ratio(value, total_credit), SHARE_PLACES),
                attributed_conversions: round_to(
                    safe_ratio(value, value_per_conversion),
                    MONEY_PLACES,
                ),
            })
            .collect();

        let channel_credit = credit
            .into_iter()
            .map(|(channel, value)| (channel, round_to(value, MONEY_PLACES)))
            .collect();

        Self {
            model,
            channel_credit,
            total_conversions,
            total_value: round_to(total_value, MONEY_PLACES),
            channels,
            diagnostics: None,
            fallback: None,
        }
    }

    /// Attaches Markov diagnostics.
    pub fn with_diagnostics(mut self, diagnostics: Option<MarkovDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Records that Markov degraded to another model.
    pub fn with_fallback(mut self, fallback: Option<MarkovFallback>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Credit for one channel, 0 when absent.
    pub fn credit_for(&self, channel: &str) -> f64 {
        self.channel_credit.get(channel).copied().unwrap_or(0.0)
    }
}

/// One model's entry in a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModelRun {
    Completed(AttributionResult),
    Failed {
        model: AttributionModel,
        error: DomainError,
    },
}

impl ModelRun {
    /// The model this entry belongs to.
    pub fn model(&self) -> AttributionModel {
        match self {
            ModelRun::Completed(result) => result.model,
            ModelRun::Failed { model, .. } => *model,
        }
    }

    /// The result when the model succeeded.
    pub fn result(&self) -> Option<&AttributionResult> {
        match self {
            ModelRun::Completed(result) => Some(result),
            ModelRun::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    fn credit(pairs: &[(&str, f64)]) -> ChannelCredit {
        pairs.iter().map(|(c, v)| (c.to_string(), *v)).collect()
    }

    #[test]
    fn channels_sorted_by_credit_descending() {
        let result = AttributionResult::assemble(
            AttributionModel::Linear,
            credit(&[("a", 10.0), ("b", 30.0), ("c", 20.0)]),
            3,
            60.0,
        );

        let order: Vec<&str> = result.channels.iter().map(|c| c.channel.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn ties_break_by_channel_name() {
        let result = AttributionResult::assemble(
            AttributionModel::Linear,
            credit(&[("z", 5.0), ("m", 5.0)]),
            1,
            10.0,
        );
        assert_eq!(result.channels[0].channel, "m");
    }

    #[test]
    fn shares_and_conversions_are_derived() {
        let result = AttributionResult::assemble(
            AttributionModel::Linear,
            credit(&[("a", 25.0), ("b", 75.0)]),
            4,
            100.0,
        );

        let b = &result.channels[0];
        assert_eq!(b.attributed_share, 0.75);
        // 100 / 4 = 25 per conversion
        assert_eq!(b.attributed_conversions, 3.0);
        let share_sum: f64 = result.channels.iter().map(|c| c.attributed_share).sum();
        assert!((share_sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rounds_money_and_shares() {
        let result = AttributionResult::assemble(
            AttributionModel::Linear,
            credit(&[("a", 100.0 / 3.0), ("b", 200.0 / 3.0)]),
            1,
            100.0,
        );

        assert_eq!(result.credit_for("a"), 33.33);
        assert_eq!(result.channels[0].attributed_share, 0.6667);
        assert_eq!(result.channels[1].attributed_value, 33.33);
    }

    #[test]
    fn zero_value_yields_zero_conversions() {
        let result = AttributionResult::assemble(
            AttributionModel::FirstTouch,
            credit(&[("a", 0.0)]),
            2,
            0.0,
        );
        assert_eq!(result.channels[0].attributed_conversions, 0.0);
        assert_eq!(result.channels[0].attributed_share, 0.0);
    }

    #[test]
    fn empty_credit_gives_empty_channels() {
        let result = AttributionResult::assemble(AttributionModel::Markov, ChannelCredit::new(), 0, 0.0);
        assert!(result.channels.is_empty());
        assert!(result.diagnostics.is_none());
    }

    #[test]
    fn failed_run_serializes_model_and_error() {
        let run = ModelRun::Failed {
            model: AttributionModel::Markov,
            error: DomainError::new(ErrorCode::InternalError, "boom"),
        };
        let json = serde_json::to_value(&run).unwrap();

        assert_eq!(json["model"], "markov");
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(run.model(), AttributionModel::Markov);
        assert!(run.result().is_none());
    }

    #[test]
    fn completed_run_serializes_flat() {
        let run = ModelRun::Completed(AttributionResult::assemble(
            AttributionModel::LastTouch,
            credit(&[("a", 1.0)]),
            1,
            1.0,
        ));
        let json = serde_json::to_value(&run).unwrap();

        assert_eq!(json["model"], "last_touch");
        assert_eq!(json["channel_credit"]["a"], 1.0);
        assert!(json.get("diagnostics").is_none());
    }
}
