//! Attribution model selection and per-model options.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{ConfigurationError, ValidationError};

/// Default half-life for the time-decay model, in days.
pub const DEFAULT_HALF_LIFE_DAYS: f64 = 7.0;

/// Default first-touch share for the position-based model.
pub const DEFAULT_FIRST_PCT: f64 = 0.4;

/// Default last-touch share for the position-based model.
pub const DEFAULT_LAST_PCT: f64 = 0.4;

/// Channel count above which the Markov engine falls back to Linear.
pub const DEFAULT_MAX_MARKOV_CHANNELS: usize = 200;

/// The six supported attribution models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionModel {
    LastTouch,
    FirstTouch,
    Linear,
    TimeDecay,
    PositionBased,
    Markov,
}

impl AttributionModel {
    /// Returns all models in canonical order.
    pub fn all() -> &'static [AttributionModel] {
        &[
            AttributionModel::LastTouch,
            AttributionModel::FirstTouch,
            AttributionModel::Linear,
            AttributionModel::TimeDecay,
            AttributionModel::PositionBased,
            AttributionModel::Markov,
        ]
    }

    /// Returns the wire name of the model.
    pub fn name(&self) -> &'static str {
        match self {
            AttributionModel::LastTouch => "last_touch",
            AttributionModel::FirstTouch => "first_touch",
            AttributionModel::Linear => "linear",
            AttributionModel::TimeDecay => "time_decay",
            AttributionModel::PositionBased => "position_based",
            AttributionModel::Markov => "markov",
        }
    }

    /// True for the data-driven model that consumes non-converted journeys.
    pub fn is_data_driven(&self) -> bool {
        matches!(self, AttributionModel::Markov)
    }
}

impl fmt::Display for AttributionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AttributionModel {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| ConfigurationError::UnknownModel {
                name: s.to_string(),
            })
    }
}

/// Tunables shared by the model dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionOptions {
    #[serde(default = "default_half_life_days")]
    pub half_life_days: f64,
    #[serde(default = "default_first_pct")]
    pub first_pct: f64,
    #[serde(default = "default_last_pct")]
    pub last_pct: f64,
    /// Rewrite channels to `channel:campaign` before attributing.
    #[serde(default)]
    pub campaign_level: bool,
    /// Attach Markov reliability diagnostics to the result.
    #[serde(default = "default_include_diagnostics")]
    pub include_diagnostics: bool,
    #[serde(default = "default_max_markov_channels")]
    pub max_markov_channels: usize,
}

fn default_half_life_days() -> f64 {
    DEFAULT_HALF_LIFE_DAYS
}

fn default_first_pct() -> f64 {
    DEFAULT_FIRST_PCT
}

fn default_last_pct() -> f64 {
    DEFAULT_LAST_PCT
}

fn default_include_diagnostics() -> bool {
    true
}

fn default_max_markov_channels() -> usize {
    DEFAULT_MAX_MARKOV_CHANNELS
}

impl Default for AttributionOptions {
    fn default() -> Self {
        Self {
            half_life_days: DEFAULT_HALF_LIFE_DAYS,
            first_pct: DEFAULT_FIRST_PCT,
            last_pct: DEFAULT_LAST_PCT,
            campaign_level: false,
            include_diagnostics: true,
            max_markov_channels: DEFAULT_MAX_MARKOV_CHANNELS,
        }
    }
}

impl AttributionOptions {
    /// Sets the time-decay half-life.
    pub fn with_half_life_days(mut self, days: f64) -> Self {
        self.half_life_days = days;
        self
    }

    /// Sets the position-based first/last shares.
    pub fn with_position_weights(mut self, first_pct: f64, last_pct: f64) -> Self {
        self.first_pct = first_pct;
        self.last_pct = last_pct;
        self
    }

    /// Enables campaign-level keys.
    pub fn at_campaign_level(mut self) -> Self {
        self.campaign_level = true;
        self
    }

    /// Checks option ranges.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the half-life is not positive, either
    /// position share is outside `[0, 1]`, the shares sum above 1, or the
    /// Markov channel guard is zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.half_life_days.is_finite() || self.half_life_days <= 0.0 {
            return Err(ValidationError::out_of_range(
                "half_life_days",
                0.0,
                f64::MAX,
                self.half_life_days,
            ));
        }
        for (field, value) in [("first_pct", self.first_pct), ("last_pct", self.last_pct)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::out_of_range(field, 0.0, 1.0, value));
            }
        }
        if self.first_pct + self.last_pct > 1.0 + f64::EPSILON {
            return Err(ValidationError::out_of_range(
                "first_pct + last_pct",
                0.0,
                1.0,
                self.first_pct + self.last_pct,
            ));
        }
        if self.max_markov_channels == 0 {
            return Err(ValidationError::out_of_range(
                "max_markov_channels",
                1.0,
                f64::MAX,
                0.0,
            ));
        }
        Ok(())
    }
}
