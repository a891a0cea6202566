//! Attribution defaults

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::attribution::{
    AttributionModel, AttributionOptions, DEFAULT_FIRST_PCT, DEFAULT_HALF_LIFE_DAYS,
    DEFAULT_LAST_PCT, DEFAULT_MAX_MARKOV_CHANNELS,
};

/// Attribution configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AttributionConfig {
    /// Model used when a caller does not name one
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Time-decay half-life in days
    #[serde(default = "default_half_life_days")]
    pub half_life_days: f64,

    /// Position-based share of the first touch
    #[serde(default = "default_first_pct")]
    pub first_pct: f64,

    /// Position-based share of the last touch
    #[serde(default = "default_last_pct")]
    pub last_pct: f64,

    /// Attribute by `channel:campaign` instead of channel
    #[serde(default)]
    pub campaign_level: bool,

    /// Attach Markov diagnostics to results
    #[serde(default = "default_include_diagnostics")]
    pub include_diagnostics: bool,

    /// Above this many channels Markov degrades to linear
    #[serde(default = "default_max_markov_channels")]
    pub max_markov_channels: usize,
}

impl AttributionConfig {
    /// Parse the configured default model
    pub fn default_model(&self) -> Result<AttributionModel, ValidationError> {
        Ok(self.default_model.parse::<AttributionModel>()?)
    }

    /// Options passed to every model run
    pub fn to_options(&self) -> AttributionOptions {
        AttributionOptions {
            half_life_days: self.half_life_days,
            first_pct: self.first_pct,
            last_pct: self.last_pct,
            campaign_level: self.campaign_level,
            include_diagnostics: self.include_diagnostics,
            max_markov_channels: self.max_markov_channels,
        }
    }

    /// Validate attribution configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.default_model()?;
        self.to_options().validate()?;
        Ok(())
    }
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            half_life_days: default_half_life_days(),
            first_pct: default_first_pct(),
            last_pct: default_last_pct(),
            campaign_level: false,
            include_diagnostics: default_include_diagnostics(),
            max_markov_channels: default_max_markov_channels(),
        }
    }
}

fn default_model() -> String {
    AttributionModel::Linear.name().to_string()
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
