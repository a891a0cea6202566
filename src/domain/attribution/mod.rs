//! Attribution Module - Pure credit-splitting models.
//!
//! Each model maps journeys to a channel -> credit table. The rule-based
//! models only ever see converted journeys; the Markov engine receives the
//! whole population because non-conversions shape its transition
//! probabilities.
//!
//! # Components
//!
//! - `HeuristicModels` - Last touch, first touch, linear
//! - `TimeDecayModel` - Exponential half-life weighting
//! - `PositionBasedModel` - U-shaped first/last weighting
//! - `MarkovAttribution` - Removal effects on an absorbing chain
//! - `MarkovDiagnostics` - Advisory reliability verdict
//! - `AttributionResult` - Sorted, rounded presentation view
//!
//! # Design Philosophy
//!
//! All functions are pure and deterministic. Credit tables are ordered maps
//! so output never depends on hash iteration order.

mod heuristics;
pub mod markov;
mod model;
mod position_based;
mod result;
mod time_decay;

use std::collections::BTreeMap;

/// Channel -> credited value.
pub type ChannelCredit = BTreeMap<String, f64>;

pub use heuristics::HeuristicModels;
pub use markov::{MarkovAttribution, MarkovDiagnostics, MarkovFallback, MarkovOutcome, Reliability};
pub use model::{
    AttributionModel, AttributionOptions, DEFAULT_FIRST_PCT, DEFAULT_HALF_LIFE_DAYS,
    DEFAULT_LAST_PCT, DEFAULT_MAX_MARKOV_CHANNELS,
};
pub use position_based::PositionBasedModel;
pub use result::{AttributionResult, ChannelAttribution, ModelRun, MONEY_PLACES, SHARE_PLACES};
pub use time_decay::TimeDecayModel;
