//! Paths Module - Journey sequence analytics.
//!
//! Operates directly on journeys, independent of the attribution models.
//!
//! # Components
//!
//! - `PathAnalyzer` - Common paths, length and time-to-convert distributions
//! - `NextBestActions` - Prefix -> ranked next-step statistics
//! - `UpliftEstimator` - Observational touched-vs-holdout conversion rates

mod next_best_action;
mod path_analyzer;
mod uplift;

pub use next_best_action::{NextBestActions, NextStepCandidate};
pub use path_analyzer::{
    ChannelFrequency, DirectUnknownDiagnostics, LengthDistribution, PathAnalysis, PathAnalyzer,
    PathFrequency, TimeToConversion, PATH_SEPARATOR, TOP_PATHS,
};
pub use uplift::{CampaignUplift, UpliftEstimator, OBSERVATIONAL};
