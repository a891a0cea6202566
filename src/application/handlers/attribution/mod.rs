//! Attribution handlers - Single-model and all-models queries.

mod run_all_models;
mod run_attribution;

pub use run_all_models::{AllModelRuns, RunAllModelsHandler};
pub use run_attribution::{RunAttributionHandler, RunAttributionQuery};
