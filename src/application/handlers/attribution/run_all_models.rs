//! RunAllModelsHandler - Runs every supported model over one journey set.
//!
//! A failure in one model is captured as a `ModelRun::Failed` entry and never
//! prevents the others from running.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{info, warn};

use super::run_attribution::RunAttributionHandler;
use crate::domain::attribution::{AttributionModel, AttributionOptions, ModelRun};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::journey::Journey;
use crate::ports::RevenueResolver;

/// Results of every model keyed by model, in `AttributionModel::all()` order.
pub type AllModelRuns = BTreeMap<AttributionModel, ModelRun>;

/// Handler that fans one request out over all models.
pub struct RunAllModelsHandler {
    single: RunAttributionHandler,
}

impl RunAllModelsHandler {
    pub fn new(resolver: Arc<dyn RevenueResolver>) -> Self {
        Self {
            single: RunAttributionHandler::new(resolver),
        }
    }

    /// Runs each model independently. Every model gets its own dedupe scope,
    /// so each one sees the full conversion value.
    pub fn run_all_models(&self, journeys: &[Journey], options: &AttributionOptions) -> AllModelRuns {
        let mut runs = BTreeMap::new();
        let mut failures = 0usize;

        for &model in AttributionModel::all() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.single.run_attribution(journeys, model, options)
            }));

            let run = match outcome {
                Ok(Ok(result)) => ModelRun::Completed(result),
                Ok(Err(err)) => {
                    warn!(model = %model, error = %err, "Attribution model failed");
                    ModelRun::Failed {
                        model,
                        error: err.into(),
                    }
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    warn!(model = %model, error = %message, "Attribution model panicked");
                    ModelRun::Failed {
                        model,
                        error: DomainError::new(ErrorCode::InternalError, message)
                            .with_detail("model", model.name()),
                    }
                }
            };
            if matches!(run, ModelRun::Failed { .. }) {
                failures += 1;
            }
            runs.insert(model, run);
        }

        info!(
            journeys = journeys.len(),
            models = runs.len(),
            failures,
            "All attribution models run"
        );
        runs
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "model computation panicked".to_string()
    }
}
