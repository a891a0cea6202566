//! Campaign Uplift - observational touched-vs-untouched comparison.
//!
//! These figures are correlational. Journeys self-select into "touched", so
//! the uplift is not a causal estimate and is labelled as observational.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::foundation::{round_to, safe_ratio};
use crate::domain::journey::{Journey, StepGranularity};

/// Marker carried on every uplift row.
pub const OBSERVATIONAL: &str = "observational";

/// Conversion comparison for one campaign step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignUplift {
    pub step: String,
    pub touched_journeys: usize,
    pub touched_conversions: usize,
    pub touched_conversion_rate: f64,
    pub holdout_journeys: usize,
    pub holdout_conversions: usize,
    pub holdout_conversion_rate: f64,
    pub absolute_uplift: f64,
    /// `None` when the holdout never converts.
    pub relative_uplift: Option<f64>,
    pub methodology: &'static str,
}

#[derive(Debug, Default, Clone, Copy)]
struct Group {
    journeys: usize,
    conversions: usize,
}

impl Group {
    fn add(&mut self, converted: bool) {
        self.journeys += 1;
        if converted {
            self.conversions += 1;
        }
    }

    fn rate(&self) -> f64 {
        safe_ratio(self.conversions as f64, self.journeys as f64)
    }
}

/// Touched-vs-holdout conversion rates per step.
pub struct UpliftEstimator;

impl UpliftEstimator {
    /// Estimates uplift for every distinct step.
    ///
    /// Each journey lands in the touched group of every step it contains
    /// (once, however many times it repeats the step) and in the holdout of
    /// every other step. Rows are ranked by absolute uplift, ties by step.
    pub fn estimate(journeys: &[Journey], granularity: StepGranularity) -> Vec<CampaignUplift> {
        let per_journey: Vec<BTreeSet<String>> = journeys
            .iter()
            .map(|j| j.steps(granularity).into_iter().collect())
            .collect();
        let all_steps: BTreeSet<&String> = per_journey.iter().flatten().collect();

        let population = Group {
            journeys: journeys.len(),
            conversions: journeys.iter().filter(|j| j.converted).count(),
        };

        let mut touched: BTreeMap<&String, Group> = BTreeMap::new();
        for (journey, steps) in journeys.iter().zip(&per_journey) {
            for step in steps {
                touched.entry(step).or_default().add(journey.converted);
            }
        }

        let mut rows: Vec<CampaignUplift> = all_steps
            .into_iter()
            .map(|step| {
                let hit = touched.get(step).copied().unwrap_or_default();
                let holdout = Group {
                    journeys: population.journeys - hit.journeys,
                    conversions: population.conversions - hit.conversions,
                };
                Self::row(step, hit, holdout)
            })
            .collect();

        rows.sort_by(|a, b| {
            b.absolute_uplift
                .partial_cmp(&a.absolute_uplift)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.step.cmp(&b.step))
        });
        rows
    }

    fn row(step: &str, touched: Group, holdout: Group) -> CampaignUplift {
        let touched_rate = touched.rate();
        let holdout_rate = holdout.rate();
        let absolute = touched_rate - holdout_rate;
        let relative = if holdout_rate > 0.0 {
            Some(round_to(absolute / holdout_rate, 4))
        } else {
            None
        };

        CampaignUplift {
            step: step.to_string(),
            touched_journeys: touched.journeys,
            touched_conversions: touched.conversions,
            touched_conversion_rate: round_to(touched_rate, 4),
            holdout_journeys: holdout.journeys,
            holdout_conversions: holdout.conversions,
            holdout_conversion_rate: round_to(holdout_rate, 4),
            absolute_uplift: round_to(absolute, 4),
            relative_uplift: relative,
            methodology: OBSERVATIONAL,
        }
    }
}
