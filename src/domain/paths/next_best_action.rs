//! Next-Best-Action - prefix -> next step statistics.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::PATH_SEPARATOR;
use crate::domain::foundation::{round_to, safe_ratio};
use crate::domain::journey::{Journey, StepGranularity};

/// One candidate next step after a given prefix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextStepCandidate {
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    pub step: String,
    pub count: usize,
    pub conversions: usize,
    pub conversion_rate: f64,
    pub avg_value: f64,
    pub avg_value_converted: f64,
}

#[derive(Debug, Default)]
struct StepTally {
    channel: String,
    campaign: Option<String>,
    count: usize,
    conversions: usize,
    value: f64,
}

/// Ranked candidates for every observed prefix.
///
/// Prefixes are held as step sequences, so a step containing `>` never
/// merges with a longer prefix. They serialize as a map keyed by the steps
/// joined with `>`; the empty prefix is the empty string. Support or
/// conversion-rate cut-offs are left to the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NextBestActions {
    by_prefix: BTreeMap<Vec<String>, Vec<NextStepCandidate>>,
}

impl NextBestActions {
    /// Builds statistics for every `(steps[0..i], steps[i])` pair.
    ///
    /// Converted journeys add a conversion and their value to every pair
    /// they contain.
    pub fn build(journeys: &[Journey], granularity: StepGranularity) -> Self {
        let mut tallies: BTreeMap<Vec<String>, BTreeMap<String, StepTally>> = BTreeMap::new();

        for journey in journeys {
            let steps = journey.steps(granularity);
            for (i, tp) in journey.touchpoints.iter().enumerate() {
                let tally = tallies
                    .entry(steps[..i].to_vec())
                    .or_default()
                    .entry(steps[i].clone())
                    .or_insert_with(|| StepTally {
                        channel: tp.channel.clone(),
                        campaign: match granularity {
                            StepGranularity::Campaign => tp.campaign().map(str::to_string),
                            StepGranularity::Channel => None,
                        },
                        ..StepTally::default()
                    });
                tally.count += 1;
                if journey.converted {
                    tally.conversions += 1;
                    tally.value += journey.conversion_value;
                }
            }
        }

        let by_prefix = tallies
            .into_iter()
            .map(|(prefix, steps)| (prefix, Self::rank(steps)))
            .collect();
        Self { by_prefix }
    }

    fn rank(steps: BTreeMap<String, StepTally>) -> Vec<NextStepCandidate> {
        let mut candidates: Vec<NextStepCandidate> = steps
            .into_iter()
            .map(|(step, tally)| NextStepCandidate {
                channel: tally.channel,
                campaign: tally.campaign,
                count: tally.count,
                conversions: tally.conversions,
                conversion_rate: round_to(
                    safe_ratio(tally.conversions as f64, tally.count as f64),
                    4,
                ),
                avg_value: round_to(safe_ratio(tally.value, tally.count as f64), 2),
                avg_value_converted: round_to(
                    safe_ratio(tally.value, tally.conversions as f64),
                    2,
                ),
                step,
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.conversion_rate
                .partial_cmp(&a.conversion_rate)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    b.avg_value
                        .partial_cmp(&a.avg_value)
                        .unwrap_or(Ordering::Equal)
                })
        });
        candidates
    }

    /// Ranked candidates after `prefix`, at most `limit` of them.
    pub fn recommend(&self, prefix: &[&str], limit: usize) -> &[NextStepCandidate] {
        let key: Vec<String> = prefix.iter().map(|step| step.to_string()).collect();
        match self.by_prefix.get(&key) {
            Some(candidates) => &candidates[..candidates.len().min(limit)],
            None => &[],
        }
    }

    /// Every prefix and its ranked candidates.
    pub fn iter(&self) -> impl Iterator<Item = (&[String], &[NextStepCandidate])> {
        self.by_prefix
            .iter()
            .map(|(prefix, candidates)| (prefix.as_slice(), candidates.as_slice()))
    }

    pub fn prefix_count(&self) -> usize {
        self.by_prefix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_prefix.is_empty()
    }
}

impl Serialize for NextBestActions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.by_prefix
                .iter()
                .map(|(prefix, candidates)| (prefix.join(PATH_SEPARATOR), candidates)),
        )
    }
}
