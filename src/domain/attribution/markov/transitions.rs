//! Transition counts over `start -> channels -> conversion|null` sequences.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::domain::journey::Journey;

/// A state of the absorbing chain.
///
/// The special states are distinct variants, so a channel literally named
/// "start" or "null" cannot collide with them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChainState {
    Start,
    Channel(String),
    Conversion,
    Null,
}

impl ChainState {
    /// True for the two terminal states.
    pub fn is_absorbing(&self) -> bool {
        matches!(self, ChainState::Conversion | ChainState::Null)
    }

    pub fn label(&self) -> &str {
        match self {
            ChainState::Start => "start",
            ChainState::Channel(name) => name,
            ChainState::Conversion => "conversion",
            ChainState::Null => "null",
        }
    }
}

impl fmt::Display for ChainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for ChainState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Pairwise transition counts accumulated over every journey.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionCounts {
    counts: BTreeMap<(ChainState, ChainState), u64>,
    outgoing: BTreeMap<ChainState, u64>,
    channels: BTreeSet<String>,
    journeys: usize,
    converted_journeys: usize,
}

impl TransitionCounts {
    /// Builds counts from converted and non-converted journeys alike.
    ///
    /// Journeys with no touchpoints carry no channel information and are
    /// skipped.
    pub fn from_journeys(journeys: &[Journey]) -> Self {
        let mut counts = Self::default();
        for journey in journeys.iter().filter(|j| !j.is_empty()) {
            counts.record(journey);
        }
        counts
    }

    fn record(&mut self, journey: &Journey) {
        self.journeys += 1;
        if journey.converted {
            self.converted_journeys += 1;
        }

        let mut previous = ChainState::Start;
        for channel in journey.channels() {
            self.channels.insert(channel.to_string());
            let next = ChainState::Channel(channel.to_string());
            self.add(previous, next.clone());
            previous = next;
        }

        let terminal = if journey.converted {
            ChainState::Conversion
        } else {
            ChainState::Null
        };
        self.add(previous, terminal);
    }

    fn add(&mut self, from: ChainState, to: ChainState) {
        *self.outgoing.entry(from.clone()).or_insert(0) += 1;
        *self.counts.entry((from, to)).or_insert(0) += 1;
    }

    /// Count for a single transition.
    pub fn count(&self, from: &ChainState, to: &ChainState) -> u64 {
        self.counts
            .get(&(from.clone(), to.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Total transitions leaving `state`.
    pub fn outgoing_total(&self, state: &ChainState) -> u64 {
        self.outgoing.get(state).copied().unwrap_or(0)
    }

    /// Iterates transitions in deterministic (from, to) order.
    pub fn iter(&self) -> impl Iterator<Item = (&ChainState, &ChainState, u64)> {
        self.counts.iter().map(|((from, to), c)| (from, to, *c))
    }

    /// Transitions leaving `state`, in deterministic order.
    pub fn transitions_from<'a>(
        &'a self,
        state: &'a ChainState,
    ) -> impl Iterator<Item = (&'a ChainState, u64)> + 'a {
        self.counts
            .iter()
            .filter(move |((from, _), _)| from == state)
            .map(|((_, to), c)| (to, *c))
    }

    /// Distinct channels, sorted.
    pub fn channels(&self) -> &BTreeSet<String> {
        &self.channels
    }

    /// Number of distinct states appearing in any transition.
    pub fn unique_states(&self) -> usize {
        let mut states = BTreeSet::new();
        for (from, to) in self.counts.keys() {
            states.insert(from);
            states.insert(to);
        }
        states.len()
    }

    /// Number of distinct (from, to) pairs.
    pub fn unique_transitions(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all transition counts.
    pub fn total_transitions(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn journeys(&self) -> usize {
        self.journeys
    }

    pub fn converted_journeys(&self) -> usize {
        self.converted_journeys
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
