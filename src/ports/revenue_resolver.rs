//! Revenue resolution port.
//!
//! Decides how much money a journey is worth, counting each conversion at
//! most once within a request. The deduplication state travels in an
//! explicit [`DedupeScope`] created per top-level call.

use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::journey::Journey;

/// Port for resolving a journey's monetary value.
///
/// Implementations must be deterministic and idempotent within one scope:
/// resolving the same conversion twice in a scope yields its value once and
/// zero afterwards.
pub trait RevenueResolver: Send + Sync {
    /// Value of `journey`, recording it in `scope`.
    fn value(&self, journey: &Journey, scope: &mut DedupeScope) -> f64;
}

/// Request-scoped deduplication context.
///
/// Create one per top-level call and drop it afterwards. Reusing a scope
/// across unrelated requests silently under-counts revenue.
#[derive(Debug, Clone)]
pub struct DedupeScope {
    request_id: Uuid,
    seen: HashSet<String>,
    repeats: usize,
}

impl DedupeScope {
    /// Opens a fresh scope with a new request id.
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            seen: HashSet::new(),
            repeats: 0,
        }
    }

    /// Identifier for log correlation.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Marks `key` as seen; returns true the first time only.
    pub fn first_sighting(&mut self, key: impl Into<String>) -> bool {
        let first = self.seen.insert(key.into());
        if !first {
            self.repeats += 1;
        }
        first
    }

    /// Number of sightings of an already recorded key.
    pub fn repeats(&self) -> usize {
        self.repeats
    }

    /// Number of distinct keys recorded.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl Default for DedupeScope {
    fn default() -> Self {
        Self::new()
    }
}
