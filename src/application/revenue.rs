//! Value resolution shared by every top-level request.

use crate::domain::journey::Journey;
use crate::ports::{DedupeScope, RevenueResolver};

/// Journeys with resolved values, plus the number of conversions they hold.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedJourneys {
    pub journeys: Vec<Journey>,
    /// Converted journeys with touchpoints whose conversion was not already
    /// seen in the scope.
    pub distinct_conversions: usize,
}

/// Projects journeys so converted ones carry their resolved value.
///
/// Non-converted journeys keep a zero value. Inputs are not modified and
/// order is preserved. All journeys are resolved against the one `scope`.
/// A conversion the scope has already seen keeps its journey but is not
/// counted again.
pub fn resolve_journeys(
    journeys: &[Journey],
    resolver: &dyn RevenueResolver,
    scope: &mut DedupeScope,
) -> ResolvedJourneys {
    let mut resolved = Vec::with_capacity(journeys.len());
    let mut distinct_conversions = 0;

    for journey in journeys {
        if !journey.converted {
            resolved.push(journey.with_value(0.0));
            continue;
        }
        let repeats = scope.repeats();
        let value = resolver.value(journey, scope);
        if scope.repeats() == repeats && !journey.is_empty() {
            distinct_conversions += 1;
        }
        resolved.push(journey.with_value(value));
    }

    ResolvedJourneys {
        journeys: resolved,
        distinct_conversions,
    }
}
