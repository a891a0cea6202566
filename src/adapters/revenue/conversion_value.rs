//! Revenue resolver backed by each journey's recorded conversion value.

use crate::domain::journey::Journey;
use crate::ports::{DedupeScope, RevenueResolver};

/// Resolves value from `Journey::conversion_value`.
///
/// The dedupe key is the journey's `conversion_id` when present; otherwise a
/// fingerprint of customer, last touch time, and value. Negative or
/// non-finite values resolve to zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionValueResolver;

impl ConversionValueResolver {
    pub fn new() -> Self {
        Self
    }

    fn dedupe_key(journey: &Journey) -> String {
        match &journey.conversion_id {
            Some(id) => format!("id:{}", id),
            None => {
                let last_seen = journey
                    .last_touchpoint()
                    .and_then(|tp| tp.timestamp.as_deref())
                    .unwrap_or("");
                format!(
                    "fp:{}|{}|{}",
                    journey.customer_id, last_seen, journey.conversion_value
                )
            }
        }
    }
}

impl RevenueResolver for ConversionValueResolver {
    fn value(&self, journey: &Journey, scope: &mut DedupeScope) -> f64 {
        if !scope.first_sighting(Self::dedupe_key(journey)) {
            return 0.0;
        }
        let value = journey.conversion_value;
        if value.is_finite() && value > 0.0 {
            value
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::journey::Touchpoint;

    #[test]
    fn counts_same_conversion_once_per_scope() {
        let resolver = ConversionValueResolver::new();
        let journey = Journey::from_channels("c1", &["a"], 40.0, true).with_conversion_id("o-1");
        let mut scope = DedupeScope::new();

        assert_eq!(resolver.value(&journey, &mut scope), 40.0);
        assert_eq!(resolver.value(&journey, &mut scope), 0.0);
    }

    #[test]
    fn fresh_scope_counts_again() {
        let resolver = ConversionValueResolver::new();
        let journey = Journey::from_channels("c1", &["a"], 40.0, true).with_conversion_id("o-1");

        assert_eq!(resolver.value(&journey, &mut DedupeScope::new()), 40.0);
        assert_eq!(resolver.value(&journey, &mut DedupeScope::new()), 40.0);
    }

    #[test]
    fn distinct_conversions_of_one_customer_both_count() {
        let resolver = ConversionValueResolver::new();
        let mut scope = DedupeScope::new();
        let first = Journey::converted("c1", vec![Touchpoint::new("a").at("2024-01-01")], 10.0);
        let second = Journey::converted("c1", vec![Touchpoint::new("a").at("2024-02-01")], 10.0);

        assert_eq!(resolver.value(&first, &mut scope), 10.0);
        assert_eq!(resolver.value(&second, &mut scope), 10.0);
    }

    #[test]
    fn negative_and_nan_values_resolve_to_zero() {
        let resolver = ConversionValueResolver::new();
        let mut scope = DedupeScope::new();
        let refund = Journey::from_channels("c1", &["a"], -5.0, true).with_conversion_id("r");
        let broken = Journey::from_channels("c2", &["a"], f64::NAN, true).with_conversion_id("n");

        assert_eq!(resolver.value(&refund, &mut scope), 0.0);
        assert_eq!(resolver.value(&broken, &mut scope), 0.0);
    }
}
