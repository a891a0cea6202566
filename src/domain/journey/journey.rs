//! Journey - a customer's ordered touchpoints and conversion outcome.

use serde::{Deserialize, Serialize};

use super::{StepGranularity, Touchpoint};

/// A customer's ordered touchpoints with a conversion outcome.
///
/// Touchpoint order is taken as given; nothing here re-sorts it. Any
/// projection (value resolution, step rewriting) returns a new journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub touchpoints: Vec<Touchpoint>,
    #[serde(default)]
    pub conversion_value: f64,
    #[serde(default = "default_converted")]
    pub converted: bool,
    /// Order or conversion identifier used for revenue deduplication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_id: Option<String>,
}

fn default_converted() -> bool {
    true
}

impl Journey {
    /// Creates a converted journey.
    pub fn converted(
        customer_id: impl Into<String>,
        touchpoints: Vec<Touchpoint>,
        conversion_value: f64,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            touchpoints,
            conversion_value,
            converted: true,
            conversion_id: None,
        }
    }

    /// Creates a journey that did not convert.
    pub fn non_converted(customer_id: impl Into<String>, touchpoints: Vec<Touchpoint>) -> Self {
        Self {
            customer_id: customer_id.into(),
            touchpoints,
            conversion_value: 0.0,
            converted: false,
            conversion_id: None,
        }
    }

    /// Convenience for building a journey from bare channel names.
    pub fn from_channels(
        customer_id: impl Into<String>,
        channels: &[&str],
        conversion_value: f64,
        converted: bool,
    ) -> Self {
        let touchpoints = channels.iter().map(|c| Touchpoint::new(*c)).collect();
        Self {
            customer_id: customer_id.into(),
            touchpoints,
            conversion_value,
            converted,
            conversion_id: None,
        }
    }

    /// Sets the deduplication identifier.
    pub fn with_conversion_id(mut self, conversion_id: impl Into<String>) -> Self {
        self.conversion_id = Some(conversion_id.into());
        self
    }

    /// Returns a copy carrying a different conversion value.
    pub fn with_value(&self, conversion_value: f64) -> Self {
        Self {
            conversion_value,
            ..self.clone()
        }
    }

    /// Returns a copy whose touchpoint channels are rewritten to step keys.
    ///
    /// At campaign granularity every channel becomes `channel:campaign`, so
    /// the same models can run unchanged at campaign level.
    pub fn project_steps(&self, granularity: StepGranularity) -> Self {
        let touchpoints = self
            .touchpoints
            .iter()
            .map(|tp| Touchpoint {
                channel: tp.step_key(granularity),
                ..tp.clone()
            })
            .collect();
        Self {
            touchpoints,
            ..self.clone()
        }
    }

    /// Step keys in journey order.
    pub fn steps(&self, granularity: StepGranularity) -> Vec<String> {
        self.touchpoints
            .iter()
            .map(|tp| tp.step_key(granularity))
            .collect()
    }

    /// Channel names in journey order.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.touchpoints.iter().map(|tp| tp.channel.as_str())
    }

    /// True when the journey has no touchpoints.
    pub fn is_empty(&self) -> bool {
        self.touchpoints.is_empty()
    }

    /// Number of touchpoints.
    pub fn len(&self) -> usize {
        self.touchpoints.len()
    }

    pub fn first_touchpoint(&self) -> Option<&Touchpoint> {
        self.touchpoints.first()
    }

    pub fn last_touchpoint(&self) -> Option<&Touchpoint> {
        self.touchpoints.last()
    }
}
