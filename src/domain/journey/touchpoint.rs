//! Touchpoint - a single marketing interaction inside a journey.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::foundation::Timestamp;

/// Channel used when a touchpoint carries no usable channel.
pub const UNKNOWN_CHANNEL: &str = "unknown";

/// Separator between channel and campaign in a campaign step key.
pub const CAMPAIGN_SEPARATOR: char = ':';

/// How touchpoints are keyed when building steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepGranularity {
    /// Key by channel only.
    #[default]
    Channel,
    /// Key by `channel:campaign`, falling back to channel without a campaign.
    Campaign,
}

impl StepGranularity {
    /// Maps the campaign-level boolean flag onto a granularity.
    pub fn from_campaign_flag(campaign_level: bool) -> Self {
        if campaign_level {
            StepGranularity::Campaign
        } else {
            StepGranularity::Channel
        }
    }
}

/// One marketing interaction.
///
/// Channel is trusted as already normalized upstream. Unknown fields in the
/// source record are ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Touchpoint {
    #[serde(default = "default_channel", deserialize_with = "deserialize_channel")]
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
}

impl Touchpoint {
    /// Creates a touchpoint for a channel with no timestamp or campaign.
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: normalize_channel(Some(channel.into())),
            timestamp: None,
            campaign: None,
        }
    }

    /// Attaches a raw ISO-8601 timestamp.
    pub fn at(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Attaches a campaign.
    pub fn in_campaign(mut self, campaign: impl Into<String>) -> Self {
        self.campaign = Some(campaign.into());
        self
    }

    /// Parsed timestamp; `None` when absent or unparsable.
    pub fn parsed_timestamp(&self) -> Option<Timestamp> {
        self.timestamp.as_deref().and_then(Timestamp::parse_lenient)
    }

    /// Campaign name when present and non-blank.
    pub fn campaign(&self) -> Option<&str> {
        self.campaign
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Key identifying this touchpoint at the requested granularity.
    pub fn step_key(&self, granularity: StepGranularity) -> String {
        match (granularity, self.campaign()) {
            (StepGranularity::Campaign, Some(campaign)) => {
                format!("{}{}{}", self.channel, CAMPAIGN_SEPARATOR, campaign)
            }
            _ => self.channel.clone(),
        }
    }

    /// True when the channel equals `name`, ignoring ASCII case.
    pub fn is_channel(&self, name: &str) -> bool {
        self.channel.eq_ignore_ascii_case(name)
    }
}

fn default_channel() -> String {
    UNKNOWN_CHANNEL.to_string()
}

fn normalize_channel(raw: Option<String>) -> String {
    match raw {
        Some(channel) if !channel.trim().is_empty() => channel,
        _ => default_channel(),
    }
}

fn deserialize_channel<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_channel(raw))
}
