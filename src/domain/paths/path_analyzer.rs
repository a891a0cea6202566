//! Path Analyzer - Common sequences, lengths, and time-to-convert.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::foundation::{mean, percentile, round_to, safe_ratio};
use crate::domain::journey::{Journey, UNKNOWN_CHANNEL};

/// Joins channels into a path key.
pub const PATH_SEPARATOR: &str = ">";

/// Number of paths kept in `common_paths`.
pub const TOP_PATHS: usize = 20;

const DIRECT: &str = "direct";

/// Spread of journey lengths.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LengthDistribution {
    pub min: usize,
    pub max: usize,
    pub median: f64,
    pub p90: f64,
}

/// One frequent channel sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathFrequency {
    pub path: String,
    pub count: usize,
    pub share: f64,
    pub conversions: usize,
}

/// Days from first to last touch for converted journeys.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeToConversion {
    pub journeys_measured: usize,
    pub average_days: Option<f64>,
    pub median_days: Option<f64>,
    pub p90_days: Option<f64>,
}

/// How often a channel appears across all counted touchpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelFrequency {
    pub channel: String,
    pub touches: usize,
    pub share: f64,
}

/// Signals that tracking may be losing the real source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectUnknownDiagnostics {
    pub direct_touch_share: f64,
    pub unknown_touch_share: f64,
    pub direct_or_unknown_share: f64,
    /// Share of converted journeys whose last touch is direct.
    pub direct_last_touch_share: f64,
}

/// Full path report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathAnalysis {
    pub journeys_analyzed: usize,
    pub converted_journeys: usize,
    pub path_length: LengthDistribution,
    pub common_paths: Vec<PathFrequency>,
    pub time_to_conversion: TimeToConversion,
    pub channel_frequency: Vec<ChannelFrequency>,
    pub direct_unknown: DirectUnknownDiagnostics,
}

/// Path mining over raw journeys.
pub struct PathAnalyzer;

impl PathAnalyzer {
    /// Builds the path report.
    ///
    /// `include_non_converted` controls whether non-converted journeys count
    /// toward length, frequency, and path statistics. Time-to-conversion and
    /// the direct-last-touch share always use converted journeys only.
    ///
    /// # Edge Cases
    /// - Journeys without touchpoints are ignored throughout
    /// - Malformed timestamps exclude that journey from time-to-conversion
    pub fn analyze(journeys: &[Journey], include_non_converted: bool) -> PathAnalysis {
        let counted: Vec<&Journey> = journeys
            .iter()
            .filter(|j| !j.is_empty())
            .filter(|j| include_non_converted || j.converted)
            .collect();
        let converted: Vec<&Journey> = journeys
            .iter()
            .filter(|j| j.converted && !j.is_empty())
            .collect();

        PathAnalysis {
            journeys_analyzed: counted.len(),
            converted_journeys: converted.len(),
            path_length: Self::length_distribution(&counted),
            common_paths: Self::common_paths(&counted),
            time_to_conversion: Self::time_to_conversion(&converted),
            channel_frequency: Self::channel_frequency(&counted),
            direct_unknown: Self::direct_unknown(&counted, &converted),
        }
    }

    /// Path key for a journey.
    ///
    /// Rendering only: a channel containing `>` renders like two channels.
    /// Tallies group on the channel sequence itself.
    pub fn path_key(journey: &Journey) -> String {
        journey.channels().collect::<Vec<_>>().join(PATH_SEPARATOR)
    }

    fn length_distribution(journeys: &[&Journey]) -> LengthDistribution {
        let lengths: Vec<f64> = journeys.iter().map(|j| j.len() as f64).collect();
        if lengths.is_empty() {
            return LengthDistribution::default();
        }
        LengthDistribution {
            min: journeys.iter().map(|j| j.len()).min().unwrap_or(0),
            max: journeys.iter().map(|j| j.len()).max().unwrap_or(0),
            median: round_to(percentile(&lengths, 0.5).unwrap_or(0.0), 2),
            p90: round_to(percentile(&lengths, 0.9).unwrap_or(0.0), 2),
        }
    }

    fn common_paths(journeys: &[&Journey]) -> Vec<PathFrequency> {
        let mut tally: BTreeMap<Vec<&str>, (usize, usize)> = BTreeMap::new();
        for journey in journeys {
            let entry = tally.entry(journey.channels().collect()).or_insert((0, 0));
            entry.0 += 1;
            if journey.converted {
                entry.1 += 1;
            }
        }

        let total = journeys.len() as f64;
        let mut paths: Vec<PathFrequency> = tally
            .into_iter()
            .map(|(path, (count, conversions))| PathFrequency {
                path: path.join(PATH_SEPARATOR),
                count,
                share: round_to(safe_ratio(count as f64, total), 4),
                conversions,
            })
            .collect();
        // BTreeMap order makes the name tie-break implicit; sort is stable.
        paths.sort_by(|a, b| b.count.cmp(&a.count));
        paths.truncate(TOP_PATHS);
        paths
    }

    fn time_to_conversion(converted: &[&Journey]) -> TimeToConversion {
        let days: Vec<f64> = converted
            .iter()
            .filter_map(|j| {
                let first = j.first_touchpoint()?.parsed_timestamp()?;
                let last = j.last_touchpoint()?.parsed_timestamp()?;
                Some(last.days_since(&first).max(0.0))
            })
            .collect();

        TimeToConversion {
            journeys_measured: days.len(),
            average_days: mean(&days).map(|d| round_to(d, 2)),
            median_days: percentile(&days, 0.5).map(|d| round_to(d, 2)),
            p90_days: percentile(&days, 0.9).map(|d| round_to(d, 2)),
        }
    }

    fn channel_frequency(journeys: &[&Journey]) -> Vec<ChannelFrequency> {
        let mut tally: BTreeMap<&str, usize> = BTreeMap::new();
        for journey in journeys {
            for channel in journey.channels() {
                *tally.entry(channel).or_insert(0) += 1;
            }
        }

        let total: usize = tally.values().sum();
        let mut frequency: Vec<ChannelFrequency> = tally
            .into_iter()
            .map(|(channel, touches)| ChannelFrequency {
                channel: channel.to_string(),
                touches,
                share: round_to(safe_ratio(touches as f64, total as f64), 4),
            })
            .collect();
        frequency.sort_by(|a, b| b.touches.cmp(&a.touches));
        frequency
    }

    fn direct_unknown(counted: &[&Journey], converted: &[&Journey]) -> DirectUnknownDiagnostics {
        let mut touches = 0usize;
        let mut direct = 0usize;
        let mut unknown = 0usize;
        for tp in counted.iter().flat_map(|j| j.touchpoints.iter()) {
            touches += 1;
            if tp.is_channel(DIRECT) {
                direct += 1;
            } else if tp.is_channel(UNKNOWN_CHANNEL) {
                unknown += 1;
            }
        }

        let direct_last = converted
            .iter()
            .filter(|j| j.last_touchpoint().is_some_and(|tp| tp.is_channel(DIRECT)))
            .count();

        let touches = touches as f64;
        DirectUnknownDiagnostics {
            direct_touch_share: round_to(safe_ratio(direct as f64, touches), 4),
            unknown_touch_share: round_to(safe_ratio(unknown as f64, touches), 4),
            direct_or_unknown_share: round_to(safe_ratio((direct + unknown) as f64, touches), 4),
            direct_last_touch_share: round_to(
                safe_ratio(direct_last as f64, converted.len() as f64),
                4,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::journey::Touchpoint;

    fn journey(channels: &[&str], converted: bool) -> Journey {
        Journey::from_channels("c", channels, if converted { 10.0 } else { 0.0 }, converted)
    }

    fn dated(stamps: &[&str]) -> Journey {
        let touchpoints = stamps.iter().map(|s| Touchpoint::new("email").at(*s)).collect();
        Journey::converted("c", touchpoints, 10.0)
    }

    #[test]
    fn most_common_path_comes_first() {
        let journeys = vec![
            journey(&["A", "B"], true),
            journey(&["A", "B"], true),
            journey(&["A", "B"], true),
            journey(&["A"], true),
        ];
        let analysis = PathAnalyzer::analyze(&journeys, false);

        let top = &analysis.common_paths[0];
        assert_eq!(top.path, "A>B");
        assert_eq!(top.count, 3);
        assert_eq!(top.share, 0.75);
        assert_eq!(analysis.common_paths[1].path, "A");
    }

    #[test]
    fn keeps_only_top_twenty_paths() {
        let names: Vec<String> = (0..25).map(|i| format!("ch{:02}", i)).collect();
        let journeys: Vec<Journey> = names
            .iter()
            .map(|n| journey(&[n.as_str()], true))
            .collect();

        let analysis = PathAnalyzer::analyze(&journeys, false);
        assert_eq!(analysis.common_paths.len(), TOP_PATHS);
        assert_eq!(analysis.common_paths[0].path, "ch00");
    }

    #[test]
    fn length_distribution_over_counted_journeys() {
        let journeys = vec![
            journey(&["A"], true),
            journey(&["A", "B"], true),
            journey(&["A", "B", "C"], true),
            journey(&["A", "B", "C", "D"], true),
        ];
        let dist = PathAnalyzer::analyze(&journeys, false).path_length;

        assert_eq!(dist.min, 1);
        assert_eq!(dist.max, 4);
        assert_eq!(dist.median, 2.5);
        assert_eq!(dist.p90, 3.7);
    }

    #[test]
    fn include_flag_controls_non_converted_counting() {
        let journeys = vec![journey(&["A"], true), journey(&["B", "C"], false)];

        let converted_only = PathAnalyzer::analyze(&journeys, false);
        assert_eq!(converted_only.journeys_analyzed, 1);
        assert_eq!(converted_only.path_length.max, 1);
        assert_eq!(converted_only.channel_frequency.len(), 1);

        let everything = PathAnalyzer::analyze(&journeys, true);
        assert_eq!(everything.journeys_analyzed, 2);
        assert_eq!(everything.path_length.max, 2);
        assert_eq!(everything.channel_frequency.len(), 3);
        assert_eq!(everything.converted_journeys, 1);
    }

    #[test]
    fn time_to_conversion_uses_first_and_last_touch() {
        let journeys = vec![
            dated(&["2024-01-01T00:00:00Z", "2024-01-03T00:00:00Z"]),
            dated(&["2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z", "2024-01-05T00:00:00Z"]),
        ];
        let ttc = PathAnalyzer::analyze(&journeys, false).time_to_conversion;

        assert_eq!(ttc.journeys_measured, 2);
        assert_eq!(ttc.average_days, Some(3.0));
        assert_eq!(ttc.median_days, Some(3.0));
    }

    #[test]
    fn malformed_timestamps_are_skipped() {
        let journeys = vec![
            dated(&["2024-01-01", "2024-01-02"]),
            dated(&["not a date", "2024-01-09"]),
        ];
        let ttc = PathAnalyzer::analyze(&journeys, true).time_to_conversion;

        assert_eq!(ttc.journeys_measured, 1);
        assert_eq!(ttc.average_days, Some(1.0));
    }

    #[test]
    fn time_to_conversion_ignores_non_converted_even_when_included() {
        let mut lost = dated(&["2024-01-01", "2024-02-01"]);
        lost.converted = false;
        let journeys = vec![dated(&["2024-01-01", "2024-01-03"]), lost];

        let ttc = PathAnalyzer::analyze(&journeys, true).time_to_conversion;
        assert_eq!(ttc.journeys_measured, 1);
        assert_eq!(ttc.p90_days, Some(2.0));
    }

    #[test]
    fn no_timestamps_gives_empty_time_stats() {
        let ttc = PathAnalyzer::analyze(&[journey(&["A"], true)], false).time_to_conversion;
        assert_eq!(ttc.journeys_measured, 0);
        assert!(ttc.average_days.is_none());
    }

    #[test]
    fn direct_and_unknown_shares() {
        let journeys = vec![
            journey(&["email", "Direct"], true),
            journey(&["unknown", "direct"], true),
            journey(&["seo", "email"], true),
            journey(&["seo", "unknown"], true),
        ];
        let du = PathAnalyzer::analyze(&journeys, false).direct_unknown;

        assert_eq!(du.direct_touch_share, 0.25);
        assert_eq!(du.unknown_touch_share, 0.25);
        assert_eq!(du.direct_or_unknown_share, 0.5);
        assert_eq!(du.direct_last_touch_share, 0.5);
    }

    #[test]
    fn channel_frequency_sorted_by_touches() {
        let journeys = vec![journey(&["A", "B", "B"], true), journey(&["B", "C"], true)];
        let freq = PathAnalyzer::analyze(&journeys, false).channel_frequency;

        assert_eq!(freq[0].channel, "B");
        assert_eq!(freq[0].touches, 3);
        assert_eq!(freq[0].share, 0.6);
    }

    #[test]
    fn empty_input_yields_default_report() {
        let analysis = PathAnalyzer::analyze(&[], true);
        assert_eq!(analysis, PathAnalysis::default());
    }

    #[test]
    fn channel_containing_separator_is_a_distinct_path() {
        let journeys = vec![
            journey(&["A>B"], true),
            journey(&["A", "B"], false),
            journey(&["A", "B"], false),
        ];
        let paths = PathAnalyzer::analyze(&journeys, true).common_paths;

        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].count, 2);
        assert_eq!(paths[0].conversions, 0);
        assert_eq!(paths[1].count, 1);
        assert_eq!(paths[1].conversions, 1);
        assert!(paths.iter().all(|p| p.path == "A>B"));
    }
}
