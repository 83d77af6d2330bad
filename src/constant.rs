//! General constant enums used by the chart engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bar interval of a price series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    /// 1 second
    Second,
    /// 1 minute
    #[default]
    Minute,
    /// 15 minutes
    Minute15,
    /// 1 hour
    Hour,
    /// 4 hours
    Hour4,
    /// Daily
    Daily,
    /// Weekly
    Weekly,
}

impl Interval {
    /// Get interval value string
    pub fn value(&self) -> &'static str {
        match self {
            Interval::Second => "1s",
            Interval::Minute => "1m",
            Interval::Minute15 => "15m",
            Interval::Hour => "1h",
            Interval::Hour4 => "4h",
            Interval::Daily => "d",
            Interval::Weekly => "w",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Interval::Second => "1 sec",
            Interval::Minute => "1 min",
            Interval::Minute15 => "15 min",
            Interval::Hour => "1 hour",
            Interval::Hour4 => "4 hours",
            Interval::Daily => "1 day",
            Interval::Weekly => "1 week",
        }
    }

    /// Number of bars of this interval in one day. Scales per-bar
    /// volatility to a daily figure.
    pub fn bars_per_day(&self) -> f64 {
        match self {
            Interval::Second => 86_400.0,
            Interval::Minute => 1_440.0,
            Interval::Minute15 => 96.0,
            Interval::Hour => 24.0,
            Interval::Hour4 => 6.0,
            Interval::Daily => 1.0,
            Interval::Weekly => 1.0 / 7.0,
        }
    }

    /// Length of one bar in seconds
    pub fn seconds(&self) -> i64 {
        match self {
            Interval::Second => 1,
            Interval::Minute => 60,
            Interval::Minute15 => 900,
            Interval::Hour => 3_600,
            Interval::Hour4 => 14_400,
            Interval::Daily => 86_400,
            Interval::Weekly => 604_800,
        }
    }

    /// Get all intervals for UI selection
    pub fn all() -> Vec<Interval> {
        vec![
            Interval::Second,
            Interval::Minute,
            Interval::Minute15,
            Interval::Hour,
            Interval::Hour4,
            Interval::Daily,
            Interval::Weekly,
        ]
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
