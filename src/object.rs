//! Basic data structures consumed by the chart engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV sample for a fixed time bucket.
///
/// Bars arrive ordered by `t` and are never mutated by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub t: DateTime<Utc>,
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<f64>,
}

impl Bar {
    pub fn new(t: DateTime<Utc>, o: f64, h: f64, l: f64, c: f64, v: Option<f64>) -> Self {
        Self { t, o, h, l, c, v }
    }

    /// Typical price (h + l + c) / 3
    pub fn typical_price(&self) -> f64 {
        (self.h + self.l + self.c) / 3.0
    }

    /// Whether the bar closed at or above its open
    pub fn is_up(&self) -> bool {
        self.c >= self.o
    }

    /// Open, high, low and close in that order
    pub fn ohlc(&self) -> [f64; 4] {
        [self.o, self.h, self.l, self.c]
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::Bar;
    use chrono::{Duration, TimeZone, Utc};

    /// Minute bars with the given closes; open = previous close, wicks one unit out.
    pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut prev = closes.first().copied().unwrap_or(0.0);
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let o = prev;
                prev = c;
                Bar::new(
                    t0 + Duration::minutes(i as i64),
                    o,
                    o.max(c) + 1.0,
                    o.min(c) - 1.0,
                    c,
                    Some(10.0),
                )
            })
            .collect()
    }

    /// Flat bars spaced `step` apart, all with close `price`.
    pub fn flat_bars(n: usize, price: f64, step: Duration) -> Vec<Bar> {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| Bar::new(t0 + step * i as i32, price, price + 1.0, price - 1.0, price, Some(1.0)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_bar_helpers() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bar = Bar::new(t, 98.0, 103.0, 97.0, 101.0, None);
        assert!(bar.is_up());
        assert_eq!(bar.typical_price(), (103.0 + 97.0 + 101.0) / 3.0);
        assert_eq!(bar.ohlc(), [98.0, 103.0, 97.0, 101.0]);
    }

    #[test]
    fn test_bar_serde_skips_missing_volume() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bar = Bar::new(t, 1.0, 2.0, 0.5, 1.5, None);
        let json = serde_json::to_string(&bar).unwrap();
        assert!(!json.contains("\"v\""));
        let back: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bar);
    }
}
