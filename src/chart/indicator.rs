//! Technical indicators for charting.
//!
//! Every function here is pure: it reads a bar slice and returns a series
//! aligned index-for-index with it. `None` marks samples without enough
//! history.

use chrono::Duration;
use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::constant::Interval;
use crate::object::Bar;

/// Sparse series aligned with the bar sequence
pub type IndicatorSeries = Vec<Option<f64>>;

/// Window lengths evaluated by [`signal_matrix`]
pub const SIGNAL_WINDOWS: [usize; 4] = [9, 20, 50, 200];

/// Simple moving average of closes.
pub fn sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut values = vec![None; bars.len()];
    if period == 0 || bars.len() < period {
        return values;
    }

    let mut sum = 0.0;
    for (i, bar) in bars.iter().enumerate() {
        sum += bar.c;
        if i >= period {
            sum -= bars[i - period].c;
        }
        if i + 1 >= period {
            values[i] = Some(sum / period as f64);
        }
    }
    values
}

/// Exponential moving average of closes.
///
/// Seeded with the simple average of the first `period` closes, then
/// smoothed with `k = 2 / (period + 1)`. A period of one or less yields an
/// all-`None` series.
pub fn ema(bars: &[Bar], period: usize) -> IndicatorSeries {
    let closes: Vec<Option<f64>> = bars.iter().map(|b| Some(b.c)).collect();
    ema_of(&closes, period)
}

/// EMA over a sparse series, seeded at its first run of `period` defined
/// samples.
fn ema_of(values: &[Option<f64>], period: usize) -> IndicatorSeries {
    let mut out = vec![None; values.len()];
    if period <= 1 {
        return out;
    }

    let Some(first) = values.iter().position(Option::is_some) else {
        return out;
    };
    let seed_end = first + period - 1;
    if seed_end >= values.len() {
        return out;
    }

    let mut sum = 0.0;
    for value in &values[first..=seed_end] {
        match value {
            Some(v) => sum += v,
            // the input has a gap inside the seed window
            None => return out,
        }
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut prev = sum / period as f64;
    out[seed_end] = Some(prev);
    for i in seed_end + 1..values.len() {
        if let Some(v) = values[i] {
            prev = v * k + prev * (1.0 - k);
            out[i] = Some(prev);
        }
    }
    out
}

/// Cumulative volume-weighted average price.
///
/// Bars without volume count with a weight of one so the series stays
/// defined over the whole sequence.
pub fn vwap(bars: &[Bar]) -> IndicatorSeries {
    let mut cumulative_pv = 0.0;
    let mut cumulative_v = 0.0;

    bars.iter()
        .map(|bar| {
            let volume = bar.v.unwrap_or(1.0);
            cumulative_pv += bar.typical_price() * volume;
            cumulative_v += volume;
            if cumulative_v > 0.0 {
                Some(cumulative_pv / cumulative_v)
            } else {
                None
            }
        })
        .collect()
}

/// MACD line, signal line and histogram.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Macd {
    pub macd: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

/// Fast EMA minus slow EMA, with an EMA signal line and their difference.
pub fn macd(bars: &[Bar], fast: usize, slow: usize, signal: usize) -> Macd {
    let fast_ema = ema(bars, fast);
    let slow_ema = ema(bars, slow);

    let macd: IndicatorSeries = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();
    let signal = ema_of(&macd, signal);
    let histogram = macd
        .iter()
        .zip(&signal)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        })
        .collect();

    Macd {
        macd,
        signal,
        histogram,
    }
}

/// MACD with the conventional 12/26/9 parameters.
pub fn macd_default(bars: &[Bar]) -> Macd {
    macd(bars, 12, 26, 9)
}

/// True range of bar `i`; the first bar has no previous close.
fn true_range(bars: &[Bar], i: usize) -> f64 {
    let bar = &bars[i];
    let hl = bar.h - bar.l;
    if i == 0 {
        return hl;
    }
    let prev_close = bars[i - 1].c;
    hl.max((bar.h - prev_close).abs())
        .max((bar.l - prev_close).abs())
}

/// Average true range over the trailing `n` bars, or all bars if fewer
/// exist. Zero for an empty series.
pub fn atr(bars: &[Bar], n: usize) -> f64 {
    if bars.is_empty() || n == 0 {
        return 0.0;
    }
    let from = bars.len().saturating_sub(n);
    let count = bars.len() - from;
    let total: f64 = (from..bars.len()).map(|i| true_range(bars, i)).sum();
    total / count as f64
}

/// Headline figures for the last 24 hours of a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub last: f64,
    pub change_24h_pct: f64,
    pub volatility_pct: f64,
    pub atr14: f64,
    pub range_24h_pct: f64,
    pub volume_24h: f64,
}

/// Index of the first bar inside the 24h window ending at the last bar.
///
/// Walks backward bar by bar; the result is identical to a binary search
/// over the sorted timestamps.
fn window_start_24h(bars: &[Bar]) -> usize {
    let Some(last) = bars.last() else {
        return 0;
    };
    let cutoff = last.t - Duration::hours(24);
    let mut first = bars.len() - 1;
    while first > 0 && bars[first - 1].t >= cutoff {
        first -= 1;
    }
    first
}

/// Compute the 24h KPI block. All fields are zero for an empty series.
pub fn kpis(bars: &[Bar], interval: Interval) -> Kpis {
    let Some(last) = bars.last() else {
        return Kpis::default();
    };
    let first = window_start_24h(bars);
    let window = &bars[first..];

    let base = window[0].c;
    let change_24h_pct = if base != 0.0 {
        (last.c - base) / base * 100.0
    } else {
        0.0
    };

    let returns: Vec<f64> = window
        .windows(2)
        .filter(|w| w[0].c > 0.0 && w[1].c > 0.0)
        .map(|w| (w[1].c / w[0].c).ln())
        .collect();
    let volatility_pct = if returns.len() > 1 {
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
            / (returns.len() - 1) as f64;
        variance.sqrt() * interval.bars_per_day().sqrt() * 100.0
    } else {
        0.0
    };

    let high = window.iter().map(|b| b.h).fold(f64::NEG_INFINITY, f64::max);
    let low = window.iter().map(|b| b.l).fold(f64::INFINITY, f64::min);
    let range_24h_pct = if low > 0.0 { (high - low) / low * 100.0 } else { 0.0 };

    Kpis {
        last: last.c,
        change_24h_pct,
        volatility_pct,
        atr14: atr(bars, 14),
        range_24h_pct,
        volume_24h: window.iter().filter_map(|b| b.v).sum(),
    }
}

/// Position of the last close relative to an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum Signal {
    Below = -1,
    Neutral = 0,
    Above = 1,
}

impl Signal {
    fn compare(value: f64, reference: Option<f64>) -> Self {
        match reference {
            Some(r) if value > r => Signal::Above,
            Some(r) if value < r => Signal::Below,
            _ => Signal::Neutral,
        }
    }

    pub fn value(self) -> i8 {
        self as i8
    }
}

/// One row of the signal matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEntry {
    pub name: String,
    pub signal: Signal,
}

/// Last-bar signals for SMA/EMA at each of [`SIGNAL_WINDOWS`], VWAP and
/// MACD. MACD compares its line to the signal line.
pub fn signal_matrix(bars: &[Bar]) -> Vec<SignalEntry> {
    let mut entries = Vec::with_capacity(SIGNAL_WINDOWS.len() * 2 + 2);
    let Some(last) = bars.last() else {
        return entries;
    };
    let last_ix = bars.len() - 1;
    let at_last = |series: &IndicatorSeries| series.get(last_ix).copied().flatten();

    for window in SIGNAL_WINDOWS {
        entries.push(SignalEntry {
            name: format!("SMA{}", window),
            signal: Signal::compare(last.c, at_last(&sma(bars, window))),
        });
    }
    for window in SIGNAL_WINDOWS {
        entries.push(SignalEntry {
            name: format!("EMA{}", window),
            signal: Signal::compare(last.c, at_last(&ema(bars, window))),
        });
    }
    entries.push(SignalEntry {
        name: "VWAP".to_string(),
        signal: Signal::compare(last.c, at_last(&vwap(bars))),
    });

    let m = macd_default(bars);
    let signal = match at_last(&m.macd) {
        Some(line) => Signal::compare(line, at_last(&m.signal)),
        None => Signal::Neutral,
    };
    entries.push(SignalEntry {
        name: "MACD".to_string(),
        signal,
    });
    entries
}

/// Overlay types the chart can draw on the price pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorKind {
    Sma(usize),
    Ema(usize),
    Vwap,
}

impl IndicatorKind {
    pub fn name(&self) -> String {
        match self {
            IndicatorKind::Sma(p) => format!("SMA{}", p),
            IndicatorKind::Ema(p) => format!("EMA{}", p),
            IndicatorKind::Vwap => "VWAP".to_string(),
        }
    }
}

/// A configured overlay: what to compute and how to colour it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndicatorSpec {
    pub kind: IndicatorKind,
    /// RGBA
    pub color: [u8; 4],
}

impl IndicatorSpec {
    pub fn new(kind: IndicatorKind, color: Color32) -> Self {
        Self {
            kind,
            color: color.to_array(),
        }
    }

    pub fn color32(&self) -> Color32 {
        Color32::from_rgba_unmultiplied(self.color[0], self.color[1], self.color[2], self.color[3])
    }

    pub fn compute(&self, bars: &[Bar]) -> IndicatorSeries {
        match self.kind {
            IndicatorKind::Sma(p) => sma(bars, p),
            IndicatorKind::Ema(p) => ema(bars, p),
            IndicatorKind::Vwap => vwap(bars),
        }
    }
}

/// Overlays shown on a fresh chart
pub fn default_indicators() -> Vec<IndicatorSpec> {
    vec![
        IndicatorSpec::new(IndicatorKind::Sma(20), Color32::YELLOW),
        IndicatorSpec::new(IndicatorKind::Ema(50), Color32::from_rgb(0, 255, 255)),
        IndicatorSpec::new(IndicatorKind::Vwap, Color32::from_rgb(100, 255, 100)),
    ]
}

/// Min/max of the defined samples in `[start, end)`.
pub fn series_range(series: &[Option<f64>], start: usize, end: usize) -> Option<(f64, f64)> {
    let end = end.min(series.len());
    if start >= end {
        return None;
    }
    series[start..end]
        .iter()
        .flatten()
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::test_util::{bars_from_closes, flat_bars};

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_sma_example() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(sma(&bars, 3), vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_sma_matches_window_mean() {
        let closes = [3.0, 7.5, 1.25, 9.0, 4.0, 6.5, 2.0, 8.0];
        let bars = bars_from_closes(&closes);
        let period = 4;
        let series = sma(&bars, period);
        for (i, value) in series.iter().enumerate() {
            if i + 1 < period {
                assert!(value.is_none());
            } else {
                let mean = closes[i + 1 - period..=i].iter().sum::<f64>() / period as f64;
                assert_close(value.unwrap(), mean);
            }
        }
    }

    #[test]
    fn test_sma_short_series() {
        let bars = bars_from_closes(&[1.0, 2.0]);
        assert_eq!(sma(&bars, 3), vec![None, None]);
        assert_eq!(sma(&bars, 0), vec![None, None]);
    }

    #[test]
    fn test_ema_seed_and_smoothing() {
        let bars = bars_from_closes(&[2.0, 4.0, 6.0, 8.0]);
        let series = ema(&bars, 3);
        assert_eq!(series[0], None);
        assert_eq!(series[1], None);
        assert_close(series[2].unwrap(), 4.0);
        // k = 0.5
        assert_close(series[3].unwrap(), 6.0);
    }

    #[test]
    fn test_ema_degenerate_period() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0]);
        assert!(ema(&bars, 1).iter().all(Option::is_none));
        assert!(ema(&bars, 0).iter().all(Option::is_none));
    }

    #[test]
    fn test_ema_defined_from_period_minus_one() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let bars = bars_from_closes(&closes);
        for period in [2, 5, 12] {
            let series = ema(&bars, period);
            assert!(series[..period - 1].iter().all(Option::is_none));
            assert!(series[period - 1..].iter().all(Option::is_some));
        }
    }

    #[test]
    fn test_vwap_defaults_missing_volume() {
        let mut bars = bars_from_closes(&[10.0, 20.0]);
        for bar in &mut bars {
            bar.v = None;
        }
        let series = vwap(&bars);
        let expected = (bars[0].typical_price() + bars[1].typical_price()) / 2.0;
        assert_close(series[1].unwrap(), expected);
        assert!(series.iter().all(Option::is_some));
    }

    #[test]
    fn test_macd_histogram_identity() {
        let closes: Vec<f64> = (0..80).map(|i| 50.0 + (i as f64 * 0.3).sin() * 4.0 + i as f64 * 0.1).collect();
        let bars = bars_from_closes(&closes);
        let m = macd_default(&bars);
        assert!(m.macd[..25].iter().all(Option::is_none));
        assert!(m.macd[25].is_some());
        assert!(m.signal[..33].iter().all(Option::is_none));
        assert!(m.signal[33].is_some());
        for i in 0..bars.len() {
            if let (Some(line), Some(sig), Some(hist)) = (m.macd[i], m.signal[i], m.histogram[i]) {
                assert_close(hist, line - sig);
            }
        }
    }

    #[test]
    fn test_atr_uses_available_bars() {
        let bars = bars_from_closes(&[10.0, 10.0, 10.0]);
        // every bar spans 2.0 and closes flat
        assert_close(atr(&bars, 14), 2.0);
        assert_eq!(atr(&[], 14), 0.0);
    }

    #[test]
    fn test_atr_true_range_gap() {
        let mut bars = bars_from_closes(&[10.0, 10.0]);
        bars[1].o = 20.0;
        bars[1].h = 21.0;
        bars[1].l = 19.0;
        bars[1].c = 20.0;
        // max(2, |21 - 10|, |19 - 10|) for the trailing bar
        assert_close(atr(&bars, 1), 11.0);
    }

    #[test]
    fn test_kpis_empty_is_zero() {
        assert_eq!(kpis(&[], Interval::Minute), Kpis::default());
    }

    #[test]
    fn test_kpis_24h_window() {
        let mut bars = flat_bars(30, 100.0, Duration::hours(1));
        // outside the 24h window
        bars[0].c = 1.0;
        bars[0].h = 1000.0;
        let last_ix = bars.len() - 1;
        bars[last_ix].c = 110.0;
        bars[last_ix].h = 111.0;
        let k = kpis(&bars, Interval::Hour);

        assert_eq!(k.last, 110.0);
        assert_close(k.change_24h_pct, 10.0);
        // 25 bars inside the window (cutoff inclusive), one unit volume each
        assert_close(k.volume_24h, 25.0);
        assert_close(k.range_24h_pct, (111.0 - 99.0) / 99.0 * 100.0);
        assert!(k.volatility_pct > 0.0);
    }

    #[test]
    fn test_signal_matrix() {
        let closes: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let bars = bars_from_closes(&closes);
        let matrix = signal_matrix(&bars);
        assert_eq!(matrix.len(), 10);

        let get = |name: &str| matrix.iter().find(|e| e.name == name).unwrap().signal;
        assert_eq!(get("SMA9"), Signal::Above);
        assert_eq!(get("EMA20"), Signal::Above);
        // not enough history
        assert_eq!(get("SMA50"), Signal::Neutral);
        assert_eq!(get("EMA200"), Signal::Neutral);
        assert_eq!(get("MACD"), Signal::Neutral);
        assert_eq!(Signal::Below.value(), -1);
    }

    #[test]
    fn test_series_range_skips_gaps() {
        let series = vec![None, Some(3.0), None, Some(1.0), Some(2.0)];
        assert_eq!(series_range(&series, 0, 5), Some((1.0, 3.0)));
        assert_eq!(series_range(&series, 0, 1), None);
        assert_eq!(series_range(&series, 4, 2), None);
    }
}
