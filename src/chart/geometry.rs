//! Geometry helpers used by hit-testing and drag editing.

use egui::Pos2;

use crate::object::Bar;

/// Euclidean distance between two screen points.
#[inline]
pub fn distance(p: Pos2, q: Pos2) -> f32 {
    let dx = p.x - q.x;
    let dy = p.y - q.y;
    (dx * dx + dy * dy).sqrt()
}

/// Distance from `p` to the segment `ab`.
///
/// The projection of `p` onto the line is clamped to the segment ends, so a
/// degenerate segment collapses to the point distance.
pub fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq == 0.0 {
        return distance(p, a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    distance(p, Pos2::new(a.x + t * abx, a.y + t * aby))
}

/// Nearest open/high/low/close of bar `idx` to `price`.
///
/// An index outside the bar sequence returns `price` unchanged.
pub fn snap_price_to_ohlc(idx: i64, price: f64, bars: &[Bar]) -> f64 {
    if idx < 0 {
        return price;
    }
    let Some(bar) = bars.get(idx as usize) else {
        return price;
    };
    bar.ohlc()
        .into_iter()
        .min_by(|a, b| (a - price).abs().total_cmp(&(b - price).abs()))
        .unwrap_or(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_distance() {
        assert_eq!(distance(Pos2::new(0.0, 0.0), Pos2::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_distance_to_segment_projection() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(10.0, 0.0);
        assert_eq!(distance_to_segment(Pos2::new(5.0, 3.0), a, b), 3.0);
        // clamped to the nearest end
        assert_eq!(distance_to_segment(Pos2::new(13.0, 4.0), a, b), 5.0);
        assert_eq!(distance_to_segment(Pos2::new(-3.0, -4.0), a, b), 5.0);
    }

    #[test]
    fn test_degenerate_segment_is_point_distance() {
        let a = Pos2::new(2.0, 2.0);
        let p = Pos2::new(5.0, 6.0);
        assert_eq!(distance_to_segment(p, a, a), distance(p, a));
    }

    #[test]
    fn test_snap_price_to_ohlc() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = vec![Bar::new(t, 98.0, 103.0, 97.0, 101.0, None)];
        assert_eq!(snap_price_to_ohlc(0, 100.4, &bars), 101.0);
        assert_eq!(snap_price_to_ohlc(0, 104.0, &bars), 103.0);
        assert_eq!(snap_price_to_ohlc(0, 97.2, &bars), 97.0);
        assert_eq!(snap_price_to_ohlc(1, 100.4, &bars), 100.4);
        assert_eq!(snap_price_to_ohlc(-1, 100.4, &bars), 100.4);
    }
}
