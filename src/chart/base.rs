//! Base constants and utility functions for the chart module.

use egui::Color32;

// Chart colors
pub const BACKGROUND_COLOR: Color32 = Color32::from_rgb(12, 14, 20);
pub const WHITE_COLOR: Color32 = Color32::from_rgb(255, 255, 255);
pub const GREY_COLOR: Color32 = Color32::from_rgb(100, 100, 100);
pub const GRID_COLOR: Color32 = Color32::from_rgb(32, 36, 46);

// Price movement colors (green up, red down)
pub const UP_COLOR: Color32 = Color32::from_rgb(38, 166, 154);     // Teal for price up
pub const DOWN_COLOR: Color32 = Color32::from_rgb(239, 83, 80);    // Red for price down

// Cursor colors
pub const CURSOR_COLOR: Color32 = Color32::from_rgb(255, 245, 162);
pub const CROSSHAIR_COLOR: Color32 = Color32::from_rgba_premultiplied(128, 128, 128, 128);
pub const REPLAY_COLOR: Color32 = Color32::from_rgb(255, 152, 0);  // Orange replay cursor

// Annotation colors
pub const SHAPE_COLOR: Color32 = Color32::from_rgb(0, 204, 204);
pub const SELECTED_COLOR: Color32 = Color32::from_rgb(255, 215, 0);              // Gold for the selection
pub const DRAFT_COLOR: Color32 = Color32::from_rgba_premultiplied(0, 102, 102, 128); // Half-transparent draft

// Event marker colors
pub const ALERT_COLOR: Color32 = Color32::from_rgb(239, 83, 80);    // Red for alerts
pub const BOOKMARK_COLOR: Color32 = Color32::from_rgb(66, 165, 245); // Blue for bookmarks
pub const NOTE_COLOR: Color32 = Color32::from_rgb(255, 202, 40);     // Amber for notes

// Chart dimensions
pub const BAR_WIDTH: f32 = 0.35;      // Half candle body, as a share of the bar slot
pub const PEN_WIDTH: f32 = 1.0;
pub const HANDLE_RADIUS: f32 = 4.0;
pub const DEFAULT_WINDOW: usize = 120; // Bars shown when a series is first opened

// Layout constants
pub const AXIS_X_HEIGHT: f32 = 24.0;  // Time labels under the plot
pub const AXIS_Y_WIDTH: f32 = 72.0;   // Price labels right of the plot
pub const TIMELINE_HEIGHT: f32 = 18.0;
pub const MINIMAP_HEIGHT: f32 = 48.0;
pub const TOOLTIP_WIDTH: f32 = 120.0;
pub const TOOLTIP_HEIGHT: f32 = 96.0; // Date, OHLC and volume lines

/// Volume unit suffixes, largest first
const VOLUME_UNITS: [(f64, &str); 3] = [(1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Format price with a fixed number of decimals
pub fn format_price(price: f64, decimals: usize) -> String {
    format!("{:.prec$}", price, prec = decimals)
}

/// Format volume with a K/M/B suffix
pub fn format_volume(volume: f64) -> String {
    VOLUME_UNITS
        .iter()
        .find(|(unit, _)| volume >= *unit)
        .map(|(unit, suffix)| format!("{:.2}{}", volume / unit, suffix))
        .unwrap_or_else(|| format!("{:.2}", volume))
}

/// Round `rough` up to 1, 2, 5 or 10 times its power of ten
fn nice_step(rough: f64) -> f64 {
    let magnitude = 10.0_f64.powf(rough.log10().floor());
    let multiple = match rough / magnitude {
        r if r <= 1.5 => 1.0,
        r if r <= 3.0 => 2.0,
        r if r <= 7.0 => 5.0,
        _ => 10.0,
    };
    multiple * magnitude
}

/// Price axis ticks: multiples of a round step inside `[min_val, max_val]`,
/// about `max_ticks` of them
pub fn calculate_axis_ticks(min_val: f64, max_val: f64, max_ticks: usize) -> Vec<f64> {
    if min_val >= max_val || max_ticks == 0 || !(max_val - min_val).is_finite() {
        return vec![min_val];
    }

    let step = nice_step((max_val - min_val) / max_ticks as f64);
    let first = (min_val / step).ceil() as i64;
    let last = (max_val / step).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}
