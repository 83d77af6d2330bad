//! Visible window over the bar sequence and the data/pixel transforms.

use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

use crate::object::Bar;

use super::shape::Anchor;

/// Smallest number of bars a window may show
pub const MIN_WINDOW: usize = 20;

/// Window scale applied per wheel notch
pub const ZOOM_IN_FACTOR: f64 = 0.9;
pub const ZOOM_OUT_FACTOR: f64 = 1.1;

/// Half-open range `[start, end)` of rendered bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub start: usize,
    pub end: usize,
}

impl Viewport {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The rightmost window of `size` bars.
    pub fn latest(total: usize, size: usize) -> Self {
        Self::new(total.saturating_sub(size), total).clamp(total)
    }

    /// Number of bars in the window
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a (fractional) bar index falls inside the window.
    pub fn contains(&self, idx: f64) -> bool {
        idx >= self.start as f64 && idx < self.end as f64
    }

    /// Force `0 <= start < end <= total` and `end - start >= MIN_WINDOW`
    /// (or the whole series when it is shorter than that).
    pub fn clamp(self, total: usize) -> Self {
        if total == 0 {
            return Self::default();
        }
        let min = MIN_WINDOW.min(total);
        let size = self.len().clamp(min, total);
        let start = self.start.min(total - size);
        Self::new(start, start + size)
    }

    /// Translate the window by `delta` bars, keeping its size.
    pub fn shifted(self, delta: i64, total: usize) -> Self {
        let view = self.clamp(total);
        let max_start = total.saturating_sub(view.len()) as i64;
        let start = (view.start as i64 + delta).clamp(0, max_start) as usize;
        Self::new(start, start + view.len())
    }

    /// Pan by a horizontal pixel drag over a plot `width` pixels wide.
    ///
    /// Dragging right reveals earlier bars.
    pub fn panned(self, dx: f32, width: f32, total: usize) -> Self {
        if width <= 0.0 {
            return self.clamp(total);
        }
        let delta = (-(dx as f64) * self.len() as f64 / width as f64).round() as i64;
        self.shifted(delta, total)
    }

    /// Rescale the window around `anchor`, keeping the anchor bar at the
    /// same relative position.
    pub fn zoomed(self, anchor: f64, zoom_in: bool, total: usize) -> Self {
        let view = self.clamp(total);
        if view.is_empty() {
            return view;
        }
        let factor = if zoom_in { ZOOM_IN_FACTOR } else { ZOOM_OUT_FACTOR };
        let size = view.len() as f64;
        let min = MIN_WINDOW.min(total) as f64;
        let new_size = (size * factor).round().clamp(min, total as f64);

        let anchor = anchor.clamp(view.start as f64, view.end as f64);
        let ratio = (anchor - view.start as f64) / size;
        let new_start = (anchor - ratio * new_size).round().max(0.0) as usize;
        Self::new(new_start, new_start + new_size as usize).clamp(total)
    }
}

/// Pixel mapping for one frame: the plot rectangle, the window and its
/// price extrema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartTransform {
    pub rect: Rect,
    pub view: Viewport,
    pub price_min: f64,
    pub price_max: f64,
}

impl ChartTransform {
    /// `None` when the window is empty, the plot has no area or the price
    /// span is zero.
    pub fn new(rect: Rect, view: Viewport, price_min: f64, price_max: f64) -> Option<Self> {
        let span = price_max - price_min;
        if view.is_empty() || rect.width() <= 0.0 || rect.height() <= 0.0 || !span.is_finite() || span <= 0.0 {
            return None;
        }
        Some(Self {
            rect,
            view,
            price_min,
            price_max,
        })
    }

    /// Transform using the low/high extrema of the visible slice.
    pub fn from_bars(rect: Rect, view: Viewport, bars: &[Bar]) -> Option<Self> {
        let (lo, hi) = price_extrema(bars, view)?;
        Self::new(rect, view, lo, hi)
    }

    fn n(&self) -> f64 {
        self.view.len() as f64
    }

    fn span(&self) -> f64 {
        self.price_max - self.price_min
    }

    /// Pixel width of one bar slot
    pub fn bar_width(&self) -> f32 {
        (self.rect.width() as f64 / self.n()) as f32
    }

    pub fn pixel_x(&self, idx: f64) -> f32 {
        self.rect.left() + ((idx - self.view.start as f64) * self.rect.width() as f64 / self.n()) as f32
    }

    pub fn pixel_y(&self, price: f64) -> f32 {
        self.rect.bottom() - ((price - self.price_min) * self.rect.height() as f64 / self.span()) as f32
    }

    /// Center of bar `ix`'s slot
    pub fn bar_center_x(&self, ix: usize) -> f32 {
        self.pixel_x(ix as f64 + 0.5)
    }

    pub fn index_at(&self, x: f32) -> f64 {
        self.view.start as f64 + (x - self.rect.left()) as f64 * self.n() / self.rect.width() as f64
    }

    pub fn price_at(&self, y: f32) -> f64 {
        self.price_min + (self.rect.bottom() - y) as f64 * self.span() / self.rect.height() as f64
    }

    /// Bar whose slot contains `x`, clamped to the window
    pub fn bar_at(&self, x: f32) -> usize {
        let ix = self.index_at(x).floor().max(0.0) as usize;
        ix.clamp(self.view.start, self.view.end - 1)
    }

    pub fn to_screen(&self, anchor: Anchor) -> Pos2 {
        Pos2::new(self.pixel_x(anchor.idx), self.pixel_y(anchor.price))
    }

    pub fn to_data(&self, pos: Pos2) -> Anchor {
        Anchor::new(self.index_at(pos.x), self.price_at(pos.y))
    }

    /// Bar delta for a horizontal pixel delta
    pub fn index_delta(&self, dx: f32) -> f64 {
        dx as f64 * self.n() / self.rect.width() as f64
    }

    /// Price delta for a vertical pixel delta (screen y grows downward)
    pub fn price_delta(&self, dy: f32) -> f64 {
        -(dy as f64) * self.span() / self.rect.height() as f64
    }
}

/// Low/high extrema of the bars inside `view`.
pub fn price_extrema(bars: &[Bar], view: Viewport) -> Option<(f64, f64)> {
    let end = view.end.min(bars.len());
    if view.start >= end {
        return None;
    }
    let slice = &bars[view.start..end];
    let lo = slice.iter().map(|b| b.l).fold(f64::INFINITY, f64::min);
    let hi = slice.iter().map(|b| b.h).fold(f64::NEG_INFINITY, f64::max);
    Some((lo, hi))
}

/// Pan gesture in progress: pointer and window at drag start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanState {
    pub origin_x: f32,
    pub origin_view: Viewport,
}

impl PanState {
    pub fn new(origin_x: f32, origin_view: Viewport) -> Self {
        Self {
            origin_x,
            origin_view,
        }
    }

    /// Window for the pointer now at `x`
    pub fn update(&self, x: f32, width: f32, total: usize) -> Viewport {
        self.origin_view.panned(x - self.origin_x, width, total)
    }
}
