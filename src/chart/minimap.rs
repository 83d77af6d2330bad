//! Condensed full-series navigator with a draggable, resizable window band.

use egui::{Color32, Pos2, Rect, Stroke, Vec2};
use tracing::debug;

use crate::object::Bar;

use super::base::{CURSOR_COLOR, GREY_COLOR, PEN_WIDTH, SHAPE_COLOR};
use super::canvas::Canvas;
use super::viewport::{Viewport, MIN_WINDOW};

/// Pixel distance from a band edge that grabs a resize grip
pub const EDGE_TOLERANCE: f32 = 6.0;

const GRIP_WIDTH: f32 = 4.0;

/// Which part of the band a drag holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinimapGrip {
    Move,
    ResizeLeft,
    ResizeRight,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct MinimapDrag {
    grip: MinimapGrip,
    origin_x: f32,
    origin_view: Viewport,
}

/// Minimap interaction state.
#[derive(Debug, Default)]
pub struct Minimap {
    drag: Option<MinimapDrag>,
}

impl Minimap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn grip(&self) -> Option<MinimapGrip> {
        self.drag.map(|d| d.grip)
    }

    /// Screen rectangle of the window band
    pub fn band_rect(rect: Rect, view: Viewport, total: usize) -> Option<Rect> {
        if total == 0 || view.is_empty() || rect.width() <= 0.0 {
            return None;
        }
        let scale = rect.width() / total as f32;
        Some(Rect::from_min_max(
            Pos2::new(rect.left() + view.start as f32 * scale, rect.top()),
            Pos2::new(rect.left() + view.end.min(total) as f32 * scale, rect.bottom()),
        ))
    }

    /// Grip under `x`; edges win over the band body. On a narrow band each
    /// edge grabs at most a third of its width so the middle still moves it.
    pub fn classify(x: f32, rect: Rect, view: Viewport, total: usize) -> Option<MinimapGrip> {
        let band = Self::band_rect(rect, view, total)?;
        let tolerance = EDGE_TOLERANCE.min(band.width() / 3.0);
        if (x - band.left()).abs() <= tolerance {
            Some(MinimapGrip::ResizeLeft)
        } else if (x - band.right()).abs() <= tolerance {
            Some(MinimapGrip::ResizeRight)
        } else if x > band.left() && x < band.right() {
            Some(MinimapGrip::Move)
        } else {
            None
        }
    }

    /// Start a drag. A press outside the band recentres the window on the
    /// pressed bar and keeps dragging it from there.
    pub fn pointer_down(&mut self, pos: Pos2, rect: Rect, view: Viewport, total: usize) -> Option<Viewport> {
        if total == 0 || !rect.contains(pos) {
            return None;
        }
        let view = view.clamp(total);
        match Self::classify(pos.x, rect, view, total) {
            Some(grip) => {
                debug!(?grip, "minimap drag started");
                self.drag = Some(MinimapDrag {
                    grip,
                    origin_x: pos.x,
                    origin_view: view,
                });
                None
            }
            None => {
                let center = ((pos.x - rect.left()) / rect.width() * total as f32) as i64;
                let start = center - (view.len() / 2) as i64;
                let next = view.shifted(start - view.start as i64, total);
                debug!(start = next.start, end = next.end, "minimap recentred");
                self.drag = Some(MinimapDrag {
                    grip: MinimapGrip::Move,
                    origin_x: pos.x,
                    origin_view: next,
                });
                Some(next)
            }
        }
    }

    /// Window for the pointer now at `x`, while dragging
    pub fn pointer_move(&mut self, x: f32, rect: Rect, total: usize) -> Option<Viewport> {
        let drag = self.drag?;
        if total == 0 || rect.width() <= 0.0 {
            return None;
        }
        let delta = ((x - drag.origin_x) as f64 * total as f64 / rect.width() as f64).round() as i64;
        let origin = drag.origin_view;
        let min = MIN_WINDOW.min(total) as i64;

        let next = match drag.grip {
            MinimapGrip::Move => origin.shifted(delta, total),
            MinimapGrip::ResizeLeft => {
                let start = (origin.start as i64 + delta).clamp(0, origin.end as i64 - min);
                Viewport::new(start as usize, origin.end).clamp(total)
            }
            MinimapGrip::ResizeRight => {
                let end = (origin.end as i64 + delta).clamp(origin.start as i64 + min, total as i64);
                Viewport::new(origin.start, end as usize).clamp(total)
            }
        };
        Some(next)
    }

    pub fn pointer_up(&mut self) {
        if self.drag.take().is_some() {
            debug!("minimap drag finished");
        }
    }

    /// Close sparkline of the whole series, shading outside the window, the
    /// band and its two grips.
    pub fn draw(&self, canvas: &mut dyn Canvas, rect: Rect, bars: &[Bar], view: Viewport) {
        canvas.fill_rect(rect, Color32::from_rgb(18, 20, 28));
        canvas.outline_rect(rect, Stroke::new(PEN_WIDTH, GREY_COLOR));
        let total = bars.len();
        if total == 0 {
            return;
        }

        let lo = bars.iter().map(|b| b.c).fold(f64::INFINITY, f64::min);
        let hi = bars.iter().map(|b| b.c).fold(f64::NEG_INFINITY, f64::max);
        let span = if hi > lo { hi - lo } else { 1.0 };
        let stride = (total / rect.width().max(1.0) as usize).max(1);
        let points: Vec<Pos2> = bars
            .iter()
            .enumerate()
            .step_by(stride)
            .map(|(ix, bar)| {
                Pos2::new(
                    rect.left() + (ix as f32 + 0.5) * rect.width() / total as f32,
                    rect.bottom() - 2.0 - ((bar.c - lo) / span) as f32 * (rect.height() - 4.0),
                )
            })
            .collect();
        canvas.polyline(points, Stroke::new(PEN_WIDTH, SHAPE_COLOR));

        let Some(band) = Self::band_rect(rect, view, total) else {
            return;
        };
        let shade = Color32::from_black_alpha(140);
        if band.left() > rect.left() {
            canvas.fill_rect(Rect::from_min_max(rect.min, Pos2::new(band.left(), rect.bottom())), shade);
        }
        if band.right() < rect.right() {
            canvas.fill_rect(Rect::from_min_max(Pos2::new(band.right(), rect.top()), rect.max), shade);
        }
        canvas.fill_rect(band, Color32::from_white_alpha(16));
        canvas.outline_rect(band, Stroke::new(PEN_WIDTH, CURSOR_COLOR));

        let grip_size = Vec2::new(GRIP_WIDTH, rect.height() * 0.5);
        for x in [band.left(), band.right()] {
            canvas.fill_rect(Rect::from_center_size(Pos2::new(x, rect.center().y), grip_size), CURSOR_COLOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::canvas::recording::{Op, RecordingCanvas};
    use crate::object::test_util::bars_from_closes;
    use egui::pos2;

    // one bar per two pixels
    fn rect() -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(400.0, 40.0))
    }

    const TOTAL: usize = 200;

    #[test]
    fn test_classify() {
        let view = Viewport::new(50, 100); // band spans x 100..200
        assert_eq!(Minimap::classify(97.0, rect(), view, TOTAL), Some(MinimapGrip::ResizeLeft));
        assert_eq!(Minimap::classify(205.0, rect(), view, TOTAL), Some(MinimapGrip::ResizeRight));
        assert_eq!(Minimap::classify(150.0, rect(), view, TOTAL), Some(MinimapGrip::Move));
        assert_eq!(Minimap::classify(300.0, rect(), view, TOTAL), None);
    }

    #[test]
    fn test_classify_narrow_band_keeps_move() {
        // 20 of 2000 bars on 1200 px: band spans x 600..612
        let wide = Rect::from_min_max(pos2(0.0, 0.0), pos2(1200.0, 40.0));
        let view = Viewport::new(1000, 1020);
        let grips: Vec<_> = (0..=12)
            .map(|dx| Minimap::classify(600.0 + dx as f32, wide, view, 2000))
            .collect();
        assert_eq!(grips[0], Some(MinimapGrip::ResizeLeft));
        assert_eq!(grips[12], Some(MinimapGrip::ResizeRight));
        assert_eq!(grips[6], Some(MinimapGrip::Move));
        assert!(grips.iter().all(Option::is_some));

        let mut minimap = Minimap::new();
        assert_eq!(minimap.pointer_down(pos2(606.0, 20.0), wide, view, 2000), None);
        assert_eq!(minimap.grip(), Some(MinimapGrip::Move));
        assert_eq!(minimap.pointer_move(666.0, wide, 2000), Some(Viewport::new(1100, 1120)));
    }

    #[test]
    fn test_move_drag() {
        let mut minimap = Minimap::new();
        let view = Viewport::new(50, 100);
        assert_eq!(minimap.pointer_down(pos2(150.0, 20.0), rect(), view, TOTAL), None);
        assert_eq!(minimap.grip(), Some(MinimapGrip::Move));
        assert_eq!(minimap.pointer_move(170.0, rect(), TOTAL), Some(Viewport::new(60, 110)));
        // clamped at the series end
        assert_eq!(minimap.pointer_move(399.0, rect(), TOTAL), Some(Viewport::new(150, 200)));
        minimap.pointer_up();
        assert!(!minimap.is_dragging());
        assert_eq!(minimap.pointer_move(170.0, rect(), TOTAL), None);
    }

    #[test]
    fn test_resize_keeps_min_window() {
        let mut minimap = Minimap::new();
        let view = Viewport::new(50, 100);
        minimap.pointer_down(pos2(100.0, 20.0), rect(), view, TOTAL);
        assert_eq!(minimap.grip(), Some(MinimapGrip::ResizeLeft));
        assert_eq!(minimap.pointer_move(60.0, rect(), TOTAL), Some(Viewport::new(30, 100)));
        assert_eq!(minimap.pointer_move(190.0, rect(), TOTAL), Some(Viewport::new(80, 100)));
        minimap.pointer_up();

        minimap.pointer_down(pos2(200.0, 20.0), rect(), view, TOTAL);
        assert_eq!(minimap.grip(), Some(MinimapGrip::ResizeRight));
        assert_eq!(minimap.pointer_move(0.0, rect(), TOTAL), Some(Viewport::new(50, 70)));
        assert_eq!(minimap.pointer_move(500.0, rect(), TOTAL), Some(Viewport::new(50, 200)));
    }

    #[test]
    fn test_click_outside_band_recentres() {
        let mut minimap = Minimap::new();
        let view = Viewport::new(0, 40);
        let next = minimap.pointer_down(pos2(300.0, 20.0), rect(), view, TOTAL);
        assert_eq!(next, Some(Viewport::new(130, 170)));
        assert!(minimap.is_dragging());
        assert_eq!(minimap.pointer_down(pos2(300.0, 80.0), rect(), view, TOTAL), None);
    }

    #[test]
    fn test_draw_sparkline_and_band() {
        let closes: Vec<f64> = (0..TOTAL).map(|i| i as f64).collect();
        let bars = bars_from_closes(&closes);
        let mut canvas = RecordingCanvas::default();
        Minimap::new().draw(&mut canvas, rect(), &bars, Viewport::new(50, 100));
        assert!(canvas.ops.iter().any(|op| matches!(op, Op::Polyline(points, _) if points.len() == TOTAL)));
        let fills = canvas.ops.iter().filter(|op| matches!(op, Op::FillRect(..))).count();
        // background, two shades, band, two grips
        assert_eq!(fills, 6);
    }
}
