//! Chart items: candles, indicator lines, annotations, crosshair and axes.

use egui::{Align2, Color32, Pos2, Rect, Stroke, Vec2};

use crate::object::Bar;

use super::base::{
    calculate_axis_ticks, format_price, format_volume, BAR_WIDTH, CROSSHAIR_COLOR, CURSOR_COLOR,
    DOWN_COLOR, DRAFT_COLOR, GREY_COLOR, GRID_COLOR, HANDLE_RADIUS, PEN_WIDTH, REPLAY_COLOR,
    SELECTED_COLOR, SHAPE_COLOR, TOOLTIP_HEIGHT, TOOLTIP_WIDTH, UP_COLOR, WHITE_COLOR,
};
use super::canvas::Canvas;
use super::shape::{Shape, ShapeKind};
use super::viewport::ChartTransform;

/// Something drawn over the visible window of the price pane.
pub trait ChartItem {
    fn draw(&self, canvas: &mut dyn Canvas, tf: &ChartTransform, bars: &[Bar]);

    /// Text for the tooltip at bar `ix`
    fn info_text(&self, _bars: &[Bar], _ix: usize) -> String {
        String::new()
    }
}

/// Candlestick chart item
#[derive(Debug, Default)]
pub struct CandleItem;

impl ChartItem for CandleItem {
    fn draw(&self, canvas: &mut dyn Canvas, tf: &ChartTransform, bars: &[Bar]) {
        let candle_width = (tf.bar_width() * BAR_WIDTH * 2.0).max(1.0);
        let end = tf.view.end.min(bars.len());

        for (ix, bar) in bars.iter().enumerate().take(end).skip(tf.view.start) {
            let x = tf.bar_center_x(ix);
            let color = if bar.is_up() { UP_COLOR } else { DOWN_COLOR };
            let stroke = Stroke::new(PEN_WIDTH, color);

            // wick
            canvas.segment(Pos2::new(x, tf.pixel_y(bar.h)), Pos2::new(x, tf.pixel_y(bar.l)), stroke);

            let open_y = tf.pixel_y(bar.o);
            let close_y = tf.pixel_y(bar.c);
            if (open_y - close_y).abs() < 1.0 {
                // doji
                canvas.segment(
                    Pos2::new(x - candle_width * 0.5, open_y),
                    Pos2::new(x + candle_width * 0.5, open_y),
                    stroke,
                );
            } else {
                let body = Rect::from_min_max(
                    Pos2::new(x - candle_width * 0.5, open_y.min(close_y)),
                    Pos2::new(x + candle_width * 0.5, open_y.max(close_y)),
                );
                canvas.fill_rect(body, color);
            }
        }
    }

    fn info_text(&self, bars: &[Bar], ix: usize) -> String {
        let Some(bar) = bars.get(ix) else {
            return String::new();
        };
        let mut text = format!(
            "{}\nO {:.4}\nH {:.4}\nL {:.4}\nC {:.4}",
            bar.t.format("%Y-%m-%d %H:%M"),
            bar.o,
            bar.h,
            bar.l,
            bar.c
        );
        if let Some(v) = bar.v {
            text.push_str(&format!("\nV {}", format_volume(v)));
        }
        text
    }
}

/// Line through the defined samples of an indicator series.
pub struct IndicatorItem<'a> {
    pub series: &'a [Option<f64>],
    pub color: Color32,
}

impl ChartItem for IndicatorItem<'_> {
    fn draw(&self, canvas: &mut dyn Canvas, tf: &ChartTransform, _bars: &[Bar]) {
        let stroke = Stroke::new(1.5, self.color);
        let end = tf.view.end.min(self.series.len());
        let mut run: Vec<Pos2> = Vec::new();

        for ix in tf.view.start..end {
            match self.series[ix] {
                Some(value) => run.push(Pos2::new(tf.bar_center_x(ix), tf.pixel_y(value))),
                None => {
                    // a gap ends the current run
                    if run.len() >= 2 {
                        canvas.polyline(std::mem::take(&mut run), stroke);
                    } else {
                        run.clear();
                    }
                }
            }
        }
        if run.len() >= 2 {
            canvas.polyline(run, stroke);
        }
    }
}

/// How an annotation is painted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeStyle {
    Normal,
    Selected,
    Draft,
}

/// An annotation shape.
pub struct ShapeItem<'a> {
    pub shape: &'a Shape,
    pub style: ShapeStyle,
}

impl ChartItem for ShapeItem<'_> {
    fn draw(&self, canvas: &mut dyn Canvas, tf: &ChartTransform, _bars: &[Bar]) {
        let color = match self.style {
            ShapeStyle::Normal => SHAPE_COLOR,
            ShapeStyle::Selected => SELECTED_COLOR,
            ShapeStyle::Draft => DRAFT_COLOR,
        };
        let stroke = Stroke::new(1.5, color);
        let rect = tf.rect;

        match self.shape.kind {
            ShapeKind::HLine { price } => {
                let y = tf.pixel_y(price);
                canvas.segment(Pos2::new(rect.left(), y), Pos2::new(rect.right(), y), stroke);
            }
            ShapeKind::Trend { a, b } => {
                canvas.segment(tf.to_screen(a), tf.to_screen(b), stroke);
            }
            ShapeKind::Fib { a, b } => {
                let left = tf.pixel_x(a.idx.min(b.idx));
                let right = tf.pixel_x(a.idx.max(b.idx));
                canvas.segment(tf.to_screen(a), tf.to_screen(b), Stroke::new(PEN_WIDTH, color.gamma_multiply(0.5)));
                for (level, price) in self.shape.kind.fib_levels() {
                    let y = tf.pixel_y(price);
                    canvas.segment(Pos2::new(left, y), Pos2::new(right, y), stroke);
                    canvas.label(
                        Pos2::new(left + 2.0, y - 1.0),
                        Align2::LEFT_BOTTOM,
                        &format!("{:.3} ({:.2})", level, price),
                        10.0,
                        color,
                    );
                }
            }
        }

        // handle markers
        if self.style != ShapeStyle::Normal {
            if let Some((a, b)) = self.shape.kind.anchors() {
                canvas.dot(tf.to_screen(a), HANDLE_RADIUS, color);
                if self.style == ShapeStyle::Selected {
                    canvas.dot(tf.to_screen(b), HANDLE_RADIUS, color);
                }
            }
        }
    }
}

/// Grid lines with price labels on the right axis and time labels below
/// the plot.
#[derive(Debug)]
pub struct GridItem {
    pub price_decimals: usize,
}

impl ChartItem for GridItem {
    fn draw(&self, canvas: &mut dyn Canvas, tf: &ChartTransform, bars: &[Bar]) {
        let rect = tf.rect;
        let grid = Stroke::new(PEN_WIDTH, GRID_COLOR);
        let tick = Stroke::new(PEN_WIDTH, GREY_COLOR);

        for price in calculate_axis_ticks(tf.price_min, tf.price_max, 6) {
            let y = tf.pixel_y(price);
            canvas.segment(Pos2::new(rect.left(), y), Pos2::new(rect.right(), y), grid);
            canvas.segment(Pos2::new(rect.right(), y), Pos2::new(rect.right() + 4.0, y), tick);
            canvas.label(
                Pos2::new(rect.right() + 6.0, y),
                Align2::LEFT_CENTER,
                &format_price(price, self.price_decimals),
                11.0,
                WHITE_COLOR,
            );
        }

        let bar_count = tf.view.len();
        let num_ticks = ((rect.width() / 120.0) as usize).max(2);
        let tick_step = (bar_count / num_ticks).max(1);
        for ix in (tf.view.start..tf.view.end).step_by(tick_step) {
            let Some(bar) = bars.get(ix) else {
                break;
            };
            let x = tf.bar_center_x(ix);
            canvas.segment(Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom()), grid);
            canvas.segment(Pos2::new(x, rect.bottom()), Pos2::new(x, rect.bottom() + 4.0), tick);
            canvas.label(
                Pos2::new(x, rect.bottom() + 6.0),
                Align2::CENTER_TOP,
                &bar.t.format("%m-%d %H:%M").to_string(),
                10.0,
                WHITE_COLOR,
            );
        }
    }
}

/// Crosshair at the pointer with a value tooltip for the nearest bar.
#[derive(Debug)]
pub struct CrosshairItem {
    pub pos: Pos2,
    pub price_decimals: usize,
}

impl ChartItem for CrosshairItem {
    fn draw(&self, canvas: &mut dyn Canvas, tf: &ChartTransform, bars: &[Bar]) {
        let rect = tf.rect;
        if !rect.contains(self.pos) {
            return;
        }
        let stroke = Stroke::new(PEN_WIDTH, CROSSHAIR_COLOR);
        let ix = tf.bar_at(self.pos.x);
        let x = tf.bar_center_x(ix);

        canvas.segment(Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom()), stroke);
        canvas.segment(Pos2::new(rect.left(), self.pos.y), Pos2::new(rect.right(), self.pos.y), stroke);

        // price label on the axis
        let label_rect = Rect::from_min_size(Pos2::new(rect.right(), self.pos.y - 8.0), Vec2::new(64.0, 16.0));
        canvas.fill_rect(label_rect, CURSOR_COLOR);
        canvas.label(
            Pos2::new(rect.right() + 4.0, self.pos.y),
            Align2::LEFT_CENTER,
            &format_price(tf.price_at(self.pos.y), self.price_decimals),
            11.0,
            Color32::BLACK,
        );

        let info = CandleItem.info_text(bars, ix);
        if info.is_empty() {
            return;
        }
        // keep the tooltip on the side away from the pointer
        let info_x = if self.pos.x < rect.center().x {
            rect.right() - TOOLTIP_WIDTH - 4.0
        } else {
            rect.left() + 4.0
        };
        let info_rect = Rect::from_min_size(
            Pos2::new(info_x, rect.top() + 4.0),
            Vec2::new(TOOLTIP_WIDTH, TOOLTIP_HEIGHT),
        );
        canvas.fill_rect(info_rect, Color32::from_rgba_unmultiplied(0, 0, 0, 200));
        canvas.outline_rect(info_rect, Stroke::new(PEN_WIDTH, GREY_COLOR));
        canvas.label(
            Pos2::new(info_rect.left() + 6.0, info_rect.top() + 6.0),
            Align2::LEFT_TOP,
            &info,
            11.0,
            WHITE_COLOR,
        );
    }
}

/// Vertical marker at the replay cursor
#[derive(Debug)]
pub struct ReplayCursorItem {
    pub cursor: f64,
}

impl ChartItem for ReplayCursorItem {
    fn draw(&self, canvas: &mut dyn Canvas, tf: &ChartTransform, _bars: &[Bar]) {
        if !tf.view.contains(self.cursor) {
            return;
        }
        let x = tf.pixel_x(self.cursor + 0.5);
        canvas.segment(
            Pos2::new(x, tf.rect.top()),
            Pos2::new(x, tf.rect.bottom()),
            Stroke::new(1.5, REPLAY_COLOR),
        );
    }
}
