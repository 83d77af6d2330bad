//! Frame rendering in fixed layer order.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use egui::{Align2, Pos2, Rect};
use uuid::Uuid;

use crate::object::Bar;

use super::base::{AXIS_X_HEIGHT, AXIS_Y_WIDTH, BACKGROUND_COLOR, GREY_COLOR};
use super::canvas::{Canvas, Layer};
use super::indicator::{IndicatorSeries, IndicatorSpec};
use super::item::{
    CandleItem, ChartItem, CrosshairItem, GridItem, IndicatorItem, ReplayCursorItem, ShapeItem, ShapeStyle,
};
use super::shape::{Shape, ShapeKind};
use super::viewport::{ChartTransform, Viewport};

/// A computed overlay ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorLine {
    pub spec: IndicatorSpec,
    pub series: IndicatorSeries,
}

impl IndicatorLine {
    pub fn compute(spec: IndicatorSpec, bars: &[Bar]) -> Self {
        Self {
            series: spec.compute(bars),
            spec,
        }
    }
}

/// Price pane inside the widget rect, leaving room for both axes
pub fn plot_rect(rect: Rect) -> Rect {
    Rect::from_min_max(
        rect.min,
        Pos2::new(
            (rect.right() - AXIS_Y_WIDTH).max(rect.left()),
            (rect.bottom() - AXIS_X_HEIGHT).max(rect.top()),
        ),
    )
}

/// Everything one repaint reads.
#[derive(Debug, Clone, Copy)]
pub struct FrameState<'a> {
    /// Whole chart area, axes included
    pub rect: Rect,
    pub bars: &'a [Bar],
    pub view: Viewport,
    pub indicators: &'a [IndicatorLine],
    pub shapes: &'a [Shape],
    pub draft: Option<&'a Shape>,
    pub selected: Option<Uuid>,
    pub hover: Option<Pos2>,
    pub replay_cursor: Option<f64>,
    pub price_decimals: usize,
}

impl<'a> FrameState<'a> {
    pub fn plot_rect(&self) -> Rect {
        plot_rect(self.rect)
    }

    /// `None` for a degenerate window
    pub fn transform(&self) -> Option<ChartTransform> {
        if self.view.end > self.bars.len() {
            return None;
        }
        ChartTransform::from_bars(self.plot_rect(), self.view, self.bars)
    }

    /// Hash of every input that affects the picture
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for v in [self.rect.min.x, self.rect.min.y, self.rect.max.x, self.rect.max.y] {
            v.to_bits().hash(&mut hasher);
        }
        self.bars.len().hash(&mut hasher);
        for bar in self.bars {
            bar.t.hash(&mut hasher);
            for v in bar.ohlc() {
                v.to_bits().hash(&mut hasher);
            }
            bar.v.map(f64::to_bits).hash(&mut hasher);
        }
        self.view.hash(&mut hasher);
        for line in self.indicators {
            line.spec.hash(&mut hasher);
            line.series.len().hash(&mut hasher);
            for value in &line.series {
                value.map(f64::to_bits).hash(&mut hasher);
            }
        }
        for shape in self.shapes {
            hash_shape(shape, &mut hasher);
        }
        self.draft.is_some().hash(&mut hasher);
        if let Some(draft) = self.draft {
            hash_shape(draft, &mut hasher);
        }
        self.selected.hash(&mut hasher);
        self.hover.map(|p| (p.x.to_bits(), p.y.to_bits())).hash(&mut hasher);
        self.replay_cursor.map(f64::to_bits).hash(&mut hasher);
        self.price_decimals.hash(&mut hasher);
        hasher.finish()
    }
}

fn hash_shape(shape: &Shape, hasher: &mut impl Hasher) {
    shape.id.hash(hasher);
    let values: Vec<f64> = match shape.kind {
        ShapeKind::HLine { price } => vec![price],
        ShapeKind::Trend { a, b } | ShapeKind::Fib { a, b } => vec![a.idx, a.price, b.idx, b.price],
    };
    for v in values {
        v.to_bits().hash(hasher);
    }
}

/// Anything that can repaint a chart frame.
pub trait RenderLoop {
    fn repaint(&mut self, frame: &FrameState);
}

/// Paints frames onto a [`Canvas`].
pub struct CanvasRenderer<'c> {
    canvas: &'c mut dyn Canvas,
}

impl<'c> CanvasRenderer<'c> {
    pub fn new(canvas: &'c mut dyn Canvas) -> Self {
        Self { canvas }
    }
}

impl RenderLoop for CanvasRenderer<'_> {
    fn repaint(&mut self, frame: &FrameState) {
        render_frame(self.canvas, frame);
    }
}

/// Draw one frame: background, grid, bars, indicators, shapes, the
/// selected shape, replay cursor and finally the crosshair.
pub fn render_frame(canvas: &mut dyn Canvas, frame: &FrameState) {
    canvas.begin_layer(Layer::Background);
    canvas.fill_rect(frame.rect, BACKGROUND_COLOR);

    let Some(tf) = frame.transform() else {
        canvas.begin_layer(Layer::Message);
        canvas.label(frame.rect.center(), Align2::CENTER_CENTER, "No data", 16.0, GREY_COLOR);
        return;
    };
    let bars = frame.bars;

    canvas.begin_layer(Layer::Grid);
    GridItem {
        price_decimals: frame.price_decimals,
    }
    .draw(canvas, &tf, bars);

    canvas.begin_layer(Layer::Bars);
    CandleItem.draw(canvas, &tf, bars);

    canvas.begin_layer(Layer::Indicators);
    for line in frame.indicators {
        IndicatorItem {
            series: &line.series,
            color: line.spec.color32(),
        }
        .draw(canvas, &tf, bars);
    }

    canvas.begin_layer(Layer::Shapes);
    for shape in frame.shapes.iter().filter(|s| Some(s.id) != frame.selected) {
        ShapeItem {
            shape,
            style: ShapeStyle::Normal,
        }
        .draw(canvas, &tf, bars);
    }
    if let Some(draft) = frame.draft {
        ShapeItem {
            shape: draft,
            style: ShapeStyle::Draft,
        }
        .draw(canvas, &tf, bars);
    }

    canvas.begin_layer(Layer::SelectedShape);
    if let Some(shape) = frame.shapes.iter().find(|s| Some(s.id) == frame.selected) {
        ShapeItem {
            shape,
            style: ShapeStyle::Selected,
        }
        .draw(canvas, &tf, bars);
    }

    canvas.begin_layer(Layer::ReplayCursor);
    if let Some(cursor) = frame.replay_cursor {
        ReplayCursorItem { cursor }.draw(canvas, &tf, bars);
    }

    canvas.begin_layer(Layer::Crosshair);
    if let Some(pos) = frame.hover {
        CrosshairItem {
            pos,
            price_decimals: frame.price_decimals,
        }
        .draw(canvas, &tf, bars);
    }
}

/// Remembers the last frame fingerprint.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last: Option<u64>,
}

impl ChangeDetector {
    /// True when `frame` differs from the previous call's frame
    pub fn changed(&mut self, frame: &FrameState) -> bool {
        let key = frame.fingerprint();
        if self.last == Some(key) {
            return false;
        }
        self.last = Some(key);
        true
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

/// Forwards only frames whose inputs changed.
pub struct DetectingRenderLoop<R> {
    inner: R,
    detector: ChangeDetector,
}

impl<R: RenderLoop> DetectingRenderLoop<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            detector: ChangeDetector::default(),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn invalidate(&mut self) {
        self.detector.invalidate();
    }
}

impl<R: RenderLoop> RenderLoop for DetectingRenderLoop<R> {
    fn repaint(&mut self, frame: &FrameState) {
        if self.detector.changed(frame) {
            self.inner.repaint(frame);
        }
    }
}
