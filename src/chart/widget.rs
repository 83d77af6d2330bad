//! Chart widget with crosshair, zoom, pan, drawing tools, replay, minimap
//! and event timeline.

use std::sync::Arc;
use std::time::Instant;

use egui::{ColorImage, Event, Key, Pos2, Rect, Response, Sense, Ui, UserData, ViewportCommand};
use tracing::{debug, info};

use crate::constant::Interval;
use crate::object::Bar;
use crate::setting::ChartSettings;

use super::base::{DEFAULT_WINDOW, MINIMAP_HEIGHT, TIMELINE_HEIGHT};
use super::drawing::{DrawTool, DrawingManager};
use super::indicator::{default_indicators, kpis, signal_matrix, IndicatorSpec, Kpis, SignalEntry};
use super::manager::BarManager;
use super::minimap::Minimap;
use super::render::{plot_rect, CanvasRenderer, ChangeDetector, FrameState, IndicatorLine, RenderLoop};
use super::replay::{EguiScheduler, ReplayEngine, ReplaySpeed, TickOutcome};
use super::shape::Shape;
use super::timeline::{ChartEvent, Timeline, TimelineFilter};
use super::viewport::{ChartTransform, PanState, Viewport};

/// What one frame of the widget asks of its container.
pub struct ChartOutput {
    pub response: Response,
    /// Window the container should show from now on
    pub view: Option<Viewport>,
    /// Timeline event the user clicked
    pub jump: Option<ChartEvent>,
    /// The frame's inputs differ from the previous frame
    pub changed: bool,
}

/// Screen areas of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    /// Price pane plus its axes
    pub chart: Rect,
    pub plot: Rect,
    pub timeline: Rect,
    pub minimap: Rect,
}

impl ChartLayout {
    pub fn new(rect: Rect) -> Self {
        let chart_bottom = (rect.bottom() - MINIMAP_HEIGHT - TIMELINE_HEIGHT).max(rect.top());
        let chart = Rect::from_min_max(rect.min, Pos2::new(rect.right(), chart_bottom));
        let plot = plot_rect(chart);
        let timeline = Rect::from_min_max(
            Pos2::new(plot.left(), chart_bottom),
            Pos2::new(plot.right(), (chart_bottom + TIMELINE_HEIGHT).min(rect.bottom())),
        );
        let minimap = Rect::from_min_max(Pos2::new(rect.left(), timeline.bottom()), rect.max);
        Self {
            chart,
            plot,
            timeline,
            minimap,
        }
    }
}

/// Main chart widget.
///
/// The container owns the visible window and the shape collection: it
/// passes both in every frame and applies the changes the widget reports.
pub struct ChartWidget {
    /// Data manager
    manager: BarManager,
    /// Configured overlays
    specs: Vec<IndicatorSpec>,
    /// Overlay series, computed for `lines_revision`
    lines: Vec<IndicatorLine>,
    lines_revision: Option<u64>,
    drawing: DrawingManager,
    replay: ReplayEngine<EguiScheduler>,
    /// Whether the replay cursor is drawn
    replay_visible: bool,
    minimap: Minimap,
    timeline: Timeline,
    pan: Option<PanState>,
    hover: Option<Pos2>,
    /// Price decimal places
    price_decimals: usize,
    detector: ChangeDetector,
    export_pending: bool,
    export: Option<ColorImage>,
    last_layout: Option<ChartLayout>,
}

impl Default for ChartWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartWidget {
    pub fn new() -> Self {
        Self {
            manager: BarManager::new(),
            specs: default_indicators(),
            lines: Vec::new(),
            lines_revision: None,
            drawing: DrawingManager::new(),
            replay: ReplayEngine::default(),
            replay_visible: false,
            minimap: Minimap::new(),
            timeline: Timeline::new(),
            pan: None,
            hover: None,
            price_decimals: 2,
            detector: ChangeDetector::default(),
            export_pending: false,
            export: None,
            last_layout: None,
        }
    }

    /// Replace the bar series (ascending by time)
    pub fn set_bars(&mut self, bars: Vec<Bar>) {
        self.manager.set_bars(bars);
        self.replay.set_total(self.manager.len());
    }

    /// Update the last bar or append a new one
    pub fn update_bar(&mut self, bar: Bar) {
        self.manager.update_bar(bar);
        self.replay.set_total(self.manager.len());
    }

    pub fn clear_all(&mut self) {
        self.manager.clear_all();
        self.replay.set_total(0);
        self.replay_visible = false;
        self.pan = None;
        self.hover = None;
    }

    pub fn bars(&self) -> &[Bar] {
        self.manager.bars()
    }

    pub fn manager(&self) -> &BarManager {
        &self.manager
    }

    /// Window showing the latest bars
    pub fn default_view(&self) -> Viewport {
        Viewport::latest(self.manager.len(), DEFAULT_WINDOW)
    }

    pub fn set_indicators(&mut self, specs: Vec<IndicatorSpec>) {
        if specs != self.specs {
            self.specs = specs;
            self.lines_revision = None;
        }
    }

    pub fn indicator_specs(&self) -> &[IndicatorSpec] {
        &self.specs
    }

    /// Overlay series, recomputed when the bars or the overlays changed
    pub fn indicator_lines(&mut self) -> &[IndicatorLine] {
        let revision = self.manager.revision();
        if self.lines_revision != Some(revision) {
            let bars = self.manager.bars();
            self.lines = self.specs.iter().map(|&spec| IndicatorLine::compute(spec, bars)).collect();
            self.lines_revision = Some(revision);
            debug!(revision, count = self.lines.len(), "indicators recomputed");
        }
        &self.lines
    }

    pub fn kpis(&self, interval: Interval) -> Kpis {
        kpis(self.manager.bars(), interval)
    }

    pub fn signal_matrix(&self) -> Vec<SignalEntry> {
        signal_matrix(self.manager.bars())
    }

    pub fn set_price_decimals(&mut self, decimals: usize) {
        self.price_decimals = decimals;
    }

    pub fn price_decimals(&self) -> usize {
        self.price_decimals
    }

    /// Re-synchronise with the container's shape collection
    pub fn set_shapes(&mut self, shapes: &[Shape]) {
        self.drawing.sync(shapes);
    }

    /// Register the callback receiving every new shape collection
    pub fn set_shape_sink(&mut self, sink: impl FnMut(Vec<Shape>) + 'static) {
        self.drawing.set_on_change(sink);
    }

    pub fn drawing(&self) -> &DrawingManager {
        &self.drawing
    }

    pub fn drawing_mut(&mut self) -> &mut DrawingManager {
        &mut self.drawing
    }

    pub fn set_tool(&mut self, tool: DrawTool) {
        self.drawing.set_tool(tool);
    }

    pub fn set_snap(&mut self, snap: bool) {
        self.drawing.set_snap(snap);
    }

    pub fn set_events(&mut self, events: Vec<ChartEvent>) {
        self.timeline.set_events(events);
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn set_filter(&mut self, filter: TimelineFilter) {
        self.timeline.set_filter(filter);
    }

    pub fn replay(&self) -> &ReplayEngine<EguiScheduler> {
        &self.replay
    }

    pub fn replay_visible(&self) -> bool {
        self.replay_visible
    }

    pub fn play(&mut self) {
        self.replay_visible = true;
        self.replay.play(Instant::now());
    }

    pub fn toggle_replay(&mut self) {
        self.replay_visible = true;
        self.replay.toggle(Instant::now());
    }

    pub fn stop_replay(&mut self) {
        self.replay.stop();
    }

    /// Stop playback and hide the cursor
    pub fn exit_replay(&mut self) {
        self.replay.stop();
        self.replay_visible = false;
    }

    pub fn set_replay_speed(&mut self, speed: ReplaySpeed) {
        self.replay.set_speed(speed);
    }

    /// Move the replay cursor without pausing
    pub fn seek(&mut self, cursor: f64) {
        self.replay_visible = true;
        self.replay.set_cursor(cursor);
    }

    pub fn step_replay(&mut self, delta: i64) {
        self.replay_visible = true;
        if delta >= 0 {
            (0..delta).for_each(|_| self.replay.step_forward());
        } else {
            (0..-delta).for_each(|_| self.replay.step_backward());
        }
    }

    /// Ask the host for a screenshot; the chart area is available from
    /// [`ChartWidget::take_export`] once it arrives.
    pub fn request_export(&mut self, ctx: &egui::Context) {
        ctx.send_viewport_cmd(ViewportCommand::Screenshot(UserData::default()));
        self.export_pending = true;
        debug!("chart export requested");
    }

    pub fn export_pending(&self) -> bool {
        self.export_pending
    }

    /// Captured chart image, if one has arrived
    pub fn take_export(&mut self) -> Option<ColorImage> {
        self.export.take()
    }

    pub fn apply_settings(&mut self, settings: &ChartSettings) {
        self.drawing.set_snap(settings.snap);
        self.drawing.set_tool(settings.tool);
        self.replay.set_speed(settings.speed);
        self.timeline.set_filter(settings.filter);
        self.set_indicators(settings.indicators.clone());
        self.price_decimals = settings.price_decimals;
    }

    /// Current configuration, with `view` as the remembered window
    pub fn export_settings(&self, view: Viewport) -> ChartSettings {
        ChartSettings {
            snap: self.drawing.snap(),
            tool: self.drawing.tool(),
            speed: self.replay.speed(),
            view: Some(view),
            filter: self.timeline.filter(),
            indicators: self.specs.clone(),
            price_decimals: self.price_decimals,
        }
    }

    /// Layout of the last shown frame
    pub fn layout(&self) -> Option<ChartLayout> {
        self.last_layout
    }

    /// Show the chart for window `view`
    pub fn show(&mut self, ui: &mut Ui, view: Viewport) -> ChartOutput {
        self.replay.scheduler_mut().attach(ui.ctx());
        self.collect_export(ui);
        self.indicator_lines();

        let total = self.manager.len();
        let mut view = view.clamp(total);
        let mut request: Option<Viewport> = None;
        let mut jump: Option<ChartEvent> = None;

        let (response, mut painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        if response.clicked() || response.drag_started() {
            response.request_focus();
        }
        let layout = ChartLayout::new(response.rect);
        self.last_layout = Some(layout);

        // Replay follows the cursor out of the window
        let outcome = self.replay.tick(Instant::now());
        if outcome != TickOutcome::Idle && total > 0 {
            let cursor = self.replay.cursor();
            if !view.contains(cursor) {
                let center = view.start as i64 + view.len() as i64 / 2;
                view = view.shifted(cursor.floor() as i64 - center, total);
                request = Some(view);
            }
        }

        // Keyboard
        if response.has_focus() {
            if let Some(next) = self.handle_keyboard(ui, view, total) {
                view = next;
                request = Some(view);
            }
        }

        let transform = self
            .manager
            .price_range(view)
            .and_then(|(lo, hi)| ChartTransform::new(layout.plot, view, lo, hi));
        let bars = self.manager.bars();

        let (pointer, pressed, down, released, shift, command, scroll) = ui.input(|i| {
            (
                i.pointer.interact_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.any_released(),
                i.modifiers.shift,
                i.modifiers.command,
                i.raw_scroll_delta.y,
            )
        });
        self.hover = response.hover_pos().filter(|p| layout.plot.contains(*p));

        // Wheel zoom around the bar under the pointer
        if let (Some(tf), Some(pos)) = (transform, self.hover) {
            if scroll != 0.0 {
                let next = view.zoomed(tf.index_at(pos.x), scroll > 0.0, total);
                if next != view {
                    view = next;
                    request = Some(view);
                }
            }
        }

        if pressed {
            if let Some(pos) = pointer {
                if layout.minimap.contains(pos) {
                    if let Some(next) = self.minimap.pointer_down(pos, layout.minimap, view, total) {
                        view = next;
                        request = Some(view);
                    }
                } else if layout.timeline.contains(pos) {
                    jump = self.timeline.hit(pos, &self.manager, layout.timeline, view).cloned();
                    if let Some(event) = &jump {
                        info!(t = %event.t, kind = event.kind.name(), "jump to event");
                    }
                } else if layout.plot.contains(pos) {
                    if shift {
                        self.pan = Some(PanState::new(pos.x, view));
                    } else if let Some(tf) = &transform {
                        if command {
                            self.replay_visible = true;
                            self.replay.set_cursor(tf.bar_at(pos.x) as f64);
                        } else {
                            self.drawing.pointer_down(pos, tf);
                        }
                    }
                }
            }
        }

        if down {
            if let Some(pos) = pointer {
                if let Some(pan) = self.pan {
                    let next = pan.update(pos.x, layout.plot.width(), total);
                    if next != view {
                        view = next;
                        request = Some(view);
                    }
                } else if self.minimap.is_dragging() {
                    if let Some(next) = self.minimap.pointer_move(pos.x, layout.minimap, total) {
                        if next != view {
                            view = next;
                            request = Some(view);
                        }
                    }
                } else if let Some(tf) = &transform {
                    self.drawing.pointer_move(pos, tf, bars);
                }
            }
        }

        // Release anywhere ends every gesture
        if released {
            self.pan = None;
            self.minimap.pointer_up();
            self.drawing.pointer_up();
        }

        let frame = FrameState {
            rect: layout.chart,
            bars,
            view,
            indicators: &self.lines,
            shapes: self.drawing.shapes(),
            draft: self.drawing.draft(),
            selected: self.drawing.selected(),
            hover: self.hover,
            replay_cursor: self.replay_visible.then(|| self.replay.cursor()),
            price_decimals: self.price_decimals,
        };
        let changed = self.detector.changed(&frame);
        CanvasRenderer::new(&mut painter).repaint(&frame);
        self.timeline.draw(&mut painter, layout.timeline, &self.manager, view);
        self.minimap.draw(&mut painter, layout.minimap, bars, view);

        ChartOutput {
            response,
            view: request,
            jump,
            changed,
        }
    }

    fn handle_keyboard(&mut self, ui: &Ui, view: Viewport, total: usize) -> Option<Viewport> {
        let mut next = view;
        ui.input(|i| {
            if i.key_pressed(Key::ArrowLeft) {
                next = next.shifted(-1, total);
            }
            if i.key_pressed(Key::ArrowRight) {
                next = next.shifted(1, total);
            }
            let center = next.start as f64 + next.len() as f64 / 2.0;
            if i.key_pressed(Key::ArrowUp) {
                next = next.zoomed(center, true, total);
            }
            if i.key_pressed(Key::ArrowDown) {
                next = next.zoomed(center, false, total);
            }
            if i.key_pressed(Key::Home) {
                next = Viewport::new(0, next.len()).clamp(total);
            }
            if i.key_pressed(Key::End) {
                next = Viewport::latest(total, next.len());
            }
        });

        let (escape, delete, space) = ui.input(|i| {
            (
                i.key_pressed(Key::Escape),
                i.key_pressed(Key::Delete) || i.key_pressed(Key::Backspace),
                i.key_pressed(Key::Space),
            )
        });
        if escape {
            self.drawing.cancel_draft();
        }
        if delete && self.drawing.delete_selected() {
            debug!("selected shape deleted");
        }
        if space {
            self.toggle_replay();
        }

        (next != view).then_some(next)
    }

    /// Pick up a screenshot answering [`ChartWidget::request_export`]
    fn collect_export(&mut self, ui: &Ui) {
        if !self.export_pending {
            return;
        }
        let image: Option<Arc<ColorImage>> = ui.input(|i| {
            i.events.iter().find_map(|event| match event {
                Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });
        let Some(image) = image else {
            return;
        };
        self.export_pending = false;
        let pixels_per_point = ui.ctx().pixels_per_point();
        self.export = Some(match self.last_layout {
            Some(layout) => image.region(&layout.chart, Some(pixels_per_point)),
            None => (*image).clone(),
        });
        info!(size = ?image.size, "chart export captured");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::drawing::DrawTool;
    use crate::chart::indicator::IndicatorKind;
    use crate::chart::shape::ShapeKind;
    use crate::object::test_util::bars_from_closes;
    use egui::{pos2, vec2, CentralPanel, Color32, Modifiers, MouseWheelUnit, PointerButton, RawInput};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn widget(n: usize) -> ChartWidget {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let mut widget = ChartWidget::new();
        widget.set_bars(bars_from_closes(&closes));
        widget
    }

    fn run_frame(
        ctx: &egui::Context,
        widget: &mut ChartWidget,
        view: Viewport,
        events: Vec<Event>,
    ) -> (Option<Viewport>, bool) {
        run_frame_with(ctx, widget, view, events, Modifiers::NONE)
    }

    fn run_frame_with(
        ctx: &egui::Context,
        widget: &mut ChartWidget,
        view: Viewport,
        events: Vec<Event>,
        modifiers: Modifiers,
    ) -> (Option<Viewport>, bool) {
        let input = RawInput {
            screen_rect: Some(Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0))),
            modifiers,
            events,
            ..Default::default()
        };
        let mut result = (None, false);
        let _ = ctx.run(input, |ctx| {
            CentralPanel::default().show(ctx, |ui| {
                let output = widget.show(ui, view);
                result = (output.view, output.changed);
            });
        });
        result
    }

    fn button(pos: Pos2, pressed: bool, modifiers: Modifiers) -> Event {
        Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed,
            modifiers,
        }
    }

    /// Widget over 400 bars showing 200..320, after one warm-up frame
    fn shown(ctx: &egui::Context) -> (ChartWidget, Viewport, ChartLayout) {
        let mut widget = widget(400);
        let view = Viewport::new(200, 320);
        run_frame(ctx, &mut widget, view, vec![]);
        let layout = widget.layout().unwrap();
        (widget, view, layout)
    }

    #[test]
    fn test_indicator_lines_follow_revision() {
        let mut widget = widget(50);
        assert_eq!(widget.indicator_lines().len(), 3);
        assert_eq!(widget.indicator_lines()[0].series.len(), 50);

        widget.set_indicators(vec![IndicatorSpec::new(IndicatorKind::Sma(5), Color32::RED)]);
        assert_eq!(widget.indicator_lines().len(), 1);

        let mut next = *widget.bars().last().unwrap();
        next.t = next.t + chrono::Duration::minutes(1);
        widget.update_bar(next);
        assert_eq!(widget.indicator_lines()[0].series.len(), 51);
    }

    #[test]
    fn test_settings_round_trip() {
        let mut widget = widget(50);
        let settings = ChartSettings {
            snap: true,
            tool: DrawTool::Trend,
            speed: ReplaySpeed::X8,
            view: None,
            filter: TimelineFilter {
                alerts: false,
                ..TimelineFilter::default()
            },
            indicators: vec![IndicatorSpec::new(IndicatorKind::Vwap, Color32::GREEN)],
            price_decimals: 3,
        };
        widget.apply_settings(&settings);
        let exported = widget.export_settings(Viewport::new(5, 45));
        assert_eq!(exported.view, Some(Viewport::new(5, 45)));
        assert_eq!(ChartSettings { view: None, ..exported }, settings);
    }

    #[test]
    fn test_shape_sink_receives_collection() {
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = received.clone();
        let mut widget = widget(50);
        widget.set_shape_sink(move |shapes| *sink.borrow_mut() = shapes);
        widget.set_tool(DrawTool::HLine);

        let layout = ChartLayout::new(Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0)));
        let tf = ChartTransform::from_bars(layout.plot, Viewport::new(0, 50), widget.bars()).unwrap();
        widget.drawing_mut().pointer_down(pos2(100.0, 100.0), &tf);

        let shapes = received.borrow().clone();
        assert_eq!(shapes.len(), 1);
        assert!(matches!(shapes[0].kind, ShapeKind::HLine { .. }));
        widget.set_shapes(&shapes);
        assert_eq!(widget.drawing().shapes().len(), 1);
    }

    #[test]
    fn test_replay_controls() {
        let mut widget = widget(30);
        assert!(!widget.replay_visible());
        widget.seek(10.4);
        widget.step_replay(3);
        assert_eq!(widget.replay().cursor(), 13.0);
        widget.step_replay(-20);
        assert_eq!(widget.replay().cursor(), 0.0);
        widget.play();
        assert!(widget.replay().is_playing());
        widget.exit_replay();
        assert!(!widget.replay().is_playing());
        assert!(!widget.replay_visible());
    }

    #[test]
    fn test_show_frames() {
        let ctx = egui::Context::default();
        let mut widget = widget(200);
        let view = widget.default_view();
        assert_eq!(view, Viewport::new(80, 200));

        let (request, changed) = run_frame(&ctx, &mut widget, view, vec![]);
        assert_eq!(request, None);
        assert!(changed);
        let layout = widget.layout().unwrap();
        assert!(layout.plot.width() > 0.0);
        assert!(layout.minimap.bottom() <= 600.0);

        // identical inputs
        let (_, changed) = run_frame(&ctx, &mut widget, view, vec![]);
        assert!(!changed);

        // hovering moves the crosshair
        let (_, moved) = run_frame(&ctx, &mut widget, view, vec![Event::PointerMoved(layout.plot.center())]);
        let (_, settled) = run_frame(&ctx, &mut widget, view, vec![]);
        assert!(moved || settled);
    }

    #[test]
    fn test_shift_drag_pans_until_release_outside() {
        let ctx = egui::Context::default();
        let (mut widget, view, layout) = shown(&ctx);
        let start = layout.plot.center();

        let (request, _) = run_frame_with(
            &ctx,
            &mut widget,
            view,
            vec![Event::PointerMoved(start), button(start, true, Modifiers::SHIFT)],
            Modifiers::SHIFT,
        );
        assert_eq!(request, None);
        assert_eq!(widget.pan.map(|p| p.origin_view), Some(view));
        assert!(!widget.drawing().is_dragging());

        // a quarter of the plot to the right reveals a quarter window of older bars
        let moved = start + vec2(layout.plot.width() / 4.0, 0.0);
        let (request, _) =
            run_frame_with(&ctx, &mut widget, view, vec![Event::PointerMoved(moved)], Modifiers::SHIFT);
        let panned = request.unwrap();
        assert_eq!(panned, Viewport::new(170, 290));

        let outside = pos2(900.0, 700.0);
        let (request, _) = run_frame(
            &ctx,
            &mut widget,
            panned,
            vec![Event::PointerMoved(outside), button(outside, false, Modifiers::NONE)],
        );
        assert_eq!(request, None);
        assert!(widget.pan.is_none());

        let (request, _) = run_frame(&ctx, &mut widget, panned, vec![Event::PointerMoved(start)]);
        assert_eq!(request, None);
    }

    #[test]
    fn test_wheel_zooms_around_hovered_bar() {
        let ctx = egui::Context::default();
        let (mut widget, view, layout) = shown(&ctx);
        run_frame(&ctx, &mut widget, view, vec![Event::PointerMoved(layout.plot.center())]);

        let wheel = |dy: f32| Event::MouseWheel {
            unit: MouseWheelUnit::Point,
            delta: vec2(0.0, dy),
            modifiers: Modifiers::NONE,
        };
        let (request, _) = run_frame(&ctx, &mut widget, view, vec![wheel(50.0)]);
        let zoomed = request.unwrap();
        assert_eq!(zoomed.len(), 108);
        // the hovered bar keeps its place in the middle
        assert!(zoomed.start > view.start && zoomed.end < view.end);
        assert!(zoomed.contains(260.0));

        let (request, _) = run_frame(&ctx, &mut widget, zoomed, vec![wheel(-50.0)]);
        assert!(request.unwrap().len() > zoomed.len());
    }

    #[test]
    fn test_minimap_drag_through_show() {
        let ctx = egui::Context::default();
        let (mut widget, view, layout) = shown(&ctx);
        let minimap = layout.minimap;
        let scale = minimap.width() / 400.0;
        let grab = pos2(minimap.left() + 260.0 * scale, minimap.center().y);

        let (request, _) = run_frame(
            &ctx,
            &mut widget,
            view,
            vec![Event::PointerMoved(grab), button(grab, true, Modifiers::NONE)],
        );
        assert_eq!(request, None);
        assert!(widget.minimap.is_dragging());

        let (request, _) = run_frame(
            &ctx,
            &mut widget,
            view,
            vec![Event::PointerMoved(grab + vec2(40.0 * scale, 0.0))],
        );
        assert_eq!(request, Some(Viewport::new(240, 360)));

        let outside = pos2(-20.0, -20.0);
        run_frame(
            &ctx,
            &mut widget,
            Viewport::new(240, 360),
            vec![Event::PointerMoved(outside), button(outside, false, Modifiers::NONE)],
        );
        assert!(!widget.minimap.is_dragging());
    }

    #[test]
    fn test_shape_drag_through_show() {
        let ctx = egui::Context::default();
        let (mut widget, view, layout) = shown(&ctx);
        let tf = ChartTransform::from_bars(layout.plot, view, widget.bars()).unwrap();
        let price = (tf.price_min + tf.price_max) / 2.0;
        widget.set_shapes(&[Shape::new(ShapeKind::HLine { price })]);

        let grab = pos2(layout.plot.center().x, tf.pixel_y(price));
        run_frame(
            &ctx,
            &mut widget,
            view,
            vec![Event::PointerMoved(grab), button(grab, true, Modifiers::NONE)],
        );
        assert!(widget.drawing().is_dragging());
        assert_eq!(widget.drawing().selected(), Some(widget.drawing().shapes()[0].id));

        run_frame(&ctx, &mut widget, view, vec![Event::PointerMoved(grab + vec2(0.0, 40.0))]);
        let ShapeKind::HLine { price: dragged } = widget.drawing().shapes()[0].kind else {
            panic!("hline expected");
        };
        assert!(dragged < price);

        let outside = pos2(900.0, 700.0);
        run_frame(
            &ctx,
            &mut widget,
            view,
            vec![Event::PointerMoved(outside), button(outside, false, Modifiers::NONE)],
        );
        assert!(!widget.drawing().is_dragging());
        assert_eq!(widget.drawing().shapes().len(), 1);
    }

    #[test]
    fn test_show_without_bars() {
        let ctx = egui::Context::default();
        let mut widget = ChartWidget::new();
        let (request, _) = run_frame(&ctx, &mut widget, Viewport::default(), vec![]);
        assert_eq!(request, None);
        assert!(widget.take_export().is_none());
    }
}
