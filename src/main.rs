//! Trade Chart - Demo Application Entry Point
//!
//! Opens a chart window over a synthetic random-walk series with drawing
//! tools, replay controls and an event timeline.

use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use chrono::{Duration, DurationRound, Utc};
use eframe::egui;
use rand::Rng;
use tracing::{info, warn};

use trade_chart::chart::{
    ChartEvent, ChartWidget, DrawTool, EventKind, ReplaySpeed, Shape, Signal, Viewport,
};
use trade_chart::logger::{init_logger, LogConfig};
use trade_chart::{Bar, ChartSettings, Interval};

const SYMBOL: &str = "DEMO/USDT";
const BAR_COUNT: usize = 2_000;

/// Application state for the chart demo
struct ChartApp {
    chart: ChartWidget,
    /// Visible window, owned here and updated from the widget's requests
    view: Viewport,
    /// Authoritative shape collection
    shapes: Rc<RefCell<Vec<Shape>>>,
    interval: Interval,
    last_export: Option<[usize; 2]>,
    status: String,
}

impl ChartApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let interval = Interval::Minute;
        let bars = generate_bars(BAR_COUNT, interval);
        let events = generate_events(&bars);

        let mut chart = ChartWidget::new();
        chart.set_bars(bars);
        chart.set_events(events);

        let settings = ChartSettings::load_or_default(SYMBOL);
        chart.apply_settings(&settings);
        let view = settings
            .view
            .map(|v| v.clamp(chart.manager().len()))
            .unwrap_or_else(|| chart.default_view());

        let shapes = Rc::new(RefCell::new(Vec::new()));
        let sink = shapes.clone();
        chart.set_shape_sink(move |next| *sink.borrow_mut() = next);

        info!(symbol = SYMBOL, bars = BAR_COUNT, "chart demo ready");

        Self {
            chart,
            view,
            shapes,
            interval,
            last_export: None,
            status: String::new(),
        }
    }

    fn ui_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mut tool = self.chart.drawing().tool();
            for candidate in DrawTool::all() {
                ui.selectable_value(&mut tool, *candidate, candidate.name());
            }
            if tool != self.chart.drawing().tool() {
                self.chart.set_tool(tool);
            }

            let mut snap = self.chart.drawing().snap();
            if ui.checkbox(&mut snap, "Snap").changed() {
                self.chart.set_snap(snap);
            }

            ui.separator();

            let playing = self.chart.replay().is_playing();
            if ui.button(if playing { "Pause" } else { "Play" }).clicked() {
                self.chart.toggle_replay();
            }
            if ui.button("<").clicked() {
                self.chart.step_replay(-1);
            }
            if ui.button(">").clicked() {
                self.chart.step_replay(1);
            }
            if ui.button("Exit replay").clicked() {
                self.chart.exit_replay();
            }

            let mut speed = self.chart.replay().speed();
            egui::ComboBox::from_id_salt("replay_speed")
                .selected_text(speed.label())
                .show_ui(ui, |ui| {
                    for candidate in ReplaySpeed::all() {
                        ui.selectable_value(&mut speed, *candidate, candidate.label());
                    }
                });
            if speed != self.chart.replay().speed() {
                self.chart.set_replay_speed(speed);
            }

            ui.separator();

            let mut filter = self.chart.timeline().filter();
            for kind in EventKind::all() {
                let mut shown = filter.allows(*kind);
                if ui.checkbox(&mut shown, kind.name()).changed() {
                    filter.toggle(*kind);
                }
            }
            if filter != self.chart.timeline().filter() {
                self.chart.set_filter(filter);
            }

            ui.separator();

            if ui.button("Export").clicked() {
                self.chart.request_export(ui.ctx());
            }
            if ui.button("Save settings").clicked() {
                self.save_settings();
            }
            ui.label(&self.status);
        });
    }

    fn ui_side_panel(&self, ui: &mut egui::Ui) {
        let kpis = self.chart.kpis(self.interval);
        let decimals = self.chart.price_decimals();
        ui.heading(SYMBOL);
        egui::Grid::new("kpis").num_columns(2).show(ui, |ui| {
            ui.label("Last");
            ui.label(format!("{:.prec$}", kpis.last, prec = decimals));
            ui.end_row();
            ui.label("24h change");
            ui.label(format!("{:+.2}%", kpis.change_24h_pct));
            ui.end_row();
            ui.label("Volatility");
            ui.label(format!("{:.2}%", kpis.volatility_pct));
            ui.end_row();
            ui.label("ATR(14)");
            ui.label(format!("{:.prec$}", kpis.atr14, prec = decimals));
            ui.end_row();
            ui.label("24h range");
            ui.label(format!("{:.2}%", kpis.range_24h_pct));
            ui.end_row();
            ui.label("24h volume");
            ui.label(format!("{:.0}", kpis.volume_24h));
            ui.end_row();
        });

        ui.separator();
        ui.label("Signals");
        egui::Grid::new("signals").num_columns(2).show(ui, |ui| {
            for entry in self.chart.signal_matrix() {
                ui.label(&entry.name);
                let (text, color) = match entry.signal {
                    Signal::Above => ("▲", egui::Color32::from_rgb(38, 166, 154)),
                    Signal::Below => ("▼", egui::Color32::from_rgb(239, 83, 80)),
                    Signal::Neutral => ("-", egui::Color32::GRAY),
                };
                ui.colored_label(color, text);
                ui.end_row();
            }
        });

        if let Some([w, h]) = self.last_export {
            ui.separator();
            ui.label(format!("Last export: {}x{}", w, h));
        }
    }

    fn save_settings(&mut self) {
        match self.chart.export_settings(self.view).save(SYMBOL) {
            Ok(path) => self.status = format!("Saved to {}", path.display()),
            Err(e) => {
                warn!(error = %e, "failed to save chart settings");
                self.status = format!("Save failed: {}", e);
            }
        }
    }
}

impl eframe::App for ChartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("chart_toolbar").show(ctx, |ui| self.ui_toolbar(ui));
        egui::SidePanel::right("chart_info")
            .default_width(180.0)
            .show(ctx, |ui| self.ui_side_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            let shapes = self.shapes.borrow().clone();
            self.chart.set_shapes(&shapes);

            let output = self.chart.show(ui, self.view);
            if let Some(view) = output.view {
                self.view = view;
            }
            if let Some(event) = output.jump {
                if let Some(ix) = self.chart.manager().nearest_index(event.t) {
                    let center = self.view.start + self.view.len() / 2;
                    self.view = self.view.shifted(ix as i64 - center as i64, self.chart.manager().len());
                    self.chart.seek(ix as f64);
                }
            }
        });

        if let Some(image) = self.chart.take_export() {
            info!(width = image.size[0], height = image.size[1], "chart exported");
            self.last_export = Some(image.size);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.save_settings();
        info!("chart demo closed");
    }
}

/// Random-walk bars ending now
fn generate_bars(n: usize, interval: Interval) -> Vec<Bar> {
    let mut rng = rand::rng();
    let step = Duration::seconds(interval.seconds());
    let now = Utc::now().duration_trunc(step).unwrap_or_else(|_| Utc::now());
    let start = now - step * n as i32;

    let mut price = 100.0_f64;
    (0..n)
        .map(|i| {
            let open = price;
            let close = (open * (1.0 + rng.random_range(-0.004..0.004))).max(0.01);
            let high = open.max(close) * (1.0 + rng.random_range(0.0..0.002));
            let low = open.min(close) * (1.0 - rng.random_range(0.0..0.002));
            price = close;
            Bar::new(
                start + step * i as i32,
                open,
                high,
                low,
                close,
                Some(rng.random_range(10.0..500.0)),
            )
        })
        .collect()
}

/// A handful of events spread over the series
fn generate_events(bars: &[Bar]) -> Vec<ChartEvent> {
    let mut rng = rand::rng();
    let kinds = EventKind::all();
    (0..12)
        .filter_map(|i| {
            let bar = bars.get(rng.random_range(0..bars.len().max(1)))?;
            let kind = kinds[i % kinds.len()];
            Some(ChartEvent::new(bar.t, kind, format!("{} #{}", kind.name(), i + 1)))
        })
        .collect()
}

/// Create native window options
fn create_native_options() -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Trade Chart")
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logger(&LogConfig::default())?;

    info!("starting Trade Chart");
    info!("version: {}", trade_chart::VERSION);
    info!("rustc version: {}", rustc_version_runtime::version());

    eframe::run_native(
        "Trade Chart",
        create_native_options(),
        Box::new(|cc| Ok(Box::new(ChartApp::new(cc)))),
    )
    .map_err(|e| format!("Failed to run application: {}", e))?;

    Ok(())
}
