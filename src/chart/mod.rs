//! Chart module: candlestick rendering, indicators, drawing tools and replay.
//!
//! This module provides:
//! - `BarManager` - Bar storage with datetime indexing and cached extrema
//! - `indicator` - SMA, EMA, VWAP, MACD, ATR, KPIs and the signal matrix
//! - `Viewport` / `ChartTransform` - Visible window and data/pixel mapping
//! - `DrawingManager` - Horizontal line, trendline and Fibonacci tools
//! - `RenderLoop` - Layered repaint through the `Canvas` abstraction
//! - `ReplayEngine` - Time-based replay of historical bars
//! - `Minimap` / `Timeline` - Series navigator and event markers
//! - `ChartWidget` - egui widget wiring all of the above
//!
//! # Example
//!
//! ```ignore
//! use trade_chart::chart::ChartWidget;
//!
//! let mut chart = ChartWidget::new();
//! chart.set_bars(bars);
//! let mut view = chart.default_view();
//! // inside an egui frame
//! let output = chart.show(ui, view);
//! if let Some(next) = output.view {
//!     view = next;
//! }
//! ```

mod base;
pub mod canvas;
pub mod drawing;
pub mod geometry;
pub mod indicator;
mod item;
mod manager;
pub mod minimap;
pub mod render;
pub mod replay;
pub mod shape;
pub mod timeline;
pub mod viewport;
mod widget;

pub use base::*;
pub use canvas::{Canvas, Layer};
pub use drawing::{DrawTool, DrawingManager};
pub use indicator::{IndicatorKind, IndicatorSeries, IndicatorSpec, Kpis, Macd, Signal, SignalEntry};
pub use item::{CandleItem, ChartItem, CrosshairItem, GridItem, IndicatorItem, ReplayCursorItem, ShapeItem, ShapeStyle};
pub use manager::BarManager;
pub use minimap::{Minimap, MinimapGrip};
pub use render::{ChangeDetector, DetectingRenderLoop, FrameState, IndicatorLine, RenderLoop};
pub use replay::{EguiScheduler, FrameScheduler, ReplayEngine, ReplaySpeed, ReplayState};
pub use shape::{Anchor, Handle, Shape, ShapeKind};
pub use timeline::{ChartEvent, EventKind, Timeline, TimelineFilter};
pub use viewport::{ChartTransform, Viewport};
pub use widget::{ChartLayout, ChartOutput, ChartWidget};
