//! Trade Chart - an interactive candlestick charting engine written in Rust
//!
//! This crate provides:
//!
//! - Technical indicators over OHLCV bars
//! - A zoomable, pannable price chart with crosshair and tooltips
//! - Annotation tools with hit-testing, drag editing and price snapping
//! - Time-based replay of historical bars
//! - A minimap navigator and an event timeline
//! - Per-symbol chart settings and logging setup
//!
//! Rendering goes through [`chart::Canvas`]; the egui widget is
//! [`chart::ChartWidget`].

pub mod chart;
pub mod constant;
pub mod error;
pub mod logger;
pub mod object;
pub mod setting;

pub use constant::Interval;
pub use error::{ChartError, Result};
pub use object::Bar;
pub use setting::ChartSettings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
