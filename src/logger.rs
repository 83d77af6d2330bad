//! Logging setup for the chart application.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Local;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::error::{ChartError, Result};

/// Log level constants (compatible with Python logging module)
pub const DEBUG: i32 = 10;
pub const INFO: i32 = 20;
pub const WARNING: i32 = 30;
pub const ERROR: i32 = 40;
pub const CRITICAL: i32 = 50;

/// Convert integer log level to tracing Level
pub fn level_from_int(level: i32) -> Level {
    match level {
        i32::MIN..=10 => Level::DEBUG,
        11..=20 => Level::INFO,
        21..=30 => Level::WARN,
        _ => Level::ERROR,
    }
}

/// Convert integer log level to string
pub fn level_to_string(level: i32) -> &'static str {
    match level {
        i32::MIN..=10 => "DEBUG",
        11..=20 => "INFO",
        21..=30 => "WARNING",
        31..=40 => "ERROR",
        _ => "CRITICAL",
    }
}

/// Where log output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: i32,
    pub console: bool,
    /// Append to a daily file under the data directory
    pub file: bool,
    /// Write the file as JSON lines
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: INFO,
            console: true,
            file: false,
            json: false,
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber. `RUST_LOG` directives are honoured on top
/// of the configured level.
pub fn init_logger(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(level_from_int(config.level).into());
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.console {
        layers.push(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_ansi(true)
                .boxed(),
        );
    }

    if config.file {
        let log_path = get_log_file_path()?;
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&log_path)?;
        let file_layer = fmt::layer().with_writer(Mutex::new(file)).with_ansi(false);
        layers.push(if config.json {
            file_layer.json().boxed()
        } else {
            file_layer.boxed()
        });
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| ChartError::Logger(e.to_string()))
}

/// Log folder under the user data directory
pub fn get_log_folder() -> Result<PathBuf> {
    Ok(dirs::data_dir()
        .ok_or(ChartError::NoConfigDir)?
        .join("trade_chart")
        .join("log"))
}

/// Get the log file path for today
fn get_log_file_path() -> Result<PathBuf> {
    let today = Local::now().format("%Y%m%d").to_string();
    Ok(get_log_folder()?.join(format!("chart_{}.log", today)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_int() {
        assert_eq!(level_from_int(DEBUG), Level::DEBUG);
        assert_eq!(level_from_int(INFO), Level::INFO);
        assert_eq!(level_from_int(WARNING), Level::WARN);
        assert_eq!(level_from_int(ERROR), Level::ERROR);
        assert_eq!(level_from_int(-5), Level::DEBUG);
    }

    #[test]
    fn test_level_to_string() {
        assert_eq!(level_to_string(DEBUG), "DEBUG");
        assert_eq!(level_to_string(INFO), "INFO");
        assert_eq!(level_to_string(WARNING), "WARNING");
        assert_eq!(level_to_string(ERROR), "ERROR");
        assert_eq!(level_to_string(CRITICAL), "CRITICAL");
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, INFO);
        assert!(config.console);
        assert!(!config.file);
    }
}
