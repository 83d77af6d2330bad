//! Error type for the fallible edges of the chart engine.
//!
//! Interaction and rendering never fail; only configuration, log file I/O
//! and subscriber installation return errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or saving chart state.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid chart configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to resolve the user config directory")]
    NoConfigDir,

    #[error("configuration file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to install logger: {0}")]
    Logger(String),
}

pub type Result<T> = std::result::Result<T, ChartError>;
