//! Per-symbol chart configuration persisted as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chart::drawing::DrawTool;
use crate::chart::indicator::{default_indicators, IndicatorSpec};
use crate::chart::replay::ReplaySpeed;
use crate::chart::timeline::TimelineFilter;
use crate::chart::viewport::Viewport;
use crate::error::{ChartError, Result};

/// Folder name under the user config directory
const APP_DIR: &str = "trade_chart";
const CONFIG_DIR: &str = "chart_configs";

/// Chart configuration for saving/loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub snap: bool,
    pub tool: DrawTool,
    pub speed: ReplaySpeed,
    /// Last visible window; `None` opens on the latest bars
    pub view: Option<Viewport>,
    pub filter: TimelineFilter,
    pub indicators: Vec<IndicatorSpec>,
    pub price_decimals: usize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            snap: false,
            tool: DrawTool::Cursor,
            speed: ReplaySpeed::X1,
            view: None,
            filter: TimelineFilter::default(),
            indicators: default_indicators(),
            price_decimals: 2,
        }
    }
}

impl ChartSettings {
    /// Directory holding every symbol's chart file
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or(ChartError::NoConfigDir)?
            .join(APP_DIR)
            .join(CONFIG_DIR))
    }

    pub fn file_name(symbol: &str) -> String {
        format!("{}_chart.json", symbol.replace(['/', '\\'], "_"))
    }

    pub fn path_for(symbol: &str) -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(Self::file_name(symbol)))
    }

    /// Save configuration for `symbol`, returning the file written
    pub fn save(&self, symbol: &str) -> Result<PathBuf> {
        let path = Self::path_for(symbol)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!(path = %path.display(), "chart settings saved");
        Ok(())
    }

    /// Load configuration for `symbol`
    pub fn load(symbol: &str) -> Result<Self> {
        Self::load_from(&Self::path_for(symbol)?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ChartError::NotFound(path.to_path_buf()));
        }
        let json = fs::read_to_string(path)?;
        let settings: ChartSettings = serde_json::from_str(&json)?;
        info!(path = %path.display(), "chart settings loaded");
        Ok(settings)
    }

    /// Stored settings, or defaults when there are none or they are unreadable
    pub fn load_or_default(symbol: &str) -> Self {
        match Self::load(symbol) {
            Ok(settings) => settings,
            Err(ChartError::NotFound(_)) => Self::default(),
            Err(e) => {
                warn!(symbol, error = %e, "falling back to default chart settings");
                Self::default()
            }
        }
    }
}
