//! Dashboard configuration.
//!
//! Settings live in `macrodash.json` in the working directory, or wherever
//! `MACRODASH_CONFIG` points. Partial files are fine: anything unspecified
//! falls back to the defaults below. `MACRODASH_DATA` overrides the dataset
//! path without touching the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::Indicator;

pub const CONFIG_FILE: &str = "macrodash.json";
pub const CONFIG_ENV: &str = "MACRODASH_CONFIG";
pub const DATA_ENV: &str = "MACRODASH_DATA";

/// Startup settings for the dashboard window and its default selections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset loaded at startup.
    pub data_path: PathBuf,

    /// Indicators pre-selected on the comparison page, by header name.
    pub default_indicators: Vec<String>,

    /// Default scatter axes, by header name.
    pub scatter_x: String,
    pub scatter_y: String,

    pub window_width: f32,
    pub window_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("world_bank_data_2025.csv"),
            default_indicators: vec![
                Indicator::Gdp.name().to_string(),
                Indicator::InflationCpi.name().to_string(),
                Indicator::UnemploymentRate.name().to_string(),
            ],
            scatter_x: Indicator::InflationCpi.name().to_string(),
            scatter_y: Indicator::Gdp.name().to_string(),
            window_width: 1280.0,
            window_height: 820.0,
        }
    }
}

impl DashboardConfig {
    /// Load from `MACRODASH_CONFIG` or `./macrodash.json`, then apply
    /// `MACRODASH_DATA`. A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };

        if let Some(data) = std::env::var_os(DATA_ENV) {
            config.data_path = PathBuf::from(data);
        }
        Ok(config)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Configured default indicators that name a known indicator.
    /// Unknown names are logged and skipped.
    pub fn indicators(&self) -> Vec<Indicator> {
        self.default_indicators
            .iter()
            .filter_map(|name| parse_or_warn(name))
            .collect()
    }

    /// Configured scatter axes, falling back to the defaults for bad names.
    pub fn scatter_axes(&self) -> (Indicator, Indicator) {
        (
            parse_or_warn(&self.scatter_x).unwrap_or(Indicator::InflationCpi),
            parse_or_warn(&self.scatter_y).unwrap_or(Indicator::Gdp),
        )
    }
}

fn parse_or_warn(name: &str) -> Option<Indicator> {
    match name.parse() {
        Ok(ind) => Some(ind),
        Err(e) => {
            log::warn!("Ignoring config entry: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "data_path": "other.csv" }}"#).unwrap();

        let config = DashboardConfig::load_from(file.path()).unwrap();
        assert_eq!(config.data_path, PathBuf::from("other.csv"));
        assert_eq!(config.default_indicators, DashboardConfig::default().default_indicators);
        assert_eq!(config.window_width, 1280.0);
    }

    #[test]
    fn unknown_indicator_names_are_skipped() {
        let config = DashboardConfig {
            default_indicators: vec![
                "Public Debt (% of GDP)".into(),
                "Happiness Index".into(),
            ],
            scatter_x: "nope".into(),
            ..DashboardConfig::default()
        };
        assert_eq!(config.indicators(), vec![Indicator::PublicDebt]);
        assert_eq!(config.scatter_axes(), (Indicator::InflationCpi, Indicator::Gdp));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(DashboardConfig::load_from(file.path()).is_err());
    }
}
