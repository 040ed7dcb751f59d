use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use storelens_analytics::{category::DEFAULT_GROWTH_WINDOW_DAYS, BinSpec, Version, ViewOptions};
use storelens_source::SourceConfig;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "storelens.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Application settings. Every key is optional.
///
/// ```toml
/// api_url = "http://localhost:8000"
/// health_timeout_secs = 3
/// fetch_limit = 10000
/// version = "v2"
///
/// [fixture]
/// seed = 42
/// records = 5000
/// start = "2024-01-01"
/// days = 365
///
/// [histogram]
/// order_bin_width = 100
/// max_bins = 10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(flatten)]
    pub source: SourceConfig,
    pub histogram: BinSpec,
    pub version: Version,
    pub growth_window_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            histogram: BinSpec::default(),
            version: Version::default(),
            growth_window_days: DEFAULT_GROWTH_WINDOW_DAYS,
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// An explicit path must exist; the fallback is read only if present,
    /// otherwise defaults apply.
    pub fn resolve(explicit: Option<&Path>, fallback: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_path(path),
            None if fallback.is_file() => Self::from_path(fallback),
            None => {
                tracing::debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Overrides the feed URL. An empty string turns the feed off.
    pub fn with_api_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            let url = url.trim();
            self.source.api_url = (!url.is_empty()).then(|| url.to_string());
        }
        self
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            bins: self.histogram,
            growth_window_days: self.growth_window_days,
            cohort_horizon: None,
        }
    }
}
