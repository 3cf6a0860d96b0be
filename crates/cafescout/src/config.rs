//! # Configuration
//!
//! Configuration is loaded with [`confique`] from layered sources.
//!
//! ## Resolution Order
//!
//! Highest priority first:
//! 1. **Command-line overrides**: `--api-url` (applied by the CLI after loading)
//! 2. **Environment variables**: `CAFESCOUT_API_URL`, `CAFESCOUT_TIMEOUT_SECS`,
//!    `CAFESCOUT_PERSIST_SESSION`
//! 3. **Config file**: `cafescout.toml` in the OS config directory (via the
//!    `directories` crate), or in `$CAFESCOUT_CONFIG_DIR` when set
//! 4. **Compiled defaults**: `#[config(default = ...)]` below
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `api_url` | `http://localhost:8080/api` | Base URL of the café service |
//! | `request_timeout_secs` | `10` | Per-request timeout |
//! | `persist_session` | `true` | Keep the login in `session.json` between runs |
//! | `filters.*` | unrestricted | Initial committed discovery filters |
//!
//! ## Data Directory
//!
//! The session file lives in the OS data directory, or in
//! `$CAFESCOUT_DATA_DIR` when set.

use crate::discovery::FilterConfig;
use crate::error::{CafeError, Result};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "cafescout.toml";
pub const DATA_DIR_ENV: &str = "CAFESCOUT_DATA_DIR";
pub const CONFIG_DIR_ENV: &str = "CAFESCOUT_CONFIG_DIR";

/// Configuration for cafescout, stored in `cafescout.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CafeConfig {
    /// Base URL of the café REST service.
    #[config(default = "http://localhost:8080/api", env = "CAFESCOUT_API_URL")]
    pub api_url: String,

    /// Timeout for each backend request, in seconds.
    #[config(default = 10, env = "CAFESCOUT_TIMEOUT_SECS")]
    pub request_timeout_secs: u64,

    /// Whether a login is written to `session.json`.
    #[config(default = true, env = "CAFESCOUT_PERSIST_SESSION")]
    pub persist_session: bool,

    /// Filters applied when a browse session starts.
    #[config(nested)]
    pub filters: FilterDefaults,
}

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FilterDefaults {
    #[config(default = false)]
    pub wifi: bool,
    #[config(default = false)]
    pub bathrooms: bool,
    #[config(default = false)]
    pub outlets: bool,
    #[config(default = false)]
    pub metro: bool,
    #[config(default = 3)]
    pub price_range: u8,
    #[config(default = 0.0)]
    pub min_rating: f64,
    #[config(default = 10)]
    pub max_distance: u8,
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self::from(&FilterConfig::default())
    }
}

impl From<&FilterConfig> for FilterDefaults {
    fn from(filters: &FilterConfig) -> Self {
        Self {
            wifi: filters.wifi,
            bathrooms: filters.bathrooms,
            outlets: filters.outlets,
            metro: filters.metro,
            price_range: filters.price_range,
            min_rating: filters.min_rating,
            max_distance: filters.max_distance,
        }
    }
}

impl FilterDefaults {
    /// The configured filters, clamped to values the panel can produce.
    pub fn to_filter_config(&self) -> FilterConfig {
        FilterConfig {
            wifi: self.wifi,
            bathrooms: self.bathrooms,
            outlets: self.outlets,
            metro: self.metro,
            price_range: self.price_range,
            min_rating: self.min_rating,
            max_distance: self.max_distance,
        }
        .normalized()
    }
}

impl Default for CafeConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api".to_string(),
            request_timeout_secs: 10,
            persist_session: true,
            filters: FilterDefaults::default(),
        }
    }
}

impl CafeConfig {
    /// Loads env vars over `dir/cafescout.toml` (if present) over defaults.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(dir) = dir {
            builder = builder.file(dir.join(CONFIG_FILENAME));
        }
        builder.load().map_err(|e| CafeError::Config(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Dotted `key = value` lines for display.
    pub fn entries(&self) -> Vec<(String, String)> {
        let f = &self.filters;
        vec![
            ("api_url".to_string(), self.api_url.clone()),
            (
                "request_timeout_secs".to_string(),
                self.request_timeout_secs.to_string(),
            ),
            ("persist_session".to_string(), self.persist_session.to_string()),
            ("filters.wifi".to_string(), f.wifi.to_string()),
            ("filters.bathrooms".to_string(), f.bathrooms.to_string()),
            ("filters.outlets".to_string(), f.outlets.to_string()),
            ("filters.metro".to_string(), f.metro.to_string()),
            ("filters.price_range".to_string(), f.price_range.to_string()),
            ("filters.min_rating".to_string(), f.min_rating.to_string()),
            ("filters.max_distance".to_string(), f.max_distance.to_string()),
        ]
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "cafescout")
}

/// Directory holding `cafescout.toml`.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| project_dirs().map(|d| d.config_dir().to_path_buf()))
}

/// Directory holding `session.json`.
pub fn data_dir() -> Result<PathBuf> {
    std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| project_dirs().map(|d| d.data_dir().to_path_buf()))
        .ok_or_else(|| CafeError::Config("could not determine a data directory".to_string()))
}
