//! Daemon configuration file.
//!
//! Lives at `<config dir>/clipline/config.json`. Every field is optional;
//! a missing file means defaults. User-facing preferences (history size,
//! shortcuts) are not here, they live in the settings database.

use anyhow::{Context, Result};
use clipline_application::{EngineConfig, DEFAULT_POLL_INTERVAL, DEFAULT_SETTLE_DELAY, MAX_IMAGE_BYTES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LOG_FILTER: &str = "info,clipline=debug";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub poll_interval_ms: u64,
    pub settle_delay_ms: u64,
    pub max_image_bytes: usize,
    /// Settings database; defaults to `<data dir>/clipline/settings.db`.
    pub database_path: Option<PathBuf>,
    /// Used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Show the macOS accessibility prompt at startup if access is missing.
    pub prompt_accessibility: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
            max_image_bytes: MAX_IMAGE_BYTES,
            database_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            prompt_accessibility: true,
        }
    }
}

impl DaemonConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("clipline").join("config.json"))
    }

    /// Load from the default location.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file yields defaults; an unreadable or
    /// malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        serde_json::from_slice(&bytes).with_context(|| format!("malformed config {}", path.display()))
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("clipline").join("settings.db"))
            .context("no data directory for the settings database; set database_path")
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            max_image_bytes: self.max_image_bytes,
            ..EngineConfig::default()
        }
    }
}
