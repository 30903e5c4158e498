//! Engine configuration
//!
//! Defaults reproduce the stock behaviour; a TOML file may override any
//! subset of fields.

use crate::error::{EngineError, EngineResult};
use ahl_host::{MarkerStyle, StorageArea};
use ahl_registry::REGISTRY_KEY;
use ahl_scan::{ScanConfig, ADDRESS_PATTERN, SENT_VIEW_PREFIX};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Highlight and harvest delays for one trigger, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDelays {
    /// Delay before the highlight pass
    pub highlight_ms: u64,
    /// Delay before the harvest pass
    pub harvest_ms: u64,
}

impl TaskDelays {
    /// Create delays
    #[inline]
    #[must_use]
    pub const fn new(highlight_ms: u64, harvest_ms: u64) -> Self {
        Self {
            highlight_ms,
            harvest_ms,
        }
    }

    /// Highlight delay
    #[inline]
    #[must_use]
    pub fn highlight(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }

    /// Harvest delay
    #[inline]
    #[must_use]
    pub fn harvest(&self) -> Duration {
        Duration::from_millis(self.harvest_ms)
    }
}

/// Debounce delays per trigger source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleDelays {
    /// Child-list mutation observed
    pub mutation: TaskDelays,
    /// Location fragment changed
    pub navigation: TaskDelays,
    /// Registry load finished
    pub startup: TaskDelays,
    /// External registry change (highlight only)
    pub store_change_ms: u64,
    /// Successful merge write (highlight only)
    pub merge_ms: u64,
}

impl ScheduleDelays {
    /// External change delay
    #[inline]
    #[must_use]
    pub fn store_change(&self) -> Duration {
        Duration::from_millis(self.store_change_ms)
    }

    /// Post-merge delay
    #[inline]
    #[must_use]
    pub fn merge(&self) -> Duration {
        Duration::from_millis(self.merge_ms)
    }
}

impl Default for ScheduleDelays {
    fn default() -> Self {
        Self {
            mutation: TaskDelays::new(800, 1500),
            navigation: TaskDelays::new(1000, 2000),
            startup: TaskDelays::new(5000, 6000),
            store_change_ms: 1000,
            merge_ms: 1000,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Store key of the registered address list
    pub storage_key: String,
    /// Store area whose change notifications are acted on
    pub storage_area: StorageArea,
    /// Marker class and style sheet
    pub marker: MarkerStyle,
    /// Scanned tags and attributes
    pub scan: ScanConfig,
    /// Fragment prefix that enables harvesting
    pub harvest_prefix: String,
    /// Address extraction pattern
    pub harvest_pattern: String,
    /// Debounce delays
    pub delays: ScheduleDelays,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With delays
    #[inline]
    #[must_use]
    pub fn with_delays(mut self, delays: ScheduleDelays) -> Self {
        self.delays = delays;
        self
    }

    /// Parse TOML; missing fields keep their defaults
    pub fn from_toml_str(raw: &str) -> EngineResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Load a TOML file
    pub async fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| EngineError::config_io(path, e))?;
        Self::from_toml_str(&raw)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_key: REGISTRY_KEY.to_string(),
            storage_area: StorageArea::Sync,
            marker: MarkerStyle::default(),
            scan: ScanConfig::default(),
            harvest_prefix: SENT_VIEW_PREFIX.to_string(),
            harvest_pattern: ADDRESS_PATTERN.to_string(),
            delays: ScheduleDelays::default(),
        }
    }
}
