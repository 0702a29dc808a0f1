//! Configuration loading and typed config structures for the Hallow engine.
//!
//! The canonical configuration lives in `hallow-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file. Every field has a
//! default, so an empty document is a valid configuration with an empty
//! catalog.

use std::path::Path;

use hallow_rites::{RawCatalog, TierConfig};
use hallow_world::DEFAULT_MAX_SITE_COLUMNS;
use serde::Deserialize;

/// Environment variable that overrides `logging.level`.
pub const LOG_LEVEL_ENV: &str = "HALLOW_LOG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `hallow-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HallowConfig {
    /// Prayer rewards and pacing.
    #[serde(default)]
    pub prayer: PrayerConfig,

    /// Area tracker scan settings.
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Tier limits.
    #[serde(default)]
    pub tiers: TierConfig,

    /// Holy-site registry limits.
    #[serde(default)]
    pub sites: SitesConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Offering and ritual tables, validated at catalog load.
    #[serde(default)]
    pub catalog: RawCatalog,
}

impl HallowConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The `HALLOW_LOG` environment variable overrides `logging.level`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.logging.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.logging.apply_env_overrides();
        Ok(config)
    }
}

/// Prayer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PrayerConfig {
    /// Favor granted for every successful prayer, offering or not.
    #[serde(default = "default_base_favor")]
    pub base_favor: u32,

    /// World hours a player must wait between successful prayers.
    #[serde(default = "default_cooldown_hours")]
    pub cooldown_hours: f64,
}

impl Default for PrayerConfig {
    fn default() -> Self {
        Self {
            base_favor: default_base_favor(),
            cooldown_hours: default_cooldown_hours(),
        }
    }
}

/// Area tracker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TrackerConfig {
    /// Milliseconds between position scans.
    #[serde(default = "default_scan_interval_ms")]
    pub scan_interval_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: default_scan_interval_ms(),
        }
    }
}

/// Holy-site registry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SitesConfig {
    /// Most chunk columns one site's regions may touch.
    #[serde(default = "default_max_site_columns")]
    pub max_site_columns: u64,
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            max_site_columns: default_max_site_columns(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Apply environment variable overrides (`HALLOW_LOG`).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var(LOG_LEVEL_ENV)
            && !level.trim().is_empty()
        {
            self.level = level;
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_base_favor() -> u32 {
    1
}

const fn default_cooldown_hours() -> f64 {
    1.0
}

const fn default_scan_interval_ms() -> u64 {
    1000
}

const fn default_max_site_columns() -> u64 {
    DEFAULT_MAX_SITE_COLUMNS
}

fn default_log_level() -> String {
    String::from("info")
}
