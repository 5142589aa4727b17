//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. PICKING_CONFIG environment variable
//! 3. Default: config/picking.toml
//!
//! The excluded temperature zones are also exposed as process-wide state,
//! initialised exactly once (see [`excluded_zones`]).

use crate::domain::ZoneFilter;
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{info, warn};

pub const CONFIG_ENV_VAR: &str = "PICKING_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/picking.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct ZonesConfig {
    /// Temperature zone tokens to drop from the result (e.g. "chilled")
    #[serde(default = "default_excluded_zones")]
    pub excluded: Vec<String>,
}

impl Default for ZonesConfig {
    fn default() -> Self {
        Self { excluded: default_excluded_zones() }
    }
}

fn default_excluded_zones() -> Vec<String> {
    vec!["chilled".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_events")]
    pub max_events: usize,
    #[serde(default = "default_max_time_ms")]
    pub max_time_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_events: default_max_events(), max_time_ms: default_max_time_ms() }
    }
}

fn default_max_events() -> usize {
    100
}

fn default_max_time_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub zones: ZonesConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    excluded_zones: ZoneFilter,
    max_events: usize,
    max_time_ms: u64,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default".to_string())
    }
}

impl Config {
    fn from_toml(toml_config: TomlConfig, config_file: String) -> Self {
        Self {
            excluded_zones: ZoneFilter::from_tokens(&toml_config.zones.excluded),
            max_events: toml_config.limits.max_events,
            max_time_ms: toml_config.limits.max_time_ms,
            config_file,
        }
    }

    /// Determine config file path from args or environment
    pub fn resolve_config_path(args: &[String]) -> String {
        // Check for --config argument
        for (i, arg) in args.iter().enumerate() {
            if arg == "--config" {
                if let Some(path) = args.get(i + 1) {
                    return path.clone();
                }
            }
            if let Some(path) = arg.strip_prefix("--config=") {
                return path.to_string();
            }
        }

        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return path;
        }

        DEFAULT_CONFIG_PATH.to_string()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_toml_str(&content, &path.display().to_string())
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Parse configuration from TOML text; `origin` is recorded as the config file name
    pub fn from_toml_str(content: &str, origin: &str) -> anyhow::Result<Self> {
        let toml_config: TomlConfig = toml::from_str(content)?;
        Ok(Self::from_toml(toml_config, origin.to_string()))
    }

    /// Load configuration from a path, falling back to defaults on any failure
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "config_load_failed_using_defaults");
                Self::default()
            }
        }
    }

    /// Load configuration - tries TOML file first, falls back to defaults
    pub fn load(args: &[String]) -> Self {
        Self::load_from_path(Self::resolve_config_path(args))
    }

    // Getters for all config fields
    pub fn excluded_zones(&self) -> &ZoneFilter {
        &self.excluded_zones
    }

    pub fn max_events(&self) -> usize {
        self.max_events
    }

    pub fn max_time(&self) -> Duration {
        Duration::from_millis(self.max_time_ms)
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method to override the excluded zones
    pub fn with_excluded_zones(mut self, excluded_zones: ZoneFilter) -> Self {
        self.excluded_zones = excluded_zones;
        self
    }
}

static EXCLUDED_ZONES: OnceLock<ZoneFilter> = OnceLock::new();

/// Process-wide excluded zone policy.
///
/// The first call loads it from the config file resolved via
/// `PICKING_CONFIG` (or the default path) unless a host installed one
/// earlier with [`install_excluded_zones`]. Later calls return the same value.
pub fn excluded_zones() -> &'static ZoneFilter {
    EXCLUDED_ZONES.get_or_init(|| {
        let config = Config::load(&[]);
        info!(
            config_file = %config.config_file(),
            excluded = ?config.excluded_zones().excluded(),
            "excluded_zones_initialized"
        );
        config.excluded_zones().clone()
    })
}

/// Install the process-wide policy eagerly.
///
/// Returns `false` (and leaves the existing policy untouched) when it was
/// already initialised.
pub fn install_excluded_zones(excluded_zones: ZoneFilter) -> bool {
    EXCLUDED_ZONES.set(excluded_zones).is_ok()
}
