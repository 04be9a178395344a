//! Configuration module for the log watcher.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! Settings are read-only: nothing in the crate writes them back to disk.
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `GAMELOG_` and use double underscores
//! to separate nested levels:
//! - `GAMELOG_DEBOUNCE_MS=500` sets `debounce_ms`
//! - `GAMELOG_LOG_FILE=/var/log/game.log` sets `log_file`
//! - `GAMELOG_PARSER__MAX_ENTRIES=100` sets `parser.max_entries`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "GAMELOG_";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Log file used when no path is given explicitly.
    /// Falls back to the platform data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Debounce window in milliseconds handed to the file watcher.
    /// Changes closer together than this are reported once.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Log parsing configuration
    #[serde(default)]
    pub parser: ParserConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ParserConfig {
    /// Maximum number of entries kept in a snapshot, newest first
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for every target (`error`, `warn`, `info`, `debug`, `trace`)
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target overrides, e.g. `gamelog::pipeline = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_debounce_ms() -> u64 {
    crate::pipeline::DEFAULT_DEBOUNCE_MS
}
fn default_max_entries() -> usize {
    500
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_file: None,
            debounce_ms: default_debounce_ms(),
            parser: ParserConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources, using the per-user config file.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        match Self::config_path() {
            Some(path) => Self::load_from(path),
            None => Self::figment(None).extract().map_err(Box::new),
        }
    }

    /// Load configuration from a specific file.
    ///
    /// A missing file is not an error: defaults and environment still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(Some(path.as_ref())).extract().map_err(Box::new)
    }

    /// Location of the per-user settings file, e.g. `~/.config/gamelog/settings.toml`.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gamelog").join("settings.toml"))
    }

    fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        // Double underscore separates nested levels; single underscores stay
        // part of the field name.
        figment.merge(Env::prefixed(ENV_PREFIX).map(|key| {
            key.as_str().to_lowercase().replace("__", ".").into()
        }))
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
