//! Configuration file support for sapling
//!
//! Reads from .sapling/config.toml

use crate::filter::{TimeScale, ALL_CATEGORIES};
use crate::node::DEFAULT_CATEGORIES;
use crate::persist::ROADMAP_KEY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub view: ViewConfig,

    #[serde(default)]
    pub items: ItemsConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StoreConfig {
    /// Key the roadmap tree is saved under
    /// Default: "zoe-roadmap-data"
    #[serde(default = "default_store_key")]
    pub key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key: default_store_key(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExportConfig {
    /// Export files are named `<prefix>-<YYYY-MM-DD>.json`
    #[serde(default = "default_export_prefix")]
    pub prefix: String,

    /// Directory exports are written to (current directory when unset)
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            prefix: default_export_prefix(),
            dir: None,
        }
    }
}

impl ExportConfig {
    pub fn dir(&self) -> &Path {
        self.dir.as_deref().unwrap_or_else(|| Path::new("."))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ViewConfig {
    /// Initial time scale in the terminal editor
    #[serde(default)]
    pub time_scale: TimeScale,

    /// Initial category filter ("all" disables it)
    #[serde(default = "default_category")]
    pub category: String,

    /// Categories offered when cycling the filter and editing nodes
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            time_scale: TimeScale::default(),
            category: default_category(),
            categories: default_categories(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ItemsConfig {
    /// Length of a freshly created item
    /// Default: 30
    #[serde(default = "default_duration_days")]
    pub default_duration_days: i64,
}

impl Default for ItemsConfig {
    fn default() -> Self {
        Self {
            default_duration_days: default_duration_days(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServeConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_store_key() -> String {
    ROADMAP_KEY.to_string()
}

fn default_export_prefix() -> String {
    "zoe-roadmap".to_string()
}

fn default_category() -> String {
    ALL_CATEGORIES.to_string()
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

fn default_duration_days() -> i64 {
    30
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load config from .sapling/config.toml
    /// Returns default config if file doesn't exist or doesn't parse
    pub fn load() -> Self {
        match Self::find_config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
                Self::default()
            }
        }
    }

    /// Find config.toml by walking up directory tree
    fn find_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut dir = current_dir.as_path();

        loop {
            let config_path = dir.join(".sapling").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
        None
    }

    /// Default file contents written by `sapling init`
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}
