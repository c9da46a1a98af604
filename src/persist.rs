//! Saving, loading, exporting and importing whole roadmap trees
//!
//! Persistence always works on the full tree, never a filtered view.
//!
//! The two parse-failure policies differ on purpose:
//! - [`load`] runs once at startup and falls back to the built-in tree,
//!   logging the problem but never surfacing it;
//! - [`import_file`] returns the error so the caller can show a blocking
//!   alert, and the current tree is left alone.

use crate::defaults::default_roadmap;
use crate::node::{format_date, RoadmapNode};
use crate::store::{KeyValueStore, StoreError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Store key for the roadmap tree
pub const ROADMAP_KEY: &str = "zoe-roadmap-data";

/// Current document schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Error type for persistence operations
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid roadmap JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported roadmap schema version {found}")]
    UnsupportedVersion { found: u64 },
    #[error("invalid roadmap JSON: expected an array of nodes or a roadmap document")]
    UnexpectedShape,
}

pub type Result<T> = std::result::Result<T, PersistError>;

/// Versioned envelope written to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapDocument {
    pub schema_version: u32,
    #[serde(default)]
    pub saved_at: Option<String>,
    #[serde(default)]
    pub nodes: Vec<RoadmapNode>,
}

impl RoadmapDocument {
    pub fn new(nodes: Vec<RoadmapNode>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            saved_at: Some(chrono::Local::now().to_rfc3339()),
            nodes,
        }
    }
}

/// Parse a stored or exported snapshot.
///
/// Accepts the bare node array written by the web wiki and by [`export`]
/// as well as the versioned [`RoadmapDocument`].
pub fn parse_snapshot(text: &str) -> Result<Vec<RoadmapNode>> {
    let value: Value = serde_json::from_str(text)?;
    if value.is_array() {
        return Ok(serde_json::from_value(value)?);
    }
    if !value.is_object() {
        return Err(PersistError::UnexpectedShape);
    }
    let version = value
        .get("schemaVersion")
        .and_then(Value::as_u64)
        .ok_or(PersistError::UnexpectedShape)?;
    if version > u64::from(SCHEMA_VERSION) {
        return Err(PersistError::UnsupportedVersion { found: version });
    }
    let doc: RoadmapDocument = serde_json::from_value(value)?;
    Ok(doc.nodes)
}

/// Where the startup tree came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Parsed from the store
    Stored,
    /// Nothing stored yet
    Default,
    /// Stored value was unreadable; the default tree was used instead
    Recovered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub nodes: Vec<RoadmapNode>,
    pub origin: Origin,
}

/// Write the full tree under `key`
pub fn save(store: &dyn KeyValueStore, key: &str, nodes: &[RoadmapNode]) -> Result<()> {
    let doc = RoadmapDocument::new(nodes.to_vec());
    let json = serde_json::to_string(&doc)?;
    store.set(key, &json)?;
    tracing::info!(key, nodes = crate::tree::count(nodes), "saved roadmap");
    Ok(())
}

/// Read the tree stored under `key`, falling back to the built-in roadmap.
///
/// Never fails: unreadable data is logged and replaced by the default tree.
pub fn load(store: &dyn KeyValueStore, key: &str) -> Loaded {
    let raw = match store.get(key) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(key, error = %e, "failed to read saved roadmap data");
            return Loaded {
                nodes: default_roadmap(),
                origin: Origin::Recovered,
            };
        }
    };

    let Some(raw) = raw else {
        return Loaded {
            nodes: default_roadmap(),
            origin: Origin::Default,
        };
    };

    match parse_snapshot(&raw) {
        Ok(nodes) => {
            let dupes = crate::tree::duplicate_ids(&nodes);
            if !dupes.is_empty() {
                tracing::warn!(?dupes, "stored roadmap contains duplicate node ids");
            }
            Loaded {
                nodes,
                origin: Origin::Stored,
            }
        }
        Err(e) => {
            tracing::error!(key, error = %e, "failed to load saved roadmap data");
            Loaded {
                nodes: default_roadmap(),
                origin: Origin::Recovered,
            }
        }
    }
}

/// File name for an export made on `date`
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}.json", prefix, format_date(date))
}

/// Pretty JSON array with two-space indentation
pub fn export_json(nodes: &[RoadmapNode]) -> Result<String> {
    Ok(serde_json::to_string_pretty(nodes)?)
}

/// Write `<prefix>-<date>.json` into `dir`, returning its path
pub fn export(nodes: &[RoadmapNode], dir: &Path, prefix: &str, date: NaiveDate) -> Result<PathBuf> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    let path = dir.join(export_file_name(prefix, date));
    std::fs::write(&path, export_json(nodes)?)?;
    tracing::info!(path = %path.display(), nodes = crate::tree::count(nodes), "exported roadmap");
    Ok(path)
}

/// Read and strictly parse an exported file
pub fn import_file(path: &Path) -> Result<Vec<RoadmapNode>> {
    let text = std::fs::read_to_string(path)?;
    let nodes = parse_snapshot(&text)?;
    tracing::info!(path = %path.display(), nodes = crate::tree::count(&nodes), "imported roadmap");
    Ok(nodes)
}
