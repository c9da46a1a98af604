//! Editable wiki content sections
//!
//! Each markdown page of the wiki can be overridden locally. The override
//! lives under `wiki-content-<section>`; resetting removes it so the page
//! shows its published text again.

use crate::store::{KeyValueStore, Result};

const PREFIX: &str = "wiki-content-";

pub fn section_key(section: &str) -> String {
    format!("{}{}", PREFIX, section)
}

/// Local override for `section`, if any
pub fn load_section(store: &dyn KeyValueStore, section: &str) -> Result<Option<String>> {
    store.get(&section_key(section))
}

pub fn save_section(store: &dyn KeyValueStore, section: &str, markdown: &str) -> Result<()> {
    store.set(&section_key(section), markdown)?;
    tracing::info!(section, bytes = markdown.len(), "saved wiki content");
    Ok(())
}

/// Drop the override; returns whether one existed
pub fn reset_section(store: &dyn KeyValueStore, section: &str) -> Result<bool> {
    let removed = store.remove(&section_key(section))?;
    if removed {
        tracing::info!(section, "reset wiki content to original");
    }
    Ok(removed)
}

/// Sections that currently have an override
pub fn overridden_sections(store: &dyn KeyValueStore) -> Result<Vec<String>> {
    Ok(store
        .keys()?
        .into_iter()
        .filter_map(|k| k.strip_prefix(PREFIX).map(str::to_string))
        .collect())
}
