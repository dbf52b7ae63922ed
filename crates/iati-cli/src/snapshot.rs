//! Saved in-memory stores, so one run can build on the rows of another.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use iati_import::InMemoryStore;

pub fn load_store(path: &Path) -> Result<InMemoryStore> {
    let text = fs::read_to_string(path).with_context(|| format!("read store {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse store {}", path.display()))
}

/// Pretty JSON, newline terminated.
pub fn save_store(store: &InMemoryStore, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(store).context("serialize store")?;
    fs::write(path, format!("{json}\n")).with_context(|| format!("write {}", path.display()))
}
