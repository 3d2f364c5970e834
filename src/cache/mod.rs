//! String-keyed response cache.
//!
//! Keys are `"categories"` or a category name; values are JSON-serialized
//! catalog responses. Entries never expire: once a key is present it answers
//! for the rest of the process (and, for [`FileCache`], across processes
//! until `pricelens cache clear`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Cache key under which the category list is stored.
pub const CATEGORIES_KEY: &str = "categories";

/// A get/set key-value store for serialized catalog responses.
pub trait KeyValueCache {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String) -> Result<()>;

    /// Number of stored entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All keys, sorted.
    fn keys(&self) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Session-scoped cache held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryCache {
    entries: BTreeMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Disabled
// ---------------------------------------------------------------------------

/// A cache that never stores anything; every lookup goes to the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl KeyValueCache for NoCache {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&mut self, _key: &str, _value: String) -> Result<()> {
        Ok(())
    }

    fn len(&self) -> usize {
        0
    }

    fn keys(&self) -> Vec<String> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// File-backed
// ---------------------------------------------------------------------------

/// Cache persisted as a single JSON object on disk.
///
/// The whole map is loaded on open and rewritten on every `set`. A missing
/// or unreadable file opens as an empty cache.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileCache {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("failed to create cache directory")?;
        }
        let json = serde_json::to_string(&self.entries).context("failed to serialize cache")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write cache file {}", self.path.display()))
    }
}

impl KeyValueCache for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.persist()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Delete a persisted cache file. Returns `true` if a file was removed.
pub fn clear_file(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path)
        .with_context(|| format!("failed to remove cache file {}", path.display()))?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
