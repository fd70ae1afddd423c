//! Local JSON cache
//!
//! Each key is one file, `<dir>/<key>.json`. Reads never fail: a missing or
//! corrupt file logs a warning and yields the caller's default. Writes replace
//! the whole file.

use crate::models::Category;
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const TRANSACTIONS_KEY: &str = "transactions";
pub const CATEGORIES_KEY: &str = "categories";

/// File-backed key/value store
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Load the value stored under `key`, or `default` if it cannot be read.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let path = self.path_for(key);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Cache file {} unreadable, using default: {}", path.display(), e);
                return default;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => {
                debug!("Loaded cache file {}", path.display());
                value
            }
            Err(e) => {
                warn!("Cache file {} is corrupt, using default: {}", path.display(), e);
                default
            }
        }
    }

    /// Overwrite the file for `key` with `value`.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)?;
        debug!("Wrote cache file {}", path.display());
        Ok(())
    }
}

/// Merchant → category classifications, flushed to disk on every insert.
#[derive(Debug)]
pub struct CategoryCache {
    store: JsonStore,
    entries: BTreeMap<String, Category>,
}

impl CategoryCache {
    pub fn load(store: JsonStore) -> Self {
        let entries = store.load(CATEGORIES_KEY, BTreeMap::new());
        Self { store, entries }
    }

    pub fn get(&self, merchant: &str) -> Option<Category> {
        self.entries.get(merchant).copied()
    }

    pub fn insert(&mut self, merchant: &str, category: Category) -> Result<()> {
        self.entries.insert(merchant.to_string(), category);
        self.store.save(CATEGORIES_KEY, &self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
