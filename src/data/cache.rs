use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use parking_lot::RwLock;

use super::loader::load_file;
use super::model::ListingTable;
use crate::error::Result;

// ---------------------------------------------------------------------------
// DatasetCache – loaded tables keyed by source path
// ---------------------------------------------------------------------------

/// Session-owned cache of loaded listing tables.
///
/// Tables are handed out as `Arc`s and never mutated. A reload swaps the
/// whole `Arc` under the write lock, so readers see either the old or the new
/// table, never a mix.
#[derive(Debug, Default)]
pub struct DatasetCache {
    tables: RwLock<HashMap<PathBuf, Arc<ListingTable>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, loading it on first use.
    ///
    /// Failed loads are not cached, so the next call retries the file.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<ListingTable>> {
        if let Some(table) = self.tables.read().get(path) {
            debug!("cache hit for {}", path.display());
            return Ok(Arc::clone(table));
        }

        let mut tables = self.tables.write();
        // Another writer may have loaded it while we waited for the lock.
        if let Some(table) = tables.get(path) {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load_file(path)?);
        tables.insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }

    /// Re-read `path` and replace the cached table.
    ///
    /// On failure the previous table (if any) stays cached.
    pub fn reload(&self, path: &Path) -> Result<Arc<ListingTable>> {
        let table = Arc::new(load_file(path)?);
        info!("reloaded {}", path.display());
        self.tables
            .write()
            .insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }

    /// Drop the cached table for `path`. Returns whether one was cached.
    pub fn invalidate(&self, path: &Path) -> bool {
        self.tables.write().remove(path).is_some()
    }

    /// Drop every cached table.
    pub fn clear(&self) {
        self.tables.write().clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.tables.read().contains_key(path)
    }
}
