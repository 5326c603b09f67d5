// src/watch/mtime.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::trace;

/// Last observed modification time per watched path.
///
/// This is what filters out duplicate notifications: a raw event for a path
/// whose mtime equals the cached one is dropped. Entries are removed one at
/// a time as paths are deleted or stop being watched; the cache is never
/// bulk-cleared while the engine lives.
#[derive(Debug, Default)]
pub struct MtimeCache {
    mtimes: HashMap<PathBuf, SystemTime>,
}

impl MtimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<SystemTime> {
        self.mtimes.get(path).copied()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.mtimes.contains_key(path)
    }

    /// Store `mtime`, returning the previous value.
    pub fn insert(&mut self, path: &Path, mtime: SystemTime) -> Option<SystemTime> {
        trace!(?path, ?mtime, "mtime cached");
        self.mtimes.insert(path.to_path_buf(), mtime)
    }

    pub fn remove(&mut self, path: &Path) -> Option<SystemTime> {
        self.mtimes.remove(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.mtimes.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.mtimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mtimes.is_empty()
    }
}
