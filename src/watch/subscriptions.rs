// src/watch/subscriptions.rs

//! Per-file subscription lifecycle.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

/// A source of native per-file change notifications.
///
/// Implementations deliver notifications through the engine's event channel
/// (see [`crate::engine::EngineEvent`]); this trait only manages which paths
/// are subscribed. Production code uses [`crate::watch::NotifyBackend`];
/// tests substitute a fake.
pub trait WatchBackend: Send {
    fn watch(&mut self, path: &Path) -> Result<()>;
    fn unwatch(&mut self, path: &Path) -> Result<()>;
}

/// The set of currently subscribed paths, one subscription per path.
///
/// `subscribe` on an already watched path is a no-op and `release` on an
/// unwatched path does nothing, so callers never double-subscribe or
/// double-release.
#[derive(Debug)]
pub struct FileWatchers<B: WatchBackend> {
    backend: B,
    active: BTreeSet<PathBuf>,
}

impl<B: WatchBackend> FileWatchers<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            active: BTreeSet::new(),
        }
    }

    /// Subscribe to `path`. Returns `Ok(false)` if it was already watched.
    pub fn subscribe(&mut self, path: &Path) -> Result<bool> {
        if self.active.contains(path) {
            return Ok(false);
        }
        self.backend.watch(path)?;
        self.active.insert(path.to_path_buf());
        Ok(true)
    }

    /// Release the subscription for `path`, if any.
    ///
    /// The path leaves the active set even when the backend complains; the
    /// OS usually drops the watch on its own once a file is deleted.
    pub fn release(&mut self, path: &Path) -> bool {
        if !self.active.remove(path) {
            return false;
        }
        if let Err(err) = self.backend.unwatch(path) {
            debug!(?path, error = %err, "unwatch failed (watch already gone?)");
        }
        true
    }

    pub fn release_all(&mut self) {
        let paths: Vec<PathBuf> = self.active.iter().cloned().collect();
        for path in paths {
            self.release(&path);
        }
    }

    pub fn is_watched(&self, path: &Path) -> bool {
        self.active.contains(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.active.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
