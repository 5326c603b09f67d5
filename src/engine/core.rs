// src/engine/core.rs

//! Synchronous watch state machine.
//!
//! [`WatchCore`] owns all state that lives between events: the mtime cache,
//! the subscription set, the open batch and the debounce deadline. It
//! performs filesystem probes through the [`FileSystem`] trait but has no
//! channels, timers or tasks; the async
//! shell (`engine::runtime::WatchEngine`) decides *when* each method runs.
//!
//! Per path the lifecycle is:
//!
//! ```text
//! Unwatched --discover--> Watched --event--> Reported(added|changed|deleted)
//!     ^                                          |
//!     +----------- flush: teardown, re-arm ------+
//! ```
//!
//! A deleted path leaves the cycle until the addition poller finds it again.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::fs::FileSystem;
use crate::types::{ChangeRecord, FileStatus, RawKind};
use crate::watch::{
    classify, discover, probe, Batch, Debouncer, FileWatchers, MtimeCache, Probe, Target,
    WatchBackend,
};

pub struct WatchCore<B: WatchBackend> {
    root: PathBuf,
    targets: Vec<Target>,
    fs: Arc<dyn FileSystem>,
    watchers: FileWatchers<B>,
    mtimes: MtimeCache,
    batch: Batch,
    debounce: Debouncer,
    /// Discovered paths whose subscription failed; retried on every arm.
    unwatchable: BTreeSet<PathBuf>,
}

impl<B: WatchBackend> std::fmt::Debug for WatchCore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchCore")
            .field("root", &self.root)
            .field("targets", &self.targets.len())
            .field("watched", &self.watchers.len())
            .field("pending", &self.batch.len())
            .finish_non_exhaustive()
    }
}

impl<B: WatchBackend> WatchCore<B> {
    pub fn new(
        root: impl Into<PathBuf>,
        targets: Vec<Target>,
        fs: Arc<dyn FileSystem>,
        backend: B,
        quiet: Duration,
    ) -> Self {
        Self {
            root: root.into(),
            targets,
            fs,
            watchers: FileWatchers::new(backend),
            mtimes: MtimeCache::new(),
            batch: Batch::new(),
            debounce: Debouncer::new(quiet),
            unwatchable: BTreeSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Current set of files matched by any target.
    pub fn discover(&self) -> BTreeSet<PathBuf> {
        let sets: Vec<_> = self.targets.iter().map(Target::patterns).collect();
        discover(self.fs.as_ref(), &self.root, &sets)
    }

    /// Start a watch cycle: discover, subscribe and reconcile.
    ///
    /// - Paths cached from an earlier cycle that are no longer discovered
    ///   are dropped from the cache and reported `deleted` if gone.
    /// - Newly discovered paths get an mtime baseline *before* they are
    ///   subscribed, then every watched path is re-probed so a change that
    ///   slipped in between is still reported.
    pub fn arm(&mut self, now: Instant) {
        let discovered = self.discover();

        self.forget_vanished(&discovered, now);
        self.unwatchable.retain(|p| discovered.contains(p));

        for path in &discovered {
            if !self.mtimes.contains(path) {
                if let Probe::Modified(mtime) = probe(self.fs.as_ref(), path) {
                    self.mtimes.insert(path, mtime);
                }
            }
        }

        for path in &discovered {
            self.subscribe(path);
        }

        self.reconcile(now);

        info!(
            watched = self.watchers.len(),
            skipped = self.unwatchable.len(),
            "watch cycle armed"
        );
    }

    /// Handle one raw notification for `path`.
    pub fn handle_notification(&mut self, path: &Path, kind: RawKind, now: Instant) {
        if !self.watchers.is_watched(path) {
            debug!(?path, "notification for unwatched path; ignoring");
            return;
        }

        let probed = probe(self.fs.as_ref(), path);
        match classify(&mut self.mtimes, path, kind, probed) {
            Some(FileStatus::Deleted) => {
                self.watchers.release(path);
                self.record(ChangeRecord::new(path, FileStatus::Deleted), now);
            }
            Some(status) => self.record(ChangeRecord::new(path, status), now),
            None => {}
        }
    }

    /// Addition poller tick: report and subscribe files that exist but are
    /// not watched yet.
    pub fn poll_additions(&mut self, now: Instant) {
        for path in self.discover() {
            if self.watchers.is_watched(&path) || self.unwatchable.contains(&path) {
                continue;
            }
            let Probe::Modified(mtime) = probe(self.fs.as_ref(), &path) else {
                continue;
            };

            match self.watchers.subscribe(&path) {
                Ok(_) => {
                    // Cached before reporting, so a native notification for
                    // the same creation is filtered as a duplicate.
                    self.mtimes.insert(&path, mtime);
                }
                Err(err) => {
                    warn!(?path, error = %format!("{err:#}"), "cannot watch new file; it will not be tracked");
                    self.unwatchable.insert(path.clone());
                }
            }
            self.record(ChangeRecord::new(path, FileStatus::Added), now);
        }
    }

    /// Release every subscription (flush and restart path).
    pub fn teardown(&mut self) {
        self.watchers.release_all();
    }

    /// When the open batch should be flushed, if anything is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Snapshot and clear the open batch.
    pub fn take_batch(&mut self) -> Vec<ChangeRecord> {
        self.debounce.clear();
        self.batch.take()
    }

    pub fn pending(&self) -> &Batch {
        &self.batch
    }

    pub fn is_watched(&self, path: &Path) -> bool {
        self.watchers.is_watched(path)
    }

    pub fn watched_paths(&self) -> Vec<PathBuf> {
        self.watchers.paths().map(Path::to_path_buf).collect()
    }

    pub fn cached_mtime(&self, path: &Path) -> Option<SystemTime> {
        self.mtimes.get(path)
    }

    pub fn cached_paths(&self) -> Vec<PathBuf> {
        self.mtimes.paths().map(Path::to_path_buf).collect()
    }

    fn record(&mut self, record: ChangeRecord, now: Instant) {
        debug!(path = ?record.path, status = %record.status, "change recorded");
        self.batch.record(record);
        self.debounce.reset(now);
    }

    fn subscribe(&mut self, path: &Path) {
        match self.watchers.subscribe(path) {
            Ok(_) => {
                self.unwatchable.remove(path);
            }
            Err(err) => {
                warn!(?path, error = %format!("{err:#}"), "failed to watch file; skipping it this cycle");
                self.mtimes.remove(path);
                self.unwatchable.insert(path.to_path_buf());
            }
        }
    }

    fn forget_vanished(&mut self, discovered: &BTreeSet<PathBuf>, now: Instant) {
        let vanished: Vec<PathBuf> = self
            .mtimes
            .paths()
            .filter(|p| !discovered.contains(*p))
            .map(Path::to_path_buf)
            .collect();

        for path in vanished {
            self.mtimes.remove(&path);
            if matches!(probe(self.fs.as_ref(), &path), Probe::Missing) {
                self.record(ChangeRecord::new(path, FileStatus::Deleted), now);
            }
        }
    }

    fn reconcile(&mut self, now: Instant) {
        for path in self.watched_paths() {
            match probe(self.fs.as_ref(), &path) {
                Probe::Missing => {
                    self.watchers.release(&path);
                    // Never-baselined paths are left to the addition poller.
                    if self.mtimes.remove(&path).is_some() {
                        self.record(ChangeRecord::new(path, FileStatus::Deleted), now);
                    }
                }
                Probe::Modified(mtime) => match self.mtimes.insert(&path, mtime) {
                    Some(previous) if previous == mtime => {}
                    Some(_) => self.record(ChangeRecord::new(path, FileStatus::Changed), now),
                    None => self.record(ChangeRecord::new(path, FileStatus::Added), now),
                },
            }
        }
    }
}
