// src/watch/classify.rs

//! Classification of raw per-file notifications.

use std::path::Path;
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::types::{FileStatus, RawKind};
use crate::watch::mtime::MtimeCache;

/// Result of probing a path on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Missing,
    Modified(SystemTime),
}

/// Check existence and read the mtime of `path`.
///
/// A stat that fails on an existing path (permissions, races with an
/// editor's rename) is reported as `Missing`, so the file is handled as
/// deleted and picked up again by the addition poller if it comes back.
pub fn probe(fs: &dyn FileSystem, path: &Path) -> Probe {
    if !fs.is_file(path) {
        return Probe::Missing;
    }
    match fs.modified(path) {
        Ok(mtime) => Probe::Modified(mtime),
        Err(err) => {
            warn!(?path, error = %err, "stat failed; treating file as deleted");
            Probe::Missing
        }
    }
}

/// Classify one raw notification for `path`.
///
/// - Missing file: the mtime entry is dropped and the path is `Deleted`.
///   Releasing the subscription is the caller's job.
/// - Unchanged mtime: `None`, the notification is a duplicate.
/// - Otherwise the cache is updated and the path is `Changed`, or `Renamed`
///   when the raw kind was a rename.
pub fn classify(
    mtimes: &mut MtimeCache,
    path: &Path,
    kind: RawKind,
    probe: Probe,
) -> Option<FileStatus> {
    match probe {
        Probe::Missing => {
            mtimes.remove(path);
            Some(FileStatus::Deleted)
        }
        Probe::Modified(mtime) => {
            if mtimes.get(path) == Some(mtime) {
                debug!(?path, "mtime unchanged; ignoring duplicate notification");
                return None;
            }
            mtimes.insert(path, mtime);
            Some(match kind {
                RawKind::Rename => FileStatus::Renamed,
                RawKind::Write => FileStatus::Changed,
            })
        }
    }
}
