// src/watch/watcher.rs

use std::path::Path;

use anyhow::{Context, Result};
use notify::event::{EventKind, ModifyKind};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::info;

use crate::engine::{EngineEvent, EngineSender};
use crate::types::RawKind;
use crate::watch::subscriptions::WatchBackend;

/// Native notification backend built on `notify`.
///
/// A single `RecommendedWatcher` holds one non-recursive watch per file.
/// Dropping the backend stops all watching.
pub struct NotifyBackend {
    inner: RecommendedWatcher,
}

impl std::fmt::Debug for NotifyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyBackend").finish()
    }
}

impl NotifyBackend {
    /// Create the watcher; notifications are forwarded to `events`.
    pub fn new(events: EngineSender) -> Result<Self> {
        // Closure called synchronously by notify whenever an event arrives.
        let inner = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let Some(kind) = raw_kind(&event.kind) else {
                        return;
                    };
                    for path in event.paths {
                        if let Err(err) = events.send(EngineEvent::Notification { path, kind }) {
                            // We can't log via tracing here easily, so fallback to stderr.
                            eprintln!("watchloop: failed to forward notify event: {err}");
                            return;
                        }
                    }
                }
                Err(err) => {
                    eprintln!("watchloop: file watch error: {err}");
                }
            },
            Config::default(),
        )
        .context("creating native file watcher")?;

        info!("native file watcher created");
        Ok(Self { inner })
    }
}

impl WatchBackend for NotifyBackend {
    fn watch(&mut self, path: &Path) -> Result<()> {
        self.inner
            .watch(path, RecursiveMode::NonRecursive)
            .with_context(|| format!("watching {:?}", path))
    }

    fn unwatch(&mut self, path: &Path) -> Result<()> {
        self.inner
            .unwatch(path)
            .with_context(|| format!("unwatching {:?}", path))
    }
}

/// Map a notify event kind onto the two raw kinds the classifier knows.
///
/// Removals count as renames, matching how most platforms report an
/// editor's atomic save. Pure access events are dropped.
fn raw_kind(kind: &EventKind) -> Option<RawKind> {
    match kind {
        EventKind::Modify(ModifyKind::Name(_)) | EventKind::Remove(_) => Some(RawKind::Rename),
        EventKind::Create(_) | EventKind::Modify(_) => Some(RawKind::Write),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, RemoveKind, RenameMode};

    #[test]
    fn maps_notify_kinds() {
        assert_eq!(
            raw_kind(&EventKind::Modify(ModifyKind::Name(RenameMode::From))),
            Some(RawKind::Rename)
        );
        assert_eq!(raw_kind(&EventKind::Remove(RemoveKind::File)), Some(RawKind::Rename));
        assert_eq!(
            raw_kind(&EventKind::Modify(ModifyKind::Data(DataChange::Content))),
            Some(RawKind::Write)
        );
        assert_eq!(raw_kind(&EventKind::Create(CreateKind::File)), Some(RawKind::Write));
        assert_eq!(raw_kind(&EventKind::Access(AccessKind::Read)), None);
    }
}
