// src/engine/dispatch.rs

//! Turning a flushed batch into enqueued actions and side effects.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::ActionQueue;
use crate::fs::FileSystem;
use crate::invalidate::{ModuleCache, NoopModuleCache};
use crate::livereload::LiveReloadRegistry;
use crate::types::{ActionName, ChangeRecord, LiveReloadAddr, WatchFiles};
use crate::watch::path_utils::display_path;
use crate::watch::Target;

/// A target that matched a batch and had its actions enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredTarget {
    pub target: String,
    pub actions: Vec<ActionName>,
    pub files: Vec<String>,
}

/// What one flush did; returned once per completed watch cycle.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub records: Vec<ChangeRecord>,
    pub fired: Vec<FiredTarget>,
}

impl DispatchReport {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.records.iter().map(|r| r.path.clone()).collect()
    }

    /// All actions in the order they were enqueued.
    pub fn enqueued_actions(&self) -> Vec<ActionName> {
        self.fired.iter().flat_map(|f| f.actions.iter().cloned()).collect()
    }
}

/// For each target, in order, the subset of `rel_paths` it matches.
///
/// Every matching target is returned; overlapping patterns do not shadow
/// each other.
pub fn match_targets<'a>(targets: &'a [Target], rel_paths: &[String]) -> Vec<(&'a Target, Vec<String>)> {
    targets
        .iter()
        .filter_map(|target| {
            let files: Vec<String> = rel_paths
                .iter()
                .filter(|p| target.matches(p))
                .cloned()
                .collect();
            (!files.is_empty()).then_some((target, files))
        })
        .collect()
}

/// Task dispatcher: owns the action queue and the flush-time collaborators.
pub struct Dispatcher<Q: ActionQueue> {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    queue: Q,
    module_cache: Box<dyn ModuleCache>,
    reloaders: LiveReloadRegistry,
    last_batch: watch::Sender<WatchFiles>,
}

impl<Q: ActionQueue> std::fmt::Debug for Dispatcher<Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("root", &self.root)
            .field("reloaders", &self.reloaders)
            .finish_non_exhaustive()
    }
}

impl<Q: ActionQueue> Dispatcher<Q> {
    pub fn new(root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>, queue: Q) -> Self {
        let (last_batch, _) = watch::channel(WatchFiles::default());
        Self {
            root: root.into(),
            fs,
            queue,
            module_cache: Box::new(NoopModuleCache),
            reloaders: LiveReloadRegistry::new(),
            last_batch,
        }
    }

    pub fn set_module_cache(&mut self, cache: Box<dyn ModuleCache>) {
        self.module_cache = cache;
    }

    pub fn set_livereload(&mut self, reloaders: LiveReloadRegistry) {
        self.reloaders = reloaders;
    }

    pub fn set_last_batch(&mut self, sender: watch::Sender<WatchFiles>) {
        self.last_batch = sender;
    }

    /// Subscribe to the last-batch record.
    pub fn last_batch(&self) -> watch::Receiver<WatchFiles> {
        self.last_batch.subscribe()
    }

    /// Report, invalidate, publish and enqueue for one flushed batch.
    pub async fn dispatch(
        &mut self,
        targets: &[Target],
        records: Vec<ChangeRecord>,
    ) -> Result<DispatchReport> {
        let mut files = WatchFiles::default();
        let mut rel_paths = Vec::with_capacity(records.len());

        for record in &records {
            let rel = display_path(self.fs.as_ref(), &self.root, &record.path);
            println!("[watchloop] {} {}.", rel, record.status);
            info!(path = %rel, status = %record.status, "file change");

            if record.status.is_deleted() {
                files.deleted.push(rel.clone());
            } else {
                files.changed.push(rel.clone());
            }
            self.module_cache.invalidate(&record.path);
            rel_paths.push(rel);
        }

        // Published before anything is enqueued so actions can read it.
        self.last_batch.send_replace(files);

        let mut fired = Vec::new();
        for (target, matched) in match_targets(targets, &rel_paths) {
            if target.actions().is_empty() {
                continue;
            }
            debug!(target = %target, files = ?matched, actions = ?target.actions(), "target matched; enqueueing actions");
            self.queue.enqueue(target.actions().to_vec()).await?;
            fired.push(FiredTarget {
                target: target.to_string(),
                actions: target.actions().to_vec(),
                files: matched,
            });
        }

        // Every configured server hears about the whole batch, matched or not.
        let reload: BTreeSet<&LiveReloadAddr> =
            targets.iter().filter_map(Target::livereload).collect();
        for addr in reload {
            if let Some(server) = self.reloaders.get(addr) {
                server.trigger(&rel_paths);
            }
        }

        Ok(DispatchReport { records, fired })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{ConfigFile, FilePatterns, RawConfigFile, TargetConfig};
    use crate::watch::resolve_targets;

    fn targets(defs: &[(&str, &str, &str)]) -> Vec<Target> {
        let mut raw = RawConfigFile::default();
        for (name, pattern, action) in defs {
            raw.target.insert(
                name.to_string(),
                TargetConfig {
                    files: Some(FilePatterns::One(pattern.to_string())),
                    tasks: Some(vec![action.to_string()]),
                    livereload: None,
                },
            );
        }
        resolve_targets(&ConfigFile::new_unchecked(raw), None).unwrap()
    }

    #[test]
    fn only_matching_targets_are_selected() {
        let t = targets(&[("A", "*.txt", "a1"), ("B", "*.md", "b1")]);
        let matched = match_targets(&t, &["x.txt".to_string()]);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].0.name(), Some("A"));
        assert_eq!(matched[0].1, vec!["x.txt".to_string()]);
    }

    #[test]
    fn overlapping_targets_all_fire() {
        let t = targets(&[("A", "**/*.rs", "a1"), ("B", "src/*.rs", "b1")]);
        let matched = match_targets(&t, &["src/lib.rs".to_string()]);
        let names: Vec<_> = matched.iter().map(|(t, _)| t.name()).collect();
        assert_eq!(names, vec![Some("A"), Some("B")]);
    }
}
