//! Recording fakes for the engine's collaborators.
//!
//! Every fake is a cheap handle around shared state, so a test keeps one
//! clone for assertions and hands the other to the engine.

use std::collections::BTreeSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use watchloop::errors::Result;
use watchloop::exec::ActionQueue;
use watchloop::invalidate::ModuleCache;
use watchloop::livereload::LiveReload;
use watchloop::types::ActionName;
use watchloop::watch::WatchBackend;

#[derive(Debug, Default)]
struct BackendState {
    active: BTreeSet<PathBuf>,
    failing: BTreeSet<PathBuf>,
    watch_calls: usize,
}

/// A watch backend that only tracks subscriptions.
///
/// Subscribing a path twice is an error, so a test fails loudly if the
/// engine ever double-subscribes. Notifications are injected by the test
/// through the engine's event channel.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future `watch` call for `path` fail.
    pub fn fail_on(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.failing.insert(path.as_ref().to_path_buf());
    }

    /// Let `path` be watched again.
    pub fn heal(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.failing.remove(path.as_ref());
    }

    pub fn active(&self) -> BTreeSet<PathBuf> {
        self.state.lock().unwrap().active.clone()
    }

    pub fn is_active(&self, path: impl AsRef<Path>) -> bool {
        self.state.lock().unwrap().active.contains(path.as_ref())
    }

    pub fn watch_calls(&self) -> usize {
        self.state.lock().unwrap().watch_calls
    }
}

impl WatchBackend for FakeBackend {
    fn watch(&mut self, path: &Path) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.watch_calls += 1;
        if state.failing.contains(path) {
            return Err(anyhow!("permission denied: {}", path.display()));
        }
        if !state.active.insert(path.to_path_buf()) {
            return Err(anyhow!("{} is already watched", path.display()));
        }
        Ok(())
    }

    fn unwatch(&mut self, path: &Path) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.active.remove(path) {
            return Err(anyhow!("{} is not watched", path.display()));
        }
        Ok(())
    }
}

/// An action queue that records each enqueue call instead of running it.
#[derive(Debug, Clone, Default)]
pub struct FakeActionQueue {
    enqueued: Arc<Mutex<Vec<Vec<ActionName>>>>,
}

impl FakeActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every enqueue call, in order.
    pub fn calls(&self) -> Vec<Vec<ActionName>> {
        self.enqueued.lock().unwrap().clone()
    }

    /// All enqueued actions, flattened.
    pub fn actions(&self) -> Vec<ActionName> {
        self.calls().into_iter().flatten().collect()
    }
}

impl ActionQueue for FakeActionQueue {
    fn enqueue(
        &mut self,
        actions: Vec<ActionName>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let enqueued = Arc::clone(&self.enqueued);
        Box::pin(async move {
            enqueued.lock().unwrap().push(actions);
            Ok(())
        })
    }
}

/// Live-reload instance that records every trigger.
#[derive(Debug, Clone, Default)]
pub struct RecordingReload {
    triggers: Arc<Mutex<Vec<Vec<String>>>>,
}

impl RecordingReload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triggers(&self) -> Vec<Vec<String>> {
        self.triggers.lock().unwrap().clone()
    }
}

impl LiveReload for RecordingReload {
    fn trigger(&self, files: &[String]) {
        self.triggers.lock().unwrap().push(files.to_vec());
    }
}

/// Module cache that records which paths were invalidated.
#[derive(Debug, Clone, Default)]
pub struct RecordingModuleCache {
    invalidated: Arc<Mutex<Vec<PathBuf>>>,
}

impl RecordingModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidated(&self) -> Vec<PathBuf> {
        self.invalidated.lock().unwrap().clone()
    }
}

impl ModuleCache for RecordingModuleCache {
    fn invalidate(&mut self, path: &Path) {
        self.invalidated.lock().unwrap().push(path.to_path_buf());
    }
}
