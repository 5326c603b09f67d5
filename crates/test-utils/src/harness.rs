//! In-memory engine setup shared by the integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use watchloop::config::ConfigFile;
use watchloop::engine::{self, EngineEvent, EngineSender, EngineSettings, WatchEngine};
use watchloop::fs::mock::MockFileSystem;
use watchloop::types::RawKind;
use watchloop::watch::resolve_targets;

use crate::fakes::{FakeActionQueue, FakeBackend};

pub const ROOT: &str = "/proj";

pub type TestEngine = WatchEngine<FakeBackend, FakeActionQueue>;

/// Test-side view of everything the engine talks to.
///
/// Kept separate from the engine itself so a test can mutate files while a
/// `next_batch()` future holds the engine mutably.
#[derive(Debug, Clone)]
pub struct Sandbox {
    pub fs: MockFileSystem,
    pub backend: FakeBackend,
    pub queue: FakeActionQueue,
    pub events: EngineSender,
    pub root: PathBuf,
}

impl Sandbox {
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Create a file without any native notification (only the poller can
    /// find it).
    pub fn create(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        self.fs.add_file(&path);
        path
    }

    /// Rewrite a file and deliver the matching write notification.
    pub fn write(&self, rel: &str) -> PathBuf {
        let path = self.create(rel);
        self.notify(&path, RawKind::Write);
        path
    }

    /// Remove a file and deliver the rename notification most platforms
    /// emit for an unlink.
    pub fn delete(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        self.fs.remove_file(&path);
        self.notify(&path, RawKind::Rename);
        path
    }

    pub fn notify(&self, path: &Path, kind: RawKind) {
        self.events
            .send(EngineEvent::Notification {
                path: path.to_path_buf(),
                kind,
            })
            .expect("engine receiver dropped");
    }

    pub fn warn(&self, action: &str) {
        self.events
            .send(EngineEvent::ActionWarning {
                action: action.to_string(),
            })
            .expect("engine receiver dropped");
    }
}

/// Build an engine over `fs` rooted at [`ROOT`] with fake backend and queue.
pub fn engine_for(cfg: &ConfigFile, fs: MockFileSystem) -> (TestEngine, Sandbox) {
    let targets = resolve_targets(cfg, None).expect("targets should resolve");
    let (tx, rx) = engine::channel();
    let backend = FakeBackend::new();
    let queue = FakeActionQueue::new();
    let root = PathBuf::from(ROOT);

    let engine = WatchEngine::new(
        EngineSettings::new(root.clone(), cfg.options()),
        targets,
        Arc::new(fs.clone()),
        backend.clone(),
        queue.clone(),
        rx,
    );

    let sandbox = Sandbox {
        fs,
        backend,
        queue,
        events: tx,
        root,
    };
    (engine, sandbox)
}
