// src/invalidate.rs

use std::path::Path;

use tracing::debug;

/// Invalidates any cached representation of a previously loaded file.
///
/// Called once per flushed path before actions are enqueued. Failures are
/// the implementation's to swallow; nothing is returned.
pub trait ModuleCache: Send {
    fn invalidate(&mut self, path: &Path);
}

/// Default cache: nothing is cached, so there is nothing to clear.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopModuleCache;

impl ModuleCache for NoopModuleCache {
    fn invalidate(&mut self, path: &Path) {
        debug!(?path, "clearing cached data for file");
    }
}
