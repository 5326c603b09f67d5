#![allow(dead_code)]

use std::time::Duration;

use watchloop::fs::mock::MockFileSystem;
use watchloop_test_utils::harness::ROOT;

/// Default quiet period used by the builders (`[options].debounce_ms`).
pub const QUIET: Duration = Duration::from_millis(250);

/// Short pause so the engine arms before the test starts touching files.
pub const SETTLE: Duration = Duration::from_millis(10);

/// In-memory project under [`ROOT`] containing `files` (relative paths).
pub fn project(files: &[&str]) -> MockFileSystem {
    let fs = MockFileSystem::new();
    for rel in files {
        fs.add_file(format!("{ROOT}/{rel}"));
    }
    fs
}
