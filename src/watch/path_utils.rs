// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::Path;

use crate::fs::FileSystem;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. due to symlinks or different absolute prefixes),
///   we canonicalize both paths through `fs` and try again.
///
/// Returns `None` if the path cannot be reasonably related to `root`. Deleted
/// files can only take the fast path, which is why discovery always joins
/// paths onto the root it was given.
pub fn relative_str(fs: &dyn FileSystem, root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    // Helps on platforms (notably macOS) where different absolute prefixes
    // may be used for the same directory (/private/var/...).
    if let (Ok(root_canon), Ok(path_canon)) = (fs.canonicalize(root), fs.canonicalize(path)) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(rel.to_string_lossy().replace('\\', "/"));
        }
    }

    None
}

/// Display form of `path`: relative to `root` when possible.
pub fn display_path(fs: &dyn FileSystem, root: &Path, path: &Path) -> String {
    relative_str(fs, root, path).unwrap_or_else(|| path.to_string_lossy().into_owned())
}
