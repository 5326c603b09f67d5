// src/watch/discovery.rs

//! File discovery: expand target patterns into the set of existing files.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::PatternSet;

/// Expand every pattern set against `root` and return the absolute paths of
/// all regular files matched by at least one of them.
///
/// Only the static directory prefixes of the patterns are walked, so
/// `src/**/*.rs` never descends into `target/`. Unreadable directories are
/// skipped with a warning; a base directory that does not exist yet is
/// simply empty.
pub fn discover(fs: &dyn FileSystem, root: &Path, sets: &[&PatternSet]) -> BTreeSet<PathBuf> {
    let mut files = BTreeSet::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();

    for base in walk_roots(root, sets) {
        if !fs.is_dir(&base) {
            debug!(?base, "discovery base is not a directory; skipping");
            continue;
        }

        let mut stack = vec![base];
        while let Some(dir) = stack.pop() {
            // Guard against symlink loops.
            let key = fs.canonicalize(&dir).unwrap_or_else(|_| dir.clone());
            if !visited.insert(key) {
                continue;
            }

            let entries = match fs.read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(?dir, error = %err, "failed to read directory during discovery");
                    continue;
                }
            };

            for path in entries {
                if fs.is_dir(&path) {
                    stack.push(path);
                } else if fs.is_file(&path) {
                    if let Some(rel) = relative_str(fs, root, &path) {
                        if sets.iter().any(|s| s.matches(&rel)) {
                            files.insert(path);
                        }
                    }
                }
            }
        }
    }

    files
}

/// Absolute walk roots, with nested duplicates removed.
fn walk_roots(root: &Path, sets: &[&PatternSet]) -> Vec<PathBuf> {
    let mut bases: Vec<PathBuf> = sets
        .iter()
        .flat_map(|s| s.base_dirs().iter())
        .map(|rel| {
            if rel.as_os_str().is_empty() {
                root.to_path_buf()
            } else {
                root.join(rel)
            }
        })
        .collect();
    bases.sort();
    bases.dedup();

    let mut roots: Vec<PathBuf> = Vec::new();
    for base in bases {
        // Sorted order puts ancestors first.
        if !roots.iter().any(|r| base.starts_with(r)) {
            roots.push(base);
        }
    }
    roots
}
