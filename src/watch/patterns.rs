// src/watch/patterns.rs

use std::fmt;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// Compiled glob patterns for a single target.
///
/// Patterns are relative to the watch root and use `/` separators. A leading
/// `!` turns a pattern into an exclusion:
///
/// ```toml
/// files = ["src/**/*.rs", "!src/generated/**"]
/// ```
///
/// `*` never crosses a directory boundary; use `**` for that.
#[derive(Clone)]
pub struct PatternSet {
    patterns: Vec<String>,
    include_set: GlobSet,
    exclude_set: Option<GlobSet>,
    base_dirs: Vec<PathBuf>,
}

impl fmt::Debug for PatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternSet")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl PatternSet {
    pub fn compile(patterns: &[String]) -> Result<Self> {
        let mut includes = Vec::new();
        let mut excludes = Vec::new();
        for pat in patterns {
            match pat.strip_prefix('!') {
                Some(negated) => excludes.push(negated.to_string()),
                None => includes.push(pat.clone()),
            }
        }

        let include_set = build_globset(&includes)?;
        let exclude_set = if excludes.is_empty() {
            None
        } else {
            Some(build_globset(&excludes)?)
        };
        let base_dirs = includes.iter().map(|p| static_prefix(p)).collect();

        Ok(Self {
            patterns: patterns.to_vec(),
            include_set,
            exclude_set,
            base_dirs,
        })
    }

    /// The patterns as written in the config.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Directories (relative to the root) that can contain matches.
    pub fn base_dirs(&self) -> &[PathBuf] {
        &self.base_dirs
    }

    /// Returns true if `rel_path` (relative to the watch root, e.g.
    /// `"src/foo/bar.rs"`) matches an include pattern and no exclusion.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat.trim_start_matches("./"))
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Leading directory components of `pattern` that contain no glob syntax.
///
/// `"src/**/*.rs"` -> `"src"`, `"docs/index.md"` -> `"docs"`, `"*.txt"` -> `""`.
fn static_prefix(pattern: &str) -> PathBuf {
    let pattern = pattern.trim_start_matches("./");
    let parts: Vec<&str> = pattern.split('/').collect();
    let mut prefix = PathBuf::new();
    // The last component is the file part; never treat it as a directory.
    for part in &parts[..parts.len().saturating_sub(1)] {
        if part.contains(['*', '?', '[', '{']) {
            break;
        }
        let component = Path::new(part);
        if component
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            break;
        }
        prefix.push(part);
    }
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(patterns: &[&str]) -> PatternSet {
        let owned: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        PatternSet::compile(&owned).unwrap()
    }

    #[test]
    fn star_does_not_cross_directories() {
        let s = set(&["*.txt"]);
        assert!(s.matches("x.txt"));
        assert!(!s.matches("sub/x.txt"));
    }

    #[test]
    fn double_star_and_negation() {
        let s = set(&["src/**/*.rs", "!src/generated/**"]);
        assert!(s.matches("src/main.rs"));
        assert!(s.matches("src/a/b/c.rs"));
        assert!(!s.matches("src/generated/out.rs"));
        assert!(!s.matches("README.md"));
    }

    #[test]
    fn base_dirs_stop_at_first_glob_component() {
        let s = set(&["src/**/*.rs", "docs/index.md", "*.toml", "./lib/*.rs"]);
        assert_eq!(
            s.base_dirs(),
            &[
                PathBuf::from("src"),
                PathBuf::from("docs"),
                PathBuf::new(),
                PathBuf::from("lib"),
            ]
        );
    }

    #[test]
    fn invalid_glob_is_an_error() {
        let err = PatternSet::compile(&["src/[".to_string()]).unwrap_err();
        assert!(format!("{err:#}").contains("invalid glob pattern"));
    }
}
