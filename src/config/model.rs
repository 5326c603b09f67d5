// src/config/model.rs

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::types::{ActionName, LiveReloadSetting};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [options]
/// debounce_ms = 250
/// interval_ms = 200
/// livereload = true
///
/// [target.scripts]
/// files = ["src/**/*.rs", "!src/generated/**"]
/// tasks = ["build", "test"]
///
/// [task.build]
/// cmd = "cargo build"
/// ```
///
/// A single unnamed target may also be written at the top level with
/// `files` / `tasks` keys next to `[options]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Task-wide watch options from `[options]`.
    #[serde(default)]
    pub options: OptionsSection,

    /// Shorthand (unnamed) target: top-level `files`.
    #[serde(default)]
    pub files: Option<FilePatterns>,

    /// Shorthand (unnamed) target: top-level `tasks`.
    #[serde(default)]
    pub tasks: Option<Vec<ActionName>>,

    /// Named watch targets from `[target.<name>]`, in declaration order.
    #[serde(default)]
    pub target: IndexMap<String, TargetConfig>,

    /// Action definitions from `[task.<name>]`.
    #[serde(default)]
    pub task: BTreeMap<ActionName, TaskConfig>,
}

/// A validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`),
/// so holders can rely on every referenced task existing.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    options: OptionsSection,
    shorthand: Option<TargetConfig>,
    targets: IndexMap<String, TargetConfig>,
    tasks: BTreeMap<ActionName, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        let shorthand = raw.files.map(|files| TargetConfig {
            files: Some(files),
            tasks: raw.tasks,
            livereload: None,
        });
        Self {
            options: raw.options,
            shorthand,
            targets: raw.target,
            tasks: raw.task,
        }
    }

    pub fn options(&self) -> &OptionsSection {
        &self.options
    }

    /// The unnamed top-level target, if `files` was given at the top level.
    pub fn shorthand(&self) -> Option<&TargetConfig> {
        self.shorthand.as_ref()
    }

    /// Named targets in the order the file declares them.
    pub fn targets(&self) -> &IndexMap<String, TargetConfig> {
        &self.targets
    }

    pub fn tasks(&self) -> &BTreeMap<ActionName, TaskConfig> {
        &self.tasks
    }
}

/// `[options]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionsSection {
    /// Quiet period in milliseconds before a batch of changes is flushed.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Interval in milliseconds at which new files are polled for.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Task-wide live-reload default; targets may override it.
    #[serde(default)]
    pub livereload: Option<LiveReloadSetting>,
}

fn default_debounce_ms() -> u64 {
    250
}

fn default_interval_ms() -> u64 {
    200
}

impl Default for OptionsSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            interval_ms: default_interval_ms(),
            livereload: None,
        }
    }
}

/// `[target.<name>]` section.
///
/// `files` and `tasks` are optional here so the target resolver can report
/// exactly which one is missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub files: Option<FilePatterns>,

    #[serde(default)]
    pub tasks: Option<Vec<ActionName>>,

    /// Overrides `[options].livereload` for this target.
    #[serde(default)]
    pub livereload: Option<LiveReloadSetting>,
}

/// One glob or an ordered list of globs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FilePatterns {
    One(String),
    Many(Vec<String>),
}

impl FilePatterns {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            FilePatterns::One(p) => vec![p.clone()],
            FilePatterns::Many(ps) => ps.clone(),
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// The shell command to execute.
    pub cmd: String,
}
