// src/watch/targets.rs

//! Target resolution: turn the watch configuration into an ordered list of
//! [`Target`]s, each with compiled patterns and its action list.

use std::fmt;

use crate::config::model::{ConfigFile, TargetConfig};
use crate::errors::{Result, WatchloopError};
use crate::types::{ActionName, LiveReloadAddr, LiveReloadSetting};
use crate::watch::patterns::PatternSet;

/// A resolved watch target.
///
/// Immutable for the lifetime of a watch cycle. The resolution order is the
/// order in which actions are enqueued when several targets match the same
/// batch; every matching target fires.
#[derive(Debug, Clone)]
pub struct Target {
    name: Option<String>,
    patterns: PatternSet,
    actions: Vec<ActionName>,
    livereload: Option<LiveReloadAddr>,
}

impl Target {
    /// `None` for the unnamed top-level target.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn actions(&self) -> &[ActionName] {
        &self.actions
    }

    pub fn livereload(&self) -> Option<&LiveReloadAddr> {
        self.livereload.as_ref()
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.patterns.matches(rel_path)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_deref().unwrap_or("(default)"))
    }
}

/// Resolve the configured targets.
///
/// - With `invoked = Some(name)`, only that named target is resolved and it
///   must exist.
/// - Otherwise every `[target.<name>]` is resolved in declaration order.
///
/// Either way the unnamed top-level target, if present, comes last.
///
/// Fails with [`WatchloopError::MissingConfiguration`] when a named target
/// or any target's `files` / `tasks` is absent.
pub fn resolve_targets(cfg: &ConfigFile, invoked: Option<&str>) -> Result<Vec<Target>> {
    let default_lr = cfg.options().livereload.as_ref();

    let mut targets = Vec::with_capacity(cfg.targets().len() + 1);
    match invoked {
        Some(name) => {
            let target_cfg = cfg.targets().get(name).ok_or_else(|| {
                WatchloopError::MissingConfiguration(format!("target.{name} is not configured"))
            })?;
            targets.push(resolve_one(Some(name), target_cfg, default_lr)?);
        }
        None => {
            for (name, target_cfg) in cfg.targets() {
                targets.push(resolve_one(Some(name), target_cfg, default_lr)?);
            }
        }
    }
    if let Some(shorthand) = cfg.shorthand() {
        targets.push(resolve_one(None, shorthand, default_lr)?);
    }

    if targets.is_empty() {
        return Err(WatchloopError::MissingConfiguration(
            "no watch targets configured".to_string(),
        ));
    }

    Ok(targets)
}

fn resolve_one(
    name: Option<&str>,
    cfg: &TargetConfig,
    default_lr: Option<&LiveReloadSetting>,
) -> Result<Target> {
    let key = |field: &str| match name {
        Some(n) => format!("target.{n}.{field}"),
        None => field.to_string(),
    };

    let files = cfg
        .files
        .as_ref()
        .ok_or_else(|| WatchloopError::MissingConfiguration(key("files")))?;
    let actions = cfg
        .tasks
        .clone()
        .ok_or_else(|| WatchloopError::MissingConfiguration(key("tasks")))?;

    let patterns = PatternSet::compile(&files.to_vec())
        .map_err(|e| WatchloopError::ConfigError(format!("{}: {e:#}", key("files"))))?;

    // A target-level value (including `false`) wins over the task-wide one.
    let livereload = cfg
        .livereload
        .as_ref()
        .or(default_lr)
        .and_then(LiveReloadSetting::address);

    Ok(Target {
        name: name.map(str::to_string),
        patterns,
        actions,
        livereload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{FilePatterns, RawConfigFile};

    fn target(files: Option<&str>, tasks: Option<&[&str]>) -> TargetConfig {
        TargetConfig {
            files: files.map(|f| FilePatterns::One(f.to_string())),
            tasks: tasks.map(|t| t.iter().map(|s| s.to_string()).collect()),
            livereload: None,
        }
    }

    fn config(raw: RawConfigFile) -> ConfigFile {
        ConfigFile::new_unchecked(raw)
    }

    #[test]
    fn named_targets_resolve_in_declaration_order_then_shorthand() {
        let mut raw = RawConfigFile::default();
        raw.target.insert("b".into(), target(Some("*.md"), Some(&["b1"])));
        raw.target.insert("a".into(), target(Some("*.txt"), Some(&["a1"])));
        raw.files = Some(FilePatterns::Many(vec!["*.rs".into()]));
        raw.tasks = Some(vec!["r1".into()]);

        let targets = resolve_targets(&config(raw), None).unwrap();
        let names: Vec<Option<&str>> = targets.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec![Some("b"), Some("a"), None]);
        assert_eq!(targets[2].actions(), &["r1".to_string()]);
    }

    #[test]
    fn invoked_target_restricts_resolution() {
        let mut raw = RawConfigFile::default();
        raw.target.insert("a".into(), target(Some("*.txt"), Some(&["a1"])));
        raw.target.insert("b".into(), target(None, Some(&["b1"])));

        let targets = resolve_targets(&config(raw), Some("a")).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name(), Some("a"));
    }

    #[test]
    fn invoked_target_keeps_the_shorthand_target() {
        let mut raw = RawConfigFile::default();
        raw.target.insert("a".into(), target(Some("*.txt"), Some(&["a1"])));
        raw.target.insert("b".into(), target(Some("*.md"), Some(&["b1"])));
        raw.files = Some(FilePatterns::One("*.rs".into()));
        raw.tasks = Some(vec!["r1".into()]);

        let targets = resolve_targets(&config(raw), Some("b")).unwrap();
        let names: Vec<Option<&str>> = targets.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec![Some("b"), None]);
    }

    #[test]
    fn missing_pieces_are_missing_configuration() {
        let mut raw = RawConfigFile::default();
        raw.target.insert("a".into(), target(Some("*.txt"), None));
        let cfg = config(raw);

        match resolve_targets(&cfg, None) {
            Err(WatchloopError::MissingConfiguration(msg)) => assert_eq!(msg, "target.a.tasks"),
            other => panic!("expected MissingConfiguration, got {other:?}"),
        }
        match resolve_targets(&cfg, Some("zzz")) {
            Err(WatchloopError::MissingConfiguration(msg)) => assert!(msg.contains("zzz")),
            other => panic!("expected MissingConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn target_livereload_overrides_task_default() {
        let mut raw = RawConfigFile::default();
        raw.options.livereload = Some(LiveReloadSetting::Enabled(true));
        let mut off = target(Some("*.css"), Some(&["css"]));
        off.livereload = Some(LiveReloadSetting::Enabled(false));
        let mut custom = target(Some("*.html"), Some(&["html"]));
        custom.livereload = Some(LiveReloadSetting::Port(4000));
        raw.target.insert("css".into(), off);
        raw.target.insert("html".into(), custom);
        raw.target.insert("js".into(), target(Some("*.js"), Some(&["js"])));

        let targets = resolve_targets(&config(raw), None).unwrap();
        assert_eq!(targets[0].livereload(), None);
        assert_eq!(targets[1].livereload().map(|a| a.port), Some(4000));
        assert_eq!(targets[2].livereload().map(|a| a.port), Some(35729));
    }
}
