// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, TargetConfig};
use crate::errors::{Result, WatchloopError};
use crate::watch::patterns::PatternSet;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WatchloopError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_targets(cfg)?;
    validate_options(cfg)?;
    validate_task_references(cfg)?;
    validate_patterns(cfg)?;
    Ok(())
}

/// Iterate `(config key, target)` for named targets plus the shorthand one.
fn all_targets(cfg: &RawConfigFile) -> impl Iterator<Item = (String, TargetConfig)> + '_ {
    let shorthand = cfg.files.as_ref().map(|files| {
        (
            "(top level)".to_string(),
            TargetConfig {
                files: Some(files.clone()),
                tasks: cfg.tasks.clone(),
                livereload: None,
            },
        )
    });
    cfg.target
        .iter()
        .map(|(name, t)| (format!("target.{name}"), t.clone()))
        .chain(shorthand)
}

fn ensure_has_targets(cfg: &RawConfigFile) -> Result<()> {
    if cfg.files.is_none() && cfg.tasks.is_some() {
        return Err(WatchloopError::MissingConfiguration(
            "top-level `tasks` given without top-level `files`".to_string(),
        ));
    }
    if cfg.target.is_empty() && cfg.files.is_none() {
        return Err(WatchloopError::ConfigError(
            "config must contain at least one [target.<name>] section or top-level `files`"
                .to_string(),
        ));
    }
    Ok(())
}

fn validate_options(cfg: &RawConfigFile) -> Result<()> {
    if cfg.options.debounce_ms == 0 {
        return Err(WatchloopError::ConfigError(
            "[options].debounce_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.options.interval_ms == 0 {
        return Err(WatchloopError::ConfigError(
            "[options].interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_references(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        if task.cmd.trim().is_empty() {
            return Err(WatchloopError::ConfigError(format!(
                "task '{name}' has an empty `cmd`"
            )));
        }
    }

    for (key, target) in all_targets(cfg) {
        for action in target.tasks.iter().flatten() {
            if !cfg.task.contains_key(action) {
                return Err(WatchloopError::ConfigError(format!(
                    "{key} references unknown task '{action}' in `tasks`"
                )));
            }
        }
    }
    Ok(())
}

fn validate_patterns(cfg: &RawConfigFile) -> Result<()> {
    for (key, target) in all_targets(cfg) {
        if let Some(files) = &target.files {
            PatternSet::compile(&files.to_vec())
                .map_err(|e| WatchloopError::ConfigError(format!("{key}.files: {e:#}")))?;
        }
    }
    Ok(())
}
