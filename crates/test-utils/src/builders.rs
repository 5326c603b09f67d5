#![allow(dead_code)]

use watchloop::config::{
    ConfigFile, FilePatterns, OptionsSection, RawConfigFile, TargetConfig, TaskConfig,
};
use watchloop::types::LiveReloadSetting;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                options: OptionsSection::default(),
                ..RawConfigFile::default()
            },
        }
    }

    pub fn with_target(mut self, name: &str, target: TargetConfig) -> Self {
        self.config.target.insert(name.to_string(), target);
        self
    }

    /// Top-level unnamed target.
    pub fn with_shorthand(mut self, files: &[&str], tasks: &[&str]) -> Self {
        self.config.files = Some(FilePatterns::Many(
            files.iter().map(|f| f.to_string()).collect(),
        ));
        self.config.tasks = Some(tasks.iter().map(|t| t.to_string()).collect());
        self
    }

    /// Define `[task.<name>]`.
    pub fn with_task(mut self, name: &str, cmd: &str) -> Self {
        self.config.task.insert(
            name.to_string(),
            TaskConfig {
                cmd: cmd.to_string(),
            },
        );
        self
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.config.options.debounce_ms = ms;
        self
    }

    pub fn with_interval_ms(mut self, ms: u64) -> Self {
        self.config.options.interval_ms = ms;
        self
    }

    pub fn with_livereload(mut self, setting: LiveReloadSetting) -> Self {
        self.config.options.livereload = Some(setting);
        self
    }

    /// The unvalidated form, for exercising validation errors.
    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TargetConfig`.
pub struct TargetConfigBuilder {
    target: TargetConfig,
}

impl TargetConfigBuilder {
    pub fn new(pattern: &str) -> Self {
        Self {
            target: TargetConfig {
                files: Some(FilePatterns::Many(vec![pattern.to_string()])),
                tasks: Some(vec![]),
                livereload: None,
            },
        }
    }

    pub fn files(mut self, pattern: &str) -> Self {
        let files = match self.target.files.take() {
            Some(existing) => {
                let mut v = existing.to_vec();
                v.push(pattern.to_string());
                v
            }
            None => vec![pattern.to_string()],
        };
        self.target.files = Some(FilePatterns::Many(files));
        self
    }

    pub fn task(mut self, name: &str) -> Self {
        self.target
            .tasks
            .get_or_insert_with(Vec::new)
            .push(name.to_string());
        self
    }

    pub fn livereload(mut self, setting: LiveReloadSetting) -> Self {
        self.target.livereload = Some(setting);
        self
    }

    pub fn build(self) -> TargetConfig {
        self.target
    }
}
