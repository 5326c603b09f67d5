// src/types.rs

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// Identifier of a downstream action (`[task.<name>]`).
pub type ActionName = String;

/// How a watched path changed.
///
/// `Renamed` only exists for logging: it is reported when the raw
/// notification was a rename but the file still exists, and is dispatched
/// exactly like `Changed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatus {
    Added,
    Changed,
    Renamed,
    Deleted,
}

impl FileStatus {
    pub fn is_deleted(self) -> bool {
        matches!(self, FileStatus::Deleted)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileStatus::Added => "added",
            FileStatus::Changed => "changed",
            FileStatus::Renamed => "renamed",
            FileStatus::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// Kind of a raw, unclassified filesystem notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    Rename,
    Write,
}

/// A single classified change, keyed by absolute path inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub path: PathBuf,
    pub status: FileStatus,
}

impl ChangeRecord {
    pub fn new(path: impl Into<PathBuf>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
        }
    }
}

/// Paths that triggered the most recent dispatch.
///
/// Added, changed and renamed paths all land in `changed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchFiles {
    pub changed: Vec<String>,
    pub deleted: Vec<String>,
}

pub const DEFAULT_LIVERELOAD_HOST: &str = "127.0.0.1";
pub const DEFAULT_LIVERELOAD_PORT: u16 = 35729;

/// Value of a `livereload` option, task-wide or per target.
///
/// Accepted forms:
///
/// ```toml
/// livereload = true
/// livereload = 35730
/// livereload = { host = "0.0.0.0", port = 35730 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LiveReloadSetting {
    Enabled(bool),
    Port(u16),
    Server {
        #[serde(default = "default_livereload_host")]
        host: String,
        #[serde(default = "default_livereload_port")]
        port: u16,
    },
}

fn default_livereload_host() -> String {
    DEFAULT_LIVERELOAD_HOST.to_string()
}

fn default_livereload_port() -> u16 {
    DEFAULT_LIVERELOAD_PORT
}

impl LiveReloadSetting {
    /// Address to serve on, or `None` when explicitly disabled.
    pub fn address(&self) -> Option<LiveReloadAddr> {
        match self {
            LiveReloadSetting::Enabled(false) => None,
            LiveReloadSetting::Enabled(true) => Some(LiveReloadAddr {
                host: default_livereload_host(),
                port: DEFAULT_LIVERELOAD_PORT,
            }),
            LiveReloadSetting::Port(port) => Some(LiveReloadAddr {
                host: default_livereload_host(),
                port: *port,
            }),
            LiveReloadSetting::Server { host, port } => Some(LiveReloadAddr {
                host: host.clone(),
                port: *port,
            }),
        }
    }
}

/// Normalized live-reload address; one server exists per distinct value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LiveReloadAddr {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for LiveReloadAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
