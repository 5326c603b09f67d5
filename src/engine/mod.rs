// src/engine/mod.rs

//! Orchestration engine for watchloop.
//!
//! This module ties together:
//! - per-file subscriptions, the mtime cache and the open batch
//! - the addition poller and the debounce deadline
//! - dispatch of flushed batches to actions, live-reload and cache
//!   invalidation
//!
//! The synchronous watch state machine lives in [`core`]; the async shell
//! that drains the event channel and drives timers is [`runtime`].

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::model::OptionsSection;
use crate::types::{ActionName, RawKind};

pub mod core;
pub mod dispatch;
pub mod runtime;

pub use core::WatchCore;
pub use dispatch::{match_targets, DispatchReport, Dispatcher, FiredTarget};
pub use runtime::WatchEngine;

/// Events flowing into the engine from native watchers and the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A raw notification for a subscribed file.
    Notification { path: PathBuf, kind: RawKind },
    /// An action failed; restart the current watch invocation.
    ActionWarning { action: ActionName },
}

pub type EngineSender = mpsc::UnboundedSender<EngineEvent>;
pub type EngineReceiver = mpsc::UnboundedReceiver<EngineEvent>;

/// Create the engine's event channel.
///
/// Unbounded because the `notify` callback runs on a foreign thread and must
/// never block.
pub fn channel() -> (EngineSender, EngineReceiver) {
    mpsc::unbounded_channel()
}

/// Timing and location settings for one engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Directory all patterns are relative to.
    pub root: PathBuf,
    /// Quiet period before a batch is flushed.
    pub debounce: Duration,
    /// Addition poller interval.
    pub poll_interval: Duration,
}

impl EngineSettings {
    pub fn new(root: impl Into<PathBuf>, options: &OptionsSection) -> Self {
        Self {
            root: root.into(),
            debounce: Duration::from_millis(options.debounce_ms),
            poll_interval: Duration::from_millis(options.interval_ms),
        }
    }
}
