// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Resolving targets and compiling their glob patterns.
//! - Discovering the files those patterns currently match.
//! - Managing one native subscription per discovered file (`notify`).
//! - Classifying raw notifications with the mtime cache and collecting them
//!   into a debounced batch.
//!
//! It does **not** run anything; the engine turns flushed batches into
//! enqueued actions.

pub mod batch;
pub mod classify;
pub mod debounce;
pub mod discovery;
pub mod mtime;
pub mod path_utils;
pub mod patterns;
pub mod subscriptions;
pub mod targets;
pub mod watcher;

pub use batch::Batch;
pub use classify::{classify, probe, Probe};
pub use debounce::Debouncer;
pub use discovery::discover;
pub use mtime::MtimeCache;
pub use patterns::PatternSet;
pub use subscriptions::{FileWatchers, WatchBackend};
pub use targets::{resolve_targets, Target};
pub use watcher::NotifyBackend;
