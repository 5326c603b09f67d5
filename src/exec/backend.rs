// src/exec/backend.rs

//! Pluggable action queue abstraction.
//!
//! The engine talks to an `ActionQueue` instead of a raw mpsc sender, which
//! makes it easy to swap in a fake queue in tests.
//!
//! - `CommandQueue` is the default implementation used by `watchloop`. It
//!   wraps the executor loop from [`super::executor_loop`] and forwards
//!   action lists over an mpsc channel.
//! - Tests can provide their own `ActionQueue` that records what was
//!   enqueued.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use tokio::sync::{mpsc, watch};

use crate::config::model::TaskConfig;
use crate::engine::EngineSender;
use crate::errors::{Error, Result};
use crate::types::{ActionName, WatchFiles};

use super::executor_loop::spawn_executor;

/// Trait abstracting how downstream actions are queued for execution.
pub trait ActionQueue: Send {
    /// Append `actions` to the run queue. Must not wait for them to run.
    fn enqueue(
        &mut self,
        actions: Vec<ActionName>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production action queue: runs `[task.<name>]` commands in order.
pub struct CommandQueue {
    tx: mpsc::Sender<Vec<ActionName>>,
}

impl CommandQueue {
    /// Spawn the background executor loop immediately.
    ///
    /// - `tasks` maps action names to their commands.
    /// - `last_batch` exposes the triggering paths to spawned commands.
    /// - `engine_tx` receives `ActionWarning` when an action fails.
    pub fn new(
        tasks: BTreeMap<ActionName, TaskConfig>,
        last_batch: watch::Receiver<WatchFiles>,
        engine_tx: EngineSender,
    ) -> Self {
        let tx = spawn_executor(tasks, last_batch, engine_tx);
        Self { tx }
    }
}

impl ActionQueue for CommandQueue {
    fn enqueue(
        &mut self,
        actions: Vec<ActionName>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();

        Box::pin(async move {
            tx.send(actions).await.map_err(Error::from)?;
            Ok(())
        })
    }
}
