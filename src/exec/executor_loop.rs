// src/exec/executor_loop.rs

//! Background loop that runs queued actions one after another.

use std::collections::{BTreeMap, VecDeque};

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::model::TaskConfig;
use crate::engine::{EngineEvent, EngineSender};
use crate::exec::task_runner::run_action;
use crate::exec::ActionOutcome;
use crate::types::{ActionName, WatchFiles};

/// Spawn the background executor loop.
///
/// The returned sender is what [`super::CommandQueue`] forwards enqueued
/// action lists into. Actions run strictly in arrival order, one at a time.
///
/// A failing action is a soft failure: everything still queued is dropped
/// and the engine is told to restart its current watch invocation through
/// [`EngineEvent::ActionWarning`]. The loop itself keeps running.
pub fn spawn_executor(
    tasks: BTreeMap<ActionName, TaskConfig>,
    last_batch: watch::Receiver<WatchFiles>,
    engine_tx: EngineSender,
) -> mpsc::Sender<Vec<ActionName>> {
    let (tx, mut rx) = mpsc::channel::<Vec<ActionName>>(32);

    tokio::spawn(async move {
        info!("executor loop started");

        let mut pending: VecDeque<ActionName> = VecDeque::new();

        loop {
            if pending.is_empty() {
                match rx.recv().await {
                    Some(actions) => pending.extend(actions),
                    None => break,
                }
            }
            while let Ok(actions) = rx.try_recv() {
                pending.extend(actions);
            }

            let Some(action) = pending.pop_front() else {
                continue;
            };

            let outcome = match tasks.get(&action) {
                Some(task) => {
                    let files = last_batch.borrow().clone();
                    run_action(&action, &task.cmd, &files).await
                }
                None => {
                    warn!(action = %action, "no [task] definition for action; skipping");
                    ActionOutcome::Failed(-1)
                }
            };

            if let ActionOutcome::Failed(code) = outcome {
                soft_fail(&action, code, &mut rx, &mut pending, &engine_tx);
            }
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}

/// Clear every queued action and ask the engine to restart its watch.
fn soft_fail(
    action: &str,
    code: i32,
    rx: &mut mpsc::Receiver<Vec<ActionName>>,
    pending: &mut VecDeque<ActionName>,
    engine_tx: &EngineSender,
) {
    while let Ok(actions) = rx.try_recv() {
        pending.extend(actions);
    }
    let dropped: Vec<ActionName> = pending.drain(..).collect();

    warn!(
        action = %action,
        exit_code = code,
        ?dropped,
        "action failed; clearing queued actions and restarting watch"
    );

    if engine_tx
        .send(EngineEvent::ActionWarning {
            action: action.to_string(),
        })
        .is_err()
    {
        debug!(action = %action, "engine gone; not signalling action warning");
    }
}
