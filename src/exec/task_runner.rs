// src/exec/task_runner.rs

//! Individual action process runner.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{error, info};

use crate::exec::ActionOutcome;
use crate::types::WatchFiles;

/// Env var listing the added/changed paths of the triggering batch.
pub const CHANGED_ENV: &str = "WATCHLOOP_CHANGED";
/// Env var listing the deleted paths of the triggering batch.
pub const DELETED_ENV: &str = "WATCHLOOP_DELETED";

/// Run one action to completion.
///
/// Spawn errors are logged and reported as `Failed(-1)`, so the caller only
/// has to deal with one failure shape.
pub async fn run_action(action: &str, cmd: &str, files: &WatchFiles) -> ActionOutcome {
    match run_action_inner(action, cmd, files).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(action = %action, error = %err, "action execution error");
            ActionOutcome::Failed(-1)
        }
    }
}

async fn run_action_inner(action: &str, cmd: &str, files: &WatchFiles) -> Result<ActionOutcome> {
    info!(action = %action, cmd = %cmd, "starting action process");

    // Build a shell command appropriate for the platform.
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .env(CHANGED_ENV, files.changed.join("\n"))
        .env(DELETED_ENV, files.deleted.join("\n"))
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for action '{action}'"))?;

    // Always consume stderr so buffers don't fill.
    if let Some(stderr) = child.stderr.take() {
        let action = action.to_string();
        tokio::spawn(async move {
            let reader = BufReader::new(stderr);
            let mut lines = reader.lines();

            while let Ok(Some(line)) = lines.next_line().await {
                info!(action = %action, "stderr: {}", line);
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of action '{action}'"))?;

    let code = status.code().unwrap_or(-1);
    info!(
        action = %action,
        exit_code = code,
        success = status.success(),
        "action process exited"
    );

    Ok(if status.success() {
        ActionOutcome::Success
    } else {
        ActionOutcome::Failed(code)
    })
}
