// tests/soft_fail.rs

mod common;
use crate::common::{project, SETTLE};

use std::collections::BTreeMap;
use std::path::Path;

use tokio::sync::watch;
use tokio::time::{sleep, Duration, Instant};

use watchloop::config::TaskConfig;
use watchloop::engine::{self, EngineEvent};
use watchloop::exec::{ActionQueue, CommandQueue};
use watchloop::types::{ChangeRecord, FileStatus, WatchFiles};
use watchloop_test_utils::builders::{ConfigFileBuilder, TargetConfigBuilder};
use watchloop_test_utils::harness::engine_for;
use watchloop_test_utils::{init_tracing, with_timeout};

#[tokio::test(start_paused = true)]
async fn action_warning_restarts_watch_and_keeps_open_batch() {
    init_tracing();
    let cfg = ConfigFileBuilder::new()
        .with_target("txt", TargetConfigBuilder::new("*.txt").task("build").build())
        .with_task("build", "echo build")
        .build();
    let (mut engine, sb) = engine_for(&cfg, project(&["a.txt", "b.txt"]));

    let (report, written_at) = with_timeout(async {
        tokio::join!(engine.next_batch(), async {
            sleep(SETTLE).await;
            sb.write("a.txt");
            let written_at = Instant::now();

            sleep(Duration::from_millis(50)).await;
            sb.warn("build");
            written_at
        })
    })
    .await;

    let report = report.unwrap();
    assert_eq!(
        report.records,
        vec![ChangeRecord::new(sb.path("a.txt"), FileStatus::Changed)]
    );
    // The restart did not push the deadline back.
    assert!(Instant::now() < written_at + Duration::from_millis(400));
    // Torn down and re-armed twice (restart + flush); still one watch each.
    assert_eq!(sb.backend.active().len(), 2);
    assert_eq!(sb.backend.watch_calls(), 6);
}

fn task(cmd: String) -> TaskConfig {
    TaskConfig { cmd }
}

async fn wait_for(path: &Path) {
    while !path.exists() {
        sleep(Duration::from_millis(20)).await;
    }
}

#[cfg(unix)]
#[tokio::test]
async fn failing_action_clears_queue_and_signals_engine() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let skipped = dir.path().join("skipped");
    let later = dir.path().join("later");

    let mut tasks = BTreeMap::new();
    tasks.insert("fail".to_string(), task("exit 3".to_string()));
    tasks.insert(
        "after".to_string(),
        task(format!("touch '{}'", skipped.display())),
    );
    tasks.insert("later".to_string(), task(format!("touch '{}'", later.display())));

    let (engine_tx, mut engine_rx) = engine::channel();
    let (_files_tx, files_rx) = watch::channel(WatchFiles::default());
    let mut queue = CommandQueue::new(tasks, files_rx, engine_tx);

    queue
        .enqueue(vec!["fail".to_string(), "after".to_string()])
        .await
        .unwrap();

    let event = with_timeout(engine_rx.recv()).await;
    assert_eq!(
        event,
        Some(EngineEvent::ActionWarning {
            action: "fail".to_string()
        })
    );

    // The executor keeps running after a soft failure.
    queue.enqueue(vec!["later".to_string()]).await.unwrap();
    with_timeout(wait_for(&later)).await;
    assert!(!skipped.exists(), "queued action after a failure must not run");
}

#[cfg(unix)]
#[tokio::test]
async fn actions_see_the_last_batch() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let mut tasks = BTreeMap::new();
    tasks.insert(
        "dump".to_string(),
        task(format!(
            "printf '%s|%s' \"$WATCHLOOP_CHANGED\" \"$WATCHLOOP_DELETED\" > '{}.tmp' && mv '{0}.tmp' '{0}'",
            out.display()
        )),
    );

    let (engine_tx, _engine_rx) = engine::channel();
    let (files_tx, files_rx) = watch::channel(WatchFiles::default());
    let mut queue = CommandQueue::new(tasks, files_rx, engine_tx);

    files_tx.send_replace(WatchFiles {
        changed: vec!["src/a.rs".to_string()],
        deleted: vec!["src/b.rs".to_string()],
    });
    queue.enqueue(vec!["dump".to_string()]).await.unwrap();

    with_timeout(wait_for(&out)).await;
    let contents = std::fs::read_to_string(&out).unwrap();
    assert_eq!(contents, "src/a.rs|src/b.rs");
}
