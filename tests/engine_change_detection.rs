// tests/engine_change_detection.rs

mod common;
use crate::common::{project, SETTLE};

use tokio::time::{sleep, Duration};

use watchloop::config::ConfigFile;
use watchloop::types::{ChangeRecord, FileStatus, RawKind};
use watchloop_test_utils::builders::{ConfigFileBuilder, TargetConfigBuilder};
use watchloop_test_utils::harness::engine_for;
use watchloop_test_utils::{init_tracing, with_timeout};

fn txt_config() -> ConfigFile {
    ConfigFileBuilder::new()
        .with_target("txt", TargetConfigBuilder::new("*.txt").task("build").build())
        .with_task("build", "echo build")
        .build()
}

#[tokio::test(start_paused = true)]
async fn notification_without_mtime_change_is_dropped() {
    init_tracing();
    let (mut engine, sb) = engine_for(&txt_config(), project(&["a.txt", "b.txt"]));

    let (report, _) = with_timeout(async {
        tokio::join!(engine.next_batch(), async {
            sleep(SETTLE).await;
            // Same mtime as the baseline: a no-op save.
            sb.notify(&sb.path("a.txt"), RawKind::Write);
            sb.notify(&sb.path("a.txt"), RawKind::Write);

            sleep(Duration::from_secs(1)).await;
            sb.write("b.txt");
        })
    })
    .await;

    let report = report.unwrap();
    assert_eq!(
        report.records,
        vec![ChangeRecord::new(sb.path("b.txt"), FileStatus::Changed)]
    );
    assert_eq!(sb.queue.calls(), vec![vec!["build".to_string()]]);
}

#[tokio::test(start_paused = true)]
async fn burst_of_raw_events_for_one_save_yields_one_record() {
    init_tracing();
    let (mut engine, sb) = engine_for(&txt_config(), project(&["a.txt"]));

    let (report, _) = with_timeout(async {
        tokio::join!(engine.next_batch(), async {
            sleep(SETTLE).await;
            let path = sb.write("a.txt");
            sb.notify(&path, RawKind::Write);
            sb.notify(&path, RawKind::Write);
        })
    })
    .await;

    let report = report.unwrap();
    assert_eq!(
        report.records,
        vec![ChangeRecord::new(sb.path("a.txt"), FileStatus::Changed)]
    );
}

#[tokio::test(start_paused = true)]
async fn delete_then_recreate_in_one_window_is_changed() {
    init_tracing();
    let (mut engine, sb) = engine_for(&txt_config(), project(&["a.txt"]));
    let path = sb.path("a.txt");

    let (report, _) = with_timeout(async {
        tokio::join!(engine.next_batch(), async {
            sleep(SETTLE).await;
            sb.delete("a.txt");
            sleep(Duration::from_millis(50)).await;
            assert!(!sb.backend.is_active(&path));

            // Recreated; only the addition poller can see it now.
            sb.create("a.txt");
        })
    })
    .await;

    let report = report.unwrap();
    assert_eq!(
        report.records,
        vec![ChangeRecord::new(path.clone(), FileStatus::Changed)]
    );
    assert!(sb.backend.is_active(&path), "recreated file is watched again");
}

#[tokio::test(start_paused = true)]
async fn rename_of_existing_file_is_reported_renamed_and_dispatched() {
    init_tracing();
    let (mut engine, sb) = engine_for(&txt_config(), project(&["a.txt"]));

    let (report, _) = with_timeout(async {
        tokio::join!(engine.next_batch(), async {
            sleep(SETTLE).await;
            let path = sb.create("a.txt");
            sb.notify(&path, RawKind::Rename);
        })
    })
    .await;

    let report = report.unwrap();
    assert_eq!(report.records[0].status, FileStatus::Renamed);
    assert_eq!(report.enqueued_actions(), vec!["build".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn deleted_file_is_reported_and_released() {
    init_tracing();
    let (mut engine, sb) = engine_for(&txt_config(), project(&["a.txt", "b.txt"]));
    let last_batch = engine.last_batch();

    let (report, _) = with_timeout(async {
        tokio::join!(engine.next_batch(), async {
            sleep(SETTLE).await;
            sb.delete("a.txt");
        })
    })
    .await;

    let report = report.unwrap();
    assert_eq!(
        report.records,
        vec![ChangeRecord::new(sb.path("a.txt"), FileStatus::Deleted)]
    );
    assert!(!sb.backend.is_active(sb.path("a.txt")));
    assert!(sb.backend.is_active(sb.path("b.txt")));
    assert_eq!(engine.core().cached_mtime(&sb.path("a.txt")), None);

    let files = last_batch.borrow().clone();
    assert!(files.changed.is_empty());
    assert_eq!(files.deleted, vec!["a.txt".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn failed_stat_is_treated_as_deletion() {
    init_tracing();
    let (mut engine, sb) = engine_for(&txt_config(), project(&["a.txt"]));
    let path = sb.path("a.txt");

    let (report, _) = with_timeout(async {
        tokio::join!(engine.next_batch(), async {
            sleep(SETTLE).await;
            sb.fs.fail_stat(&path);
            sb.notify(&path, RawKind::Write);
        })
    })
    .await;

    let report = report.unwrap();
    assert_eq!(
        report.records,
        vec![ChangeRecord::new(path.clone(), FileStatus::Deleted)]
    );
    // Still unreadable after re-arm: neither watched nor reported again.
    assert!(!engine.core().is_watched(&path));
    assert!(engine.core().pending().is_empty());
}

#[tokio::test(start_paused = true)]
async fn notification_for_unwatched_path_is_ignored() {
    init_tracing();
    let (mut engine, sb) = engine_for(&txt_config(), project(&["a.txt", "notes.md"]));

    let (report, _) = with_timeout(async {
        tokio::join!(engine.next_batch(), async {
            sleep(SETTLE).await;
            sb.write("notes.md");
            sleep(Duration::from_secs(1)).await;
            sb.write("a.txt");
        })
    })
    .await;

    let report = report.unwrap();
    assert_eq!(report.paths(), vec![sb.path("a.txt")]);
}
