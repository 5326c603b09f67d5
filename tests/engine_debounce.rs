// tests/engine_debounce.rs

mod common;
use crate::common::{project, QUIET, SETTLE};

use std::path::PathBuf;

use tokio::time::{sleep, timeout, Duration, Instant};

use watchloop::config::ConfigFile;
use watchloop_test_utils::builders::{ConfigFileBuilder, TargetConfigBuilder};
use watchloop_test_utils::harness::{engine_for, Sandbox};
use watchloop_test_utils::{init_tracing, with_timeout};

fn config() -> ConfigFile {
    ConfigFileBuilder::new()
        .with_target("all", TargetConfigBuilder::new("**/*.txt").task("build").build())
        .with_task("build", "echo build")
        .build()
}

#[tokio::test(start_paused = true)]
async fn events_inside_quiet_period_coalesce_into_one_batch() {
    init_tracing();
    let (mut engine, sb) = engine_for(&config(), project(&["a.txt", "b.txt", "c.txt"]));
    let start = Instant::now();

    let (report, last_event) = with_timeout(async {
        tokio::join!(engine.next_batch(), async {
            sleep(SETTLE).await;
            for rel in ["a.txt", "b.txt", "c.txt", "a.txt", "b.txt"] {
                sb.write(rel);
                sleep(Duration::from_millis(100)).await;
            }
            // The last write happened one sleep ago.
            Instant::now() - Duration::from_millis(100)
        })
    })
    .await;

    let report = report.unwrap();
    assert_eq!(report.records.len(), 3);
    assert_eq!(sb.queue.calls(), vec![vec!["build".to_string()]]);

    // Cancel-and-restart: the flush waits a full quiet period after the
    // last event, not after the first.
    let flushed = Instant::now();
    assert!(flushed >= last_event + QUIET);
    assert!(flushed - start >= Duration::from_millis(400) + QUIET);
}

/// Run one continuous engine loop while `a.txt` and then `b.txt` are written
/// `gap` apart, and collect the paths of every batch flushed along the way.
async fn batches_for_two_writes(gap: Duration) -> (Vec<Vec<PathBuf>>, Sandbox) {
    let (mut engine, sb) = engine_for(&config(), project(&["a.txt", "b.txt"]));
    let mut batches = Vec::new();

    let _ = timeout(Duration::from_secs(3), async {
        tokio::join!(
            async {
                while batches.len() < 2 {
                    batches.push(engine.next_batch().await.unwrap().paths());
                }
            },
            async {
                sleep(SETTLE).await;
                sb.write("a.txt");
                sleep(gap).await;
                sb.write("b.txt");
            }
        )
    })
    .await;

    (batches, sb)
}

#[tokio::test(start_paused = true)]
async fn bursts_separated_by_quiet_period_flush_separately() {
    init_tracing();
    let (batches, sb) = batches_for_two_writes(QUIET + Duration::from_millis(50)).await;

    assert_eq!(
        batches,
        vec![vec![sb.path("a.txt")], vec![sb.path("b.txt")]]
    );
    assert_eq!(sb.queue.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn write_just_inside_quiet_period_joins_the_open_batch() {
    init_tracing();
    let (batches, sb) = batches_for_two_writes(QUIET - Duration::from_millis(1)).await;

    assert_eq!(batches, vec![vec![sb.path("a.txt"), sb.path("b.txt")]]);
    assert_eq!(sb.queue.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn nothing_is_flushed_without_events() {
    init_tracing();
    let (mut engine, _sb) = engine_for(&config(), project(&["a.txt"]));

    let res = timeout(Duration::from_secs(3), engine.next_batch()).await;
    assert!(res.is_err(), "an idle tree must not produce a batch");
    assert!(engine.core().deadline().is_none());
}

#[tokio::test(start_paused = true)]
async fn configured_quiet_period_is_honoured() {
    init_tracing();
    let cfg = ConfigFileBuilder::new()
        .with_target("all", TargetConfigBuilder::new("*.txt").task("build").build())
        .with_task("build", "echo build")
        .with_debounce_ms(1_000)
        .build();
    let (mut engine, sb) = engine_for(&cfg, project(&["a.txt"]));

    let (report, written_at) = with_timeout(async {
        tokio::join!(engine.next_batch(), async {
            sleep(SETTLE).await;
            sb.write("a.txt");
            Instant::now()
        })
    })
    .await;

    report.unwrap();
    assert!(Instant::now() >= written_at + Duration::from_millis(1_000));
}
