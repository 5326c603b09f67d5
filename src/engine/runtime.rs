// src/engine/runtime.rs

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::watch;
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::ActionQueue;
use crate::fs::FileSystem;
use crate::invalidate::ModuleCache;
use crate::livereload::LiveReloadRegistry;
use crate::types::WatchFiles;
use crate::watch::{Target, WatchBackend};

use super::core::WatchCore;
use super::dispatch::{DispatchReport, Dispatcher};
use super::{EngineEvent, EngineReceiver, EngineSettings};

/// Async shell around [`WatchCore`].
///
/// A single consumer drains the event channel (native notifications and
/// action warnings) and two timers: the addition poller and the debounce
/// deadline. Nothing else touches the core, so no locking is needed.
pub struct WatchEngine<B: WatchBackend, Q: ActionQueue> {
    core: WatchCore<B>,
    dispatcher: Dispatcher<Q>,
    events: EngineReceiver,
    poll_interval: Duration,
    poller: Option<Interval>,
    armed: bool,
}

impl<B: WatchBackend, Q: ActionQueue> fmt::Debug for WatchEngine<B, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchEngine")
            .field("core", &self.core)
            .field("armed", &self.armed)
            .finish_non_exhaustive()
    }
}

impl<B: WatchBackend, Q: ActionQueue> WatchEngine<B, Q> {
    pub fn new(
        settings: EngineSettings,
        targets: Vec<Target>,
        fs: Arc<dyn FileSystem>,
        backend: B,
        queue: Q,
        events: EngineReceiver,
    ) -> Self {
        let EngineSettings {
            root,
            debounce,
            poll_interval,
        } = settings;
        Self {
            core: WatchCore::new(root.clone(), targets, fs.clone(), backend, debounce),
            dispatcher: Dispatcher::new(root, fs, queue),
            events,
            poll_interval,
            poller: None,
            armed: false,
        }
    }

    pub fn with_module_cache(mut self, cache: Box<dyn ModuleCache>) -> Self {
        self.dispatcher.set_module_cache(cache);
        self
    }

    pub fn with_livereload(mut self, reloaders: LiveReloadRegistry) -> Self {
        self.dispatcher.set_livereload(reloaders);
        self
    }

    /// Publish the last-batch record on an existing channel.
    pub fn with_last_batch(mut self, sender: watch::Sender<WatchFiles>) -> Self {
        self.dispatcher.set_last_batch(sender);
        self
    }

    pub fn last_batch(&self) -> watch::Receiver<WatchFiles> {
        self.dispatcher.last_batch()
    }

    pub fn core(&self) -> &WatchCore<B> {
        &self.core
    }

    /// Watch forever: one dispatch per detected batch.
    pub async fn run(mut self) -> Result<()> {
        info!("watchloop engine started");
        loop {
            let report = self.next_batch().await?;
            debug!(
                paths = report.records.len(),
                fired = report.fired.len(),
                "watch cycle completed"
            );
        }
    }

    /// Wait for the next batch, dispatch it and re-arm.
    ///
    /// Safe to cancel while waiting; cancelling during dispatch loses the
    /// batch being dispatched.
    pub async fn next_batch(&mut self) -> Result<DispatchReport> {
        if !self.armed {
            self.arm();
        }

        loop {
            let deadline = self.core.deadline();

            tokio::select! {
                biased;

                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => return Err(anyhow!("engine event channel closed").into()),
                },

                _ = sleep_until_opt(deadline) => {
                    return self.flush().await;
                }

                _ = tick_opt(&mut self.poller) => {
                    self.core.poll_additions(Instant::now());
                }
            }
        }
    }

    fn arm(&mut self) {
        println!("[watchloop] Waiting...");
        self.core.arm(Instant::now());

        let mut poller = interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        poller.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.poller = Some(poller);
        self.armed = true;
    }

    fn disarm(&mut self) {
        self.core.teardown();
        self.poller = None;
        self.armed = false;
    }

    fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Notification { path, kind } => {
                self.core.handle_notification(&path, kind, Instant::now());
            }
            EngineEvent::ActionWarning { action } => {
                warn!(action = %action, "action reported a warning; restarting watch");
                self.disarm();
                self.arm();
            }
        }
    }

    async fn flush(&mut self) -> Result<DispatchReport> {
        let records = self.core.take_batch();
        self.disarm();

        let paths: Vec<PathBuf> = records.iter().map(|r| r.path.clone()).collect();
        debug!(?paths, "flushing batch");

        let report = self.dispatcher.dispatch(self.core.targets(), records).await?;
        self.arm();
        Ok(report)
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn tick_opt(poller: &mut Option<Interval>) {
    match poller {
        Some(poller) => {
            poller.tick().await;
        }
        None => std::future::pending().await,
    }
}
