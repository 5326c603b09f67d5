// src/livereload.rs

//! Live-reload side channel.
//!
//! After a batch is dispatched, every distinct live-reload server belonging
//! to a matching target is triggered once with the full list of changed
//! paths. The production server is a plain TCP broadcaster: each connected
//! client receives one JSON line per trigger,
//!
//! ```text
//! {"command":"reload","files":["src/app.css","index.html"]}
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::types::LiveReloadAddr;
use crate::watch::Target;

/// Fire-and-forget notification of changed paths.
pub trait LiveReload: Send + Sync {
    fn trigger(&self, files: &[String]);
}

#[derive(Debug, Serialize)]
struct ReloadMessage<'a> {
    command: &'static str,
    files: &'a [String],
}

/// TCP live-reload server broadcasting JSON lines to all clients.
#[derive(Debug)]
pub struct TcpLiveReload {
    addr: LiveReloadAddr,
    tx: broadcast::Sender<String>,
}

impl TcpLiveReload {
    /// Bind the listener and start accepting clients in the background.
    pub async fn bind(addr: &LiveReloadAddr) -> Result<Self> {
        let listener = TcpListener::bind((addr.host.as_str(), addr.port))
            .await
            .with_context(|| format!("binding live-reload server on {addr}"))?;
        info!(%addr, "live-reload server listening");

        let (tx, _) = broadcast::channel::<String>(16);
        let accept_tx = tx.clone();
        tokio::spawn(async move {
            loop {
                let (mut socket, peer) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(err) => {
                        warn!(error = %err, "live-reload accept failed");
                        continue;
                    }
                };
                debug!(%peer, "live-reload client connected");

                let mut rx = accept_tx.subscribe();
                tokio::spawn(async move {
                    loop {
                        let line = match rx.recv().await {
                            Ok(line) => line,
                            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                                debug!(%peer, skipped, "live-reload client lagging");
                                continue;
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        };
                        if socket.write_all(line.as_bytes()).await.is_err() {
                            debug!(%peer, "live-reload client disconnected");
                            break;
                        }
                    }
                });
            }
        });

        Ok(Self {
            addr: addr.clone(),
            tx,
        })
    }

    pub fn addr(&self) -> &LiveReloadAddr {
        &self.addr
    }
}

impl LiveReload for TcpLiveReload {
    fn trigger(&self, files: &[String]) {
        let message = ReloadMessage {
            command: "reload",
            files,
        };
        let mut line = match serde_json::to_string(&message) {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "failed to encode live-reload message");
                return;
            }
        };
        line.push('\n');

        // No connected clients is not an error.
        let clients = self.tx.send(line).unwrap_or(0);
        debug!(addr = %self.addr, clients, "live-reload triggered");
    }
}

/// One live-reload instance per distinct configured address.
#[derive(Default, Clone)]
pub struct LiveReloadRegistry {
    servers: BTreeMap<LiveReloadAddr, Arc<dyn LiveReload>>,
}

impl std::fmt::Debug for LiveReloadRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveReloadRegistry")
            .field("servers", &self.servers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl LiveReloadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a [`TcpLiveReload`] for every distinct address used by `targets`.
    pub async fn bind_for_targets(targets: &[Target]) -> Result<Self> {
        let mut registry = Self::new();
        for addr in targets.iter().filter_map(Target::livereload) {
            if registry.get(addr).is_some() {
                continue;
            }
            let server = TcpLiveReload::bind(addr).await?;
            registry.insert(addr.clone(), Arc::new(server));
        }
        Ok(registry)
    }

    pub fn insert(&mut self, addr: LiveReloadAddr, server: Arc<dyn LiveReload>) {
        self.servers.insert(addr, server);
    }

    pub fn get(&self, addr: &LiveReloadAddr) -> Option<&Arc<dyn LiveReload>> {
        self.servers.get(addr)
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
