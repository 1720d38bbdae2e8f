//! Optional background expiry check.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info};

use journal_entity::session::Session;

use super::manager::SessionManager;

/// Capacity of the expiry notification channel.
const EXPIRED_CHANNEL_CAPACITY: usize = 64;

/// Periodically discards stale sessions and announces each one so the
/// host can force a logout.
///
/// Expiry is already enforced on every access path; the watcher only
/// makes it visible without waiting for the next request.
#[derive(Debug)]
pub struct SessionWatcher {
    manager: Arc<SessionManager>,
    interval: Duration,
}

impl SessionWatcher {
    /// Creates a watcher polling at the configured interval.
    pub fn new(manager: Arc<SessionManager>) -> Self {
        let interval = manager.config().poll_interval();
        Self { manager, interval }
    }

    /// Override the polling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Start polling on the current runtime.
    pub fn spawn(self) -> WatcherHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (expired_tx, _) = broadcast::channel(EXPIRED_CHANNEL_CAPACITY);
        let events = expired_tx.clone();
        let task = tokio::spawn(self.run(shutdown_rx, expired_tx));

        WatcherHandle {
            shutdown: shutdown_tx,
            expired: events,
            task,
        }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>, expired: broadcast::Sender<Session>) {
        info!(
            interval_seconds = self.interval.as_secs(),
            "Session watcher started"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let stale = self.manager.sweep_expired().await;
                    if !stale.is_empty() {
                        debug!(count = stale.len(), "Session watcher discarded stale sessions");
                    }
                    for session in stale {
                        // No subscribers is fine.
                        let _ = expired.send(session);
                    }
                }
            }
        }

        info!("Session watcher stopped");
    }
}

/// Handle to a running [`SessionWatcher`].
#[derive(Debug)]
pub struct WatcherHandle {
    shutdown: watch::Sender<bool>,
    expired: broadcast::Sender<Session>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Receive every session the watcher discards from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Session> {
        self.expired.subscribe()
    }

    /// Stop the watcher and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
