//! Status broadcaster
//!
//! Every cycle encodes the current snapshot once and writes the same bytes
//! to all registered listeners in parallel. Listeners whose write fails or
//! misses the write deadline are pruned after the pass.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::registry::{ListenerId, ListenerRegistry};
use crate::status::{encode, StatusStore};

/// Outcome of one broadcast cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Listeners that received the full payload
    pub delivered: usize,
    /// Listeners removed because their write failed
    pub dropped: usize,
}

/// Periodic fan-out of the current status to all listeners
pub struct Broadcaster {
    store: Arc<StatusStore>,
    registry: Arc<ListenerRegistry>,
    interval: Duration,
    write_timeout: Duration,
}

impl Broadcaster {
    /// Create a broadcaster
    pub fn new(
        store: Arc<StatusStore>,
        registry: Arc<ListenerRegistry>,
        interval: Duration,
        write_timeout: Duration,
    ) -> Self {
        Self {
            store,
            registry,
            interval,
            write_timeout,
        }
    }

    /// Run one broadcast cycle
    ///
    /// Every listener registered when the cycle starts either receives the
    /// payload or is removed before this returns. Listeners registered while
    /// the cycle is running wait for the next one.
    pub async fn broadcast_once(&self) -> BroadcastReport {
        let snapshot = self.store.current().await;
        let payload = match encode(&*snapshot) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode status block, skipping cycle");
                return BroadcastReport::default();
            }
        };
        let listeners = self.registry.snapshot().await;

        if listeners.is_empty() {
            return BroadcastReport::default();
        }

        let mut writes = JoinSet::new();
        for listener in listeners {
            let payload = payload.clone();
            let deadline = self.write_timeout;
            writes.spawn(async move {
                let result = listener.send(&payload, deadline).await;
                (listener.id, listener.peer_addr, result)
            });
        }

        let mut delivered = 0;
        let mut failed: Vec<ListenerId> = Vec::new();
        while let Some(joined) = writes.join_next().await {
            match joined {
                Ok((_, _, Ok(()))) => delivered += 1,
                Ok((id, peer, Err(e))) => {
                    tracing::debug!(listener = %id, peer = %peer, error = %e, "Write failed");
                    failed.push(id);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Broadcast write task failed");
                }
            }
        }

        let dropped = self.registry.remove_all(&failed).await;

        if delivered > 0 || dropped > 0 {
            tracing::info!(delivered, dropped, "Broadcast status");
        }

        BroadcastReport { delivered, dropped }
    }

    /// Broadcast on every interval tick until `cancel` fires
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; the first broadcast waits one period.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.broadcast_once().await;
                }
            }
        }

        tracing::debug!("Broadcaster stopped");
    }

    /// Spawn [`run`](Self::run) as a background task
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }
}
