//! Periodic health monitor
//!
//! Each cycle runs one bounded probe, reads the listener count, and installs
//! a new snapshot. A failing probe degrades the advertised state; it never
//! stops the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::probe::{HealthProbe, ProbeError};
use crate::registry::ListenerRegistry;
use crate::status::{unix_now, StatusSnapshot, StatusStore};

/// Drives a [`HealthProbe`] and publishes the results to a [`StatusStore`]
pub struct HealthMonitor<P: HealthProbe> {
    probe: Arc<P>,
    store: Arc<StatusStore>,
    registry: Arc<ListenerRegistry>,
    interval: Duration,
    timeout: Duration,
}

impl<P: HealthProbe> HealthMonitor<P> {
    /// Create a monitor
    ///
    /// `timeout` bounds every probe call regardless of what the probe itself
    /// enforces.
    pub fn new(
        probe: Arc<P>,
        store: Arc<StatusStore>,
        registry: Arc<ListenerRegistry>,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            probe,
            store,
            registry,
            interval,
            timeout,
        }
    }

    /// Run a single probe cycle and return the snapshot it installed
    pub async fn check_once(&self) -> Arc<StatusSnapshot> {
        let outcome = match tokio::time::timeout(self.timeout, self.probe.probe()).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        };

        // Registry lock is released before the store lock is taken.
        let listeners = self.registry.len().await;
        let now = unix_now();

        match outcome {
            Ok(latency) => {
                let latency_ms = latency.as_micros() as f64 / 1000.0;
                tracing::debug!(latency_ms, listeners, "Health probe succeeded");
                self.store
                    .update(|prev| prev.after_success(latency_ms, listeners, now))
                    .await
            }
            Err(e) => {
                tracing::warn!(error = %e, listeners, "Health probe failed");
                self.store
                    .update(|prev| prev.after_failure(listeners, now))
                    .await
            }
        }
    }

    /// Probe on every interval tick until `cancel` fires
    ///
    /// The first probe runs immediately.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = self.check_once() => {}
            }
        }

        tracing::debug!("Health monitor stopped");
    }

    /// Spawn [`run`](Self::run) as a background task
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }
}
