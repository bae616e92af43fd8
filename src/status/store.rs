//! Status store
//!
//! Holds the one current snapshot. Writers swap in a whole new
//! `Arc<StatusSnapshot>`, so readers only ever see complete snapshots and
//! never hold the lock while they encode or write.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::snapshot::StatusSnapshot;

/// Shared holder of the current status snapshot
#[derive(Debug)]
pub struct StatusStore {
    current: RwLock<Arc<StatusSnapshot>>,
}

impl StatusStore {
    /// Create a store seeded with the given snapshot
    pub fn new(initial: StatusSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// Create a store seeded with the pre-probe snapshot for `id`
    pub fn with_id(id: impl Into<String>) -> Self {
        Self::new(StatusSnapshot::initial(id))
    }

    /// Get the current snapshot
    pub async fn current(&self) -> Arc<StatusSnapshot> {
        Arc::clone(&*self.current.read().await)
    }

    /// Replace the current snapshot
    pub async fn replace(&self, snapshot: StatusSnapshot) {
        *self.current.write().await = Arc::new(snapshot);
    }

    /// Derive a new snapshot from the current one and install it
    ///
    /// The read of the previous snapshot and the swap happen under one write
    /// lock, so concurrent updates cannot interleave.
    pub async fn update<F>(&self, f: F) -> Arc<StatusSnapshot>
    where
        F: FnOnce(&StatusSnapshot) -> StatusSnapshot,
    {
        let mut current = self.current.write().await;
        let next = Arc::new(f(&current));
        *current = Arc::clone(&next);
        next
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new(StatusSnapshot::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::snapshot::ProbeResult;

    #[tokio::test]
    async fn test_initial_snapshot() {
        let store = StatusStore::with_id("lh-test");
        let current = store.current().await;

        assert_eq!(current.id, "lh-test");
        assert_eq!(current.probe, ProbeResult::Unknown);
    }

    #[tokio::test]
    async fn test_replace() {
        let store = StatusStore::default();
        let next = StatusSnapshot::default().after_failure(7, 42);

        store.replace(next.clone()).await;

        assert_eq!(*store.current().await, next);
    }

    #[tokio::test]
    async fn test_update_derives_from_previous() {
        let store = StatusStore::default();

        store.update(|prev| prev.after_success(9.0, 1, 100)).await;
        let updated = store.update(|prev| prev.after_failure(1, 105)).await;

        assert_eq!(updated.latency_ms, 9.0);
        assert_eq!(updated.probe, ProbeResult::Failed);
        assert_eq!(*store.current().await, *updated);
    }

    #[tokio::test]
    async fn test_readers_keep_old_snapshot() {
        let store = StatusStore::default();
        let before = store.current().await;

        store.update(|prev| prev.after_success(1.0, 5, 100)).await;

        // An outstanding reader is unaffected by the swap
        assert_eq!(before.listener_count, 0);
        assert_eq!(store.current().await.listener_count, 5);
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_serialized() {
        let store = Arc::new(StatusStore::default());
        let mut handles = Vec::new();

        for i in 0..16u64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.update(|prev| prev.after_success(1.0, 0, 1000 + i)).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.current().await.timestamp, 1015);
    }
}
