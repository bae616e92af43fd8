//! Listener registry implementation

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::entry::{Listener, ListenerId};

/// Set of currently connected listeners
///
/// Thread-safe via `RwLock`. Count queries and broadcast snapshots take the
/// read lock; registration and pruning take the write lock only long enough
/// to touch the map.
#[derive(Debug)]
pub struct ListenerRegistry {
    listeners: RwLock<HashMap<ListenerId, Arc<Listener>>>,
}

impl ListenerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Take ownership of a listener
    ///
    /// Returns a shared handle to the registered entry. Closed listeners are
    /// never inserted.
    pub async fn register(&self, listener: Listener) -> Option<Arc<Listener>> {
        if listener.is_closed() {
            return None;
        }

        let listener = Arc::new(listener);
        let count = {
            let mut listeners = self.listeners.write().await;
            listeners.insert(listener.id, Arc::clone(&listener));
            listeners.len()
        };

        tracing::info!(
            listener = %listener.id,
            peer = %listener.peer_addr,
            listeners = count,
            "Listener registered"
        );

        Some(listener)
    }

    /// Stable copy of the current listeners
    ///
    /// Listeners registered after this call are not part of the returned set.
    pub async fn snapshot(&self) -> Vec<Arc<Listener>> {
        self.listeners.read().await.values().cloned().collect()
    }

    /// Remove and close a single listener
    pub async fn remove(&self, id: ListenerId) -> bool {
        self.remove_all(&[id]).await == 1
    }

    /// Remove and close every listener in `ids`
    ///
    /// Returns how many were actually present. Sockets are shut down after
    /// the map lock is released.
    pub async fn remove_all(&self, ids: &[ListenerId]) -> usize {
        if ids.is_empty() {
            return 0;
        }

        let removed: Vec<Arc<Listener>> = {
            let mut listeners = self.listeners.write().await;
            ids.iter().filter_map(|id| listeners.remove(id)).collect()
        };

        for listener in &removed {
            listener.close().await;
            tracing::info!(
                listener = %listener.id,
                peer = %listener.peer_addr,
                connected_secs = listener.connected_for().as_secs(),
                "Listener disconnected"
            );
        }

        removed.len()
    }

    /// Close every registered listener and empty the registry
    pub async fn close_all(&self) -> usize {
        let drained: Vec<Arc<Listener>> = {
            let mut listeners = self.listeners.write().await;
            listeners.drain().map(|(_, listener)| listener).collect()
        };

        for listener in &drained {
            listener.close().await;
        }

        if !drained.is_empty() {
            tracing::info!(listeners = drained.len(), "Closed all listeners");
        }

        drained.len()
    }

    /// Whether a listener is currently registered
    pub async fn contains(&self, id: ListenerId) -> bool {
        self.listeners.read().await.contains_key(&id)
    }

    /// Number of registered listeners
    pub async fn len(&self) -> usize {
        self.listeners.read().await.len()
    }

    /// Whether no listeners are registered
    pub async fn is_empty(&self) -> bool {
        self.listeners.read().await.is_empty()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
