//! Listener registry
//!
//! Tracks every open listener connection. The accept loop inserts, the
//! broadcaster removes listeners whose writes fail, and the health monitor
//! reads the count.
//!
//! # Locking
//!
//! ```text
//!            Arc<ListenerRegistry>
//!       ┌──────────────────────────────┐
//!       │ listeners: RwLock<HashMap<   │
//!       │   ListenerId,                │
//!       │   Arc<Listener {             │
//!       │     stream: Mutex<TcpStream> │
//!       │   }>                         │
//!       │ >>                           │
//!       └──────────────┬───────────────┘
//!                      │ snapshot() clones the Arcs, lock released
//!                      ▼
//!       [Broadcaster] send() on each Listener, per-listener Mutex only
//!                      │
//!                      ▼ remove_all(failed)
//! ```
//!
//! The map lock is never held across a socket write, and a listener's
//! stream lock is never taken while the map lock is held.

pub mod entry;
pub mod store;

pub use entry::{Listener, ListenerId};
pub use store::ListenerRegistry;
