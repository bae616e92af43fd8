//! Listener entry
//!
//! One accepted connection. Writes go through the entry's own mutex so two
//! tasks never write to the same socket at once.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

/// Identifier assigned to a listener when it is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A connected listener
#[derive(Debug)]
pub struct Listener {
    /// Unique listener ID
    pub id: ListenerId,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// When the connection was accepted
    pub connected_at: Instant,

    stream: Mutex<TcpStream>,

    closed: AtomicBool,
}

impl Listener {
    /// Wrap an accepted stream
    pub fn new(id: ListenerId, stream: TcpStream, peer_addr: SocketAddr) -> Self {
        Self {
            id,
            peer_addr,
            connected_at: Instant::now(),
            stream: Mutex::new(stream),
            closed: AtomicBool::new(false),
        }
    }

    /// Write `payload` in full, giving up after `deadline`
    ///
    /// A write that does not finish in time is reported as
    /// [`io::ErrorKind::TimedOut`]. Writing to a closed listener fails with
    /// [`io::ErrorKind::NotConnected`].
    pub async fn send(&self, payload: &[u8], deadline: Duration) -> io::Result<()> {
        if self.is_closed() {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "listener already closed",
            ));
        }

        let mut stream = self.stream.lock().await;
        match tokio::time::timeout(deadline, stream.write_all(payload)).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "write deadline exceeded",
            )),
        }
    }

    /// Shut down the write half and mark the listener closed
    ///
    /// Closing is terminal. The socket itself is released when the last
    /// reference to the listener is dropped.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let mut stream = self.stream.lock().await;
        if let Err(e) = stream.shutdown().await {
            tracing::trace!(listener = %self.id, error = %e, "Shutdown on closed socket");
        }
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Time since the connection was accepted
    pub fn connected_for(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
