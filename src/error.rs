//! Error types
//!
//! Only startup failures surface as errors. Everything that can go wrong
//! once the server is running (accept failures, probe failures, dead
//! listeners) is handled inside the task that hit it.

use std::net::SocketAddr;

/// Result alias for fallible lighthouse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal lighthouse errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The listening socket could not be created, bound or put into listen mode
    #[error("failed to bind listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client used for health probes could not be built
    #[error("failed to build health probe client: {0}")]
    ProbeClient(String),

    /// Any other I/O failure during startup
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
