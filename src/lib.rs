//! Lighthouse beacon
//!
//! A TCP server that pushes a small status block to every connected listener
//! on a fixed interval, while an independent monitor probes an external HTTP
//! endpoint to decide what that status says.
//!
//! # Architecture
//!
//! ```text
//!   [HealthMonitor] ──probe──► fastping endpoint
//!         │
//!         ▼ replace()
//!   Arc<StatusStore> ──current()──► [Broadcaster] ──encode()──► Bytes
//!                                        │
//!   [accept loop] ──register()──► Arc<ListenerRegistry>
//!                                        │
//!                         ┌──────────────┼──────────────┐
//!                         ▼              ▼              ▼
//!                     listener       listener       listener
//! ```
//!
//! The status store and the registry are locked independently and no code
//! path holds both at once.
//!
//! # Example
//! ```no_run
//! use lighthouse::{LighthouseServer, ServerConfig};
//!
//! # async fn example() -> lighthouse::error::Result<()> {
//! let server = LighthouseServer::new(ServerConfig::default())?;
//! server.run_until(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod health;
pub mod registry;
pub mod server;
pub mod status;

pub use error::{Error, Result};
pub use health::{HealthMonitor, HealthProbe, HttpProbe, ProbeError};
pub use registry::{ListenerId, ListenerRegistry};
pub use server::{BroadcastReport, Broadcaster, LighthouseServer, ServerConfig};
pub use status::{BeaconState, ProbeResult, StatusSnapshot, StatusStore};
