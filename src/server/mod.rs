//! Lighthouse server
//!
//! The accept loop, the periodic broadcaster, and the configuration that
//! ties them to the health monitor.

pub mod broadcaster;
pub mod config;
pub mod listener;

pub use broadcaster::{BroadcastReport, Broadcaster};
pub use config::{ServerConfig, DEFAULT_PORT, DEFAULT_WELCOME_MESSAGE};
pub use listener::LighthouseServer;
