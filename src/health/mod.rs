//! External health probing
//!
//! A [`HealthProbe`] checks one external dependency. The [`HealthMonitor`]
//! runs it on a fixed interval and folds each outcome, together with the
//! current listener count, into a fresh status snapshot.

pub mod monitor;
pub mod probe;

pub use monitor::HealthMonitor;
pub use probe::{HealthProbe, HttpProbe, ProbeError, DEFAULT_PROBE_URL};
