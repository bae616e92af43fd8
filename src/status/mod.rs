//! Beacon status
//!
//! The single current [`StatusSnapshot`], the [`StatusStore`] that holds it,
//! and the encoder that turns it into the text block sent to listeners.

pub mod encoder;
pub mod snapshot;
pub mod store;

pub use encoder::{encode, LIGHTHOUSE_TYPE};
pub use snapshot::{unix_now, BeaconState, ProbeResult, StatusSnapshot, DEFAULT_LIGHTHOUSE_ID};
pub use store::StatusStore;
