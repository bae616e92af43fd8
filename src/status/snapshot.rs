//! Status snapshot types
//!
//! A snapshot is never mutated in place. Each health probe produces a new one
//! derived from the previous snapshot, which the store then swaps in.

use std::time::{SystemTime, UNIX_EPOCH};

/// Identifier used when none is configured
pub const DEFAULT_LIGHTHOUSE_ID: &str = "public-lighthouse-001";

/// Overall beacon state advertised to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeaconState {
    /// Last probe succeeded (or no probe has run yet)
    Healthy,
    /// Last probe failed or timed out
    Warning,
}

impl BeaconState {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BeaconState::Healthy => "healthy",
            BeaconState::Warning => "warning",
        }
    }
}

impl std::fmt::Display for BeaconState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the most recent external probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    /// No probe has completed yet
    Unknown,
    /// Endpoint answered within the timeout
    Ok,
    /// Request failed or timed out
    Failed,
}

impl ProbeResult {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeResult::Unknown => "unknown",
            ProbeResult::Ok => "ok",
            ProbeResult::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable status payload broadcast to every listener
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    /// Identifier of this lighthouse instance
    pub id: String,

    /// Derived beacon state
    pub state: BeaconState,

    /// Result of the last probe
    pub probe: ProbeResult,

    /// Seconds since the Unix epoch at the last update
    pub timestamp: u64,

    /// Round-trip time of the last successful probe in milliseconds
    pub latency_ms: f64,

    /// Reserved, always zero
    pub signal_age_seconds: u64,

    /// Registry size when the last probe finished
    pub listener_count: usize,
}

impl StatusSnapshot {
    /// Snapshot in effect before the first probe completes
    pub fn initial(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: BeaconState::Healthy,
            probe: ProbeResult::Unknown,
            timestamp: 0,
            latency_ms: 0.0,
            signal_age_seconds: 0,
            listener_count: 0,
        }
    }

    /// Derive the snapshot that follows a successful probe
    pub fn after_success(&self, latency_ms: f64, listener_count: usize, now: u64) -> Self {
        Self {
            id: self.id.clone(),
            state: BeaconState::Healthy,
            probe: ProbeResult::Ok,
            timestamp: self.next_timestamp(now),
            latency_ms,
            signal_age_seconds: 0,
            listener_count,
        }
    }

    /// Derive the snapshot that follows a failed or timed-out probe
    ///
    /// The previous latency is carried over unchanged.
    pub fn after_failure(&self, listener_count: usize, now: u64) -> Self {
        Self {
            id: self.id.clone(),
            state: BeaconState::Warning,
            probe: ProbeResult::Failed,
            timestamp: self.next_timestamp(now),
            latency_ms: self.latency_ms,
            signal_age_seconds: 0,
            listener_count,
        }
    }

    // A wall clock stepping backwards must not make timestamps go backwards.
    fn next_timestamp(&self, now: u64) -> u64 {
        now.max(self.timestamp)
    }
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self::initial(DEFAULT_LIGHTHOUSE_ID)
    }
}

/// Current wall-clock time in whole seconds since the Unix epoch
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot() {
        let snapshot = StatusSnapshot::initial("lh-1");

        assert_eq!(snapshot.id, "lh-1");
        assert_eq!(snapshot.state, BeaconState::Healthy);
        assert_eq!(snapshot.probe, ProbeResult::Unknown);
        assert_eq!(snapshot.timestamp, 0);
        assert_eq!(snapshot.latency_ms, 0.0);
        assert_eq!(snapshot.signal_age_seconds, 0);
        assert_eq!(snapshot.listener_count, 0);
    }

    #[test]
    fn test_default_uses_public_id() {
        assert_eq!(StatusSnapshot::default().id, DEFAULT_LIGHTHOUSE_ID);
    }

    #[test]
    fn test_success_maps_to_healthy() {
        let next = StatusSnapshot::default().after_success(12.5, 3, 1_700_000_000);

        assert_eq!(next.probe, ProbeResult::Ok);
        assert_eq!(next.state, BeaconState::Healthy);
        assert_eq!(next.latency_ms, 12.5);
        assert_eq!(next.listener_count, 3);
        assert_eq!(next.timestamp, 1_700_000_000);
    }

    #[test]
    fn test_failure_maps_to_warning_and_keeps_latency() {
        let ok = StatusSnapshot::default().after_success(15.5, 1, 100);
        let failed = ok.after_failure(2, 110);

        assert_eq!(failed.probe, ProbeResult::Failed);
        assert_eq!(failed.state, BeaconState::Warning);
        assert_eq!(failed.latency_ms, 15.5);
        assert_eq!(failed.listener_count, 2);
        assert_eq!(failed.timestamp, 110);
    }

    #[test]
    fn test_recovery_after_failure() {
        let failed = StatusSnapshot::default().after_failure(0, 100);
        let ok = failed.after_success(8.0, 0, 105);

        assert_eq!(ok.state, BeaconState::Healthy);
        assert_eq!(ok.probe, ProbeResult::Ok);
    }

    #[test]
    fn test_timestamp_never_decreases() {
        let first = StatusSnapshot::default().after_success(1.0, 0, 500);
        // Clock stepped back
        let second = first.after_failure(0, 490);
        let third = second.after_success(1.0, 0, 510);

        assert_eq!(second.timestamp, 500);
        assert_eq!(third.timestamp, 510);
    }

    #[test]
    fn test_signal_age_stays_zero() {
        let snapshot = StatusSnapshot::default()
            .after_success(1.0, 0, 10)
            .after_failure(0, 20);
        assert_eq!(snapshot.signal_age_seconds, 0);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(BeaconState::Healthy.to_string(), "healthy");
        assert_eq!(BeaconState::Warning.to_string(), "warning");
        assert_eq!(ProbeResult::Unknown.to_string(), "unknown");
        assert_eq!(ProbeResult::Ok.to_string(), "ok");
        assert_eq!(ProbeResult::Failed.to_string(), "failed");
    }

    #[test]
    fn test_unix_now_is_recent() {
        // 2020-01-01
        assert!(unix_now() > 1_577_836_800);
    }
}
