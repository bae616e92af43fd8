//! Status block encoder
//!
//! Turns a [`StatusSnapshot`] into the text block written to listeners: a
//! pretty-printed JSON object with a fixed field order, followed by a blank
//! line so line-oriented readers can split blocks.

use bytes::Bytes;
use serde::Serialize;

use super::snapshot::StatusSnapshot;

/// Constant type tag carried by every status block
pub const LIGHTHOUSE_TYPE: &str = "PUBLIC_INTERNET_BEACON";

const BLOCK_TERMINATOR: &[u8] = b"\n\n";

/// Wire layout of a status block. Field order here is the order on the wire.
#[derive(Serialize)]
struct StatusBlock<'a> {
    lighthouse_id: &'a str,
    timestamp: u64,
    status: &'static str,
    fastping_status: &'static str,
    ping_latency_ms: f64,
    signal_age_seconds: u64,
    connected_listeners: usize,
    lighthouse_type: &'static str,
}

impl<'a> From<&'a StatusSnapshot> for StatusBlock<'a> {
    fn from(snapshot: &'a StatusSnapshot) -> Self {
        Self {
            lighthouse_id: &snapshot.id,
            timestamp: snapshot.timestamp,
            status: snapshot.state.as_str(),
            fastping_status: snapshot.probe.as_str(),
            ping_latency_ms: snapshot.latency_ms,
            signal_age_seconds: snapshot.signal_age_seconds,
            connected_listeners: snapshot.listener_count,
            lighthouse_type: LIGHTHOUSE_TYPE,
        }
    }
}

/// Encode a snapshot into its wire form
///
/// Deterministic: the same snapshot always yields the same bytes. The
/// identifier is JSON-escaped, so control characters in it cannot split
/// the block.
pub fn encode(snapshot: &StatusSnapshot) -> serde_json::Result<Bytes> {
    let mut buf = serde_json::to_vec_pretty(&StatusBlock::from(snapshot))?;
    buf.extend_from_slice(BLOCK_TERMINATOR);
    Ok(Bytes::from(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::snapshot::{BeaconState, ProbeResult};

    fn sample() -> StatusSnapshot {
        StatusSnapshot {
            id: "public-lighthouse-001".to_string(),
            state: BeaconState::Healthy,
            probe: ProbeResult::Ok,
            timestamp: 1_700_000_000,
            latency_ms: 15.5,
            signal_age_seconds: 0,
            listener_count: 2,
        }
    }

    #[test]
    fn test_golden_output() {
        let encoded = encode(&sample()).unwrap();

        let expected = "{\n  \"lighthouse_id\": \"public-lighthouse-001\",\n  \"timestamp\": 1700000000,\n  \"status\": \"healthy\",\n  \"fastping_status\": \"ok\",\n  \"ping_latency_ms\": 15.5,\n  \"signal_age_seconds\": 0,\n  \"connected_listeners\": 2,\n  \"lighthouse_type\": \"PUBLIC_INTERNET_BEACON\"\n}\n\n";
        assert_eq!(std::str::from_utf8(&encoded).unwrap(), expected);
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let snapshot = sample();
        assert_eq!(encode(&snapshot).unwrap(), encode(&snapshot).unwrap());
    }

    #[test]
    fn test_failed_probe_fields() {
        let snapshot = StatusSnapshot::default().after_failure(4, 10);
        let text = String::from_utf8(encode(&snapshot).unwrap().to_vec()).unwrap();

        assert!(text.contains("\"status\": \"warning\""));
        assert!(text.contains("\"fastping_status\": \"failed\""));
        assert!(text.contains("\"connected_listeners\": 4"));
    }

    #[test]
    fn test_unknown_probe_before_first_update() {
        let text = String::from_utf8(encode(&StatusSnapshot::default()).unwrap().to_vec()).unwrap();
        assert!(text.contains("\"fastping_status\": \"unknown\""));
        assert!(text.contains("\"timestamp\": 0,"));
    }

    #[test]
    fn test_block_ends_with_blank_line() {
        let encoded = encode(&sample()).unwrap();
        assert!(encoded.ends_with(b"}\n\n"));
    }

    #[test]
    fn test_field_order_is_stable() {
        let text = String::from_utf8(encode(&sample()).unwrap().to_vec()).unwrap();
        let keys = [
            "lighthouse_id",
            "timestamp",
            "status",
            "fastping_status",
            "ping_latency_ms",
            "signal_age_seconds",
            "connected_listeners",
            "lighthouse_type",
        ];

        let positions: Vec<usize> = keys
            .iter()
            .map(|k| text.find(&format!("\"{}\":", k)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_control_characters_in_id_are_escaped() {
        let mut snapshot = sample();
        snapshot.id = "evil\nid\u{7}".to_string();

        let text = String::from_utf8(encode(&snapshot).unwrap().to_vec()).unwrap();

        assert!(text.contains("\"lighthouse_id\": \"evil\\nid\\u0007\""));
        // Only the object's own line breaks plus the terminator
        assert_eq!(text.matches('\n').count(), 11);
    }

    #[test]
    fn test_non_finite_latency_still_encodes() {
        let mut snapshot = sample();
        snapshot.latency_ms = f64::NAN;

        let text = String::from_utf8(encode(&snapshot).unwrap().to_vec()).unwrap();

        assert!(text.contains("\"ping_latency_ms\": null,"));
        assert!(text.ends_with("}\n\n"));
    }
}
