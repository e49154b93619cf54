use serde::{Deserialize, Serialize};
use std::time::Duration;

const BYTES_PER_KB: f64 = 1024.0;

/// Network usage measured over one closed monitoring window.
///
/// Byte counts are exact. Kilobyte and duration values are rounded to two
/// decimal places, half away from zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageReport {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub sent_kb: f64,
    pub recv_kb: f64,
    pub total_kb: f64,
    /// Connections held at end time, not a delta.
    pub connections: usize,
    /// Seconds between start and end.
    pub duration: f64,
}

impl UsageReport {
    pub fn from_deltas(
        bytes_sent: u64,
        bytes_recv: u64,
        connections: usize,
        elapsed: Duration,
    ) -> Self {
        // Sum in u128 so the total cannot overflow before conversion.
        let total_bytes = bytes_sent as u128 + bytes_recv as u128;
        Self {
            bytes_sent,
            bytes_recv,
            sent_kb: round2(bytes_sent as f64 / BYTES_PER_KB),
            recv_kb: round2(bytes_recv as f64 / BYTES_PER_KB),
            total_kb: round2(total_bytes as f64 / BYTES_PER_KB),
            connections,
            duration: round2(elapsed.as_secs_f64()),
        }
    }

    /// Returns a summary string suitable for logging or CLI display.
    ///
    /// # Example output
    /// ```text
    /// sent 12.5 KB, received 340.12 KB, total 352.62 KB, 3 connections, 1.02 s
    /// ```
    pub fn summary(&self) -> String {
        format!(
            "sent {} KB, received {} KB, total {} KB, {} connections, {} s",
            self.sent_kb, self.recv_kb, self.total_kb, self.connections, self.duration
        )
    }
}

/// Rounds to two decimal places, half away from zero.
///
/// Ties that are exact in binary round up here, where Python's `round` sends
/// them to the even neighbour: 128 bytes is 0.13 KB, not 0.12 KB.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
