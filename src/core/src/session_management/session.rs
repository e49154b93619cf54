use chrono::{DateTime, Utc};
use std::time::Instant;

/// Snapshot taken by `start` for one monitored process.
#[derive(Debug, Clone)]
pub struct Session {
    pub pid: u32,
    /// Monotonic start point, used for the reported duration.
    pub started: Instant,
    /// Wall-clock start, for logs and display only.
    pub started_at: DateTime<Utc>,
    pub bytes_sent_before: u64,
    pub bytes_recv_before: u64,
    /// Informational; `end` reports the connection count at end time instead.
    pub connections_at_start: usize,
}
