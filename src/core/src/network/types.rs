use serde::{Deserialize, Serialize};

/// System-wide cumulative network byte counters read at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

impl NetCounters {
    pub fn new(bytes_sent: u64, bytes_recv: u64) -> Self {
        Self {
            bytes_sent,
            bytes_recv,
        }
    }
}
