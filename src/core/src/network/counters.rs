use super::types::NetCounters;
use crate::error_handling::types::InspectionError;
use log::debug;
use sysinfo::Networks;

/// Source of system-wide cumulative network byte counters.
pub trait CounterSource: Send + Sync {
    /// Reads the current totals across all counted interfaces.
    fn counters(&self) -> Result<NetCounters, InspectionError>;
}

/// Reads interface totals through `sysinfo`.
///
/// A fresh interface list is built on every call so the reading reflects the
/// counters as of "now" rather than the last refresh.
#[derive(Debug, Clone, Default)]
pub struct SystemCounters {
    exclude_loopback: bool,
}

impl SystemCounters {
    pub fn new(exclude_loopback: bool) -> Self {
        Self { exclude_loopback }
    }
}

impl CounterSource for SystemCounters {
    fn counters(&self) -> Result<NetCounters, InspectionError> {
        let networks = Networks::new_with_refreshed_list();
        let mut totals = NetCounters::default();

        for (interface_name, data) in &networks {
            if self.exclude_loopback && is_loopback(interface_name) {
                continue;
            }
            totals.bytes_sent = totals.bytes_sent.saturating_add(data.total_transmitted());
            totals.bytes_recv = totals.bytes_recv.saturating_add(data.total_received());
        }

        debug!(
            "read system counters: sent={} recv={} (exclude_loopback={})",
            totals.bytes_sent, totals.bytes_recv, self.exclude_loopback
        );
        Ok(totals)
    }
}

fn is_loopback(interface_name: &str) -> bool {
    interface_name == "lo" || interface_name == "lo0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_loopback() {
        assert!(is_loopback("lo"));
        assert!(is_loopback("lo0"));
        assert!(!is_loopback("eth0"));
        assert!(!is_loopback("wlo1"));
    }

    #[test]
    fn test_system_counters_read() {
        // Sandboxed environments may expose no interfaces at all; the read
        // itself must still succeed.
        let source = SystemCounters::new(false);
        assert!(source.counters().is_ok());
    }

    #[test]
    fn test_excluding_loopback_never_exceeds_total() {
        let without_lo = SystemCounters::new(true).counters().unwrap();
        // Counters keep moving, so compare against a later full reading.
        let all = SystemCounters::new(false).counters().unwrap();
        assert!(without_lo.bytes_recv <= all.bytes_recv);
        assert!(without_lo.bytes_sent <= all.bytes_sent);
    }
}
