use crate::configuration::config::Config;
use crate::configuration::types::RestartPolicy;
use crate::error_handling::types::{InspectionError, MonitorError};
use crate::network::bounded::run_bounded;
use crate::network::{
    ConnectionSource, CounterSource, NetCounters, ProcConnections, SystemCounters,
};
use crate::session_management::session::Session;
use crate::session_management::usage_report::UsageReport;
use crate::session_management::SessionStatus;
use chrono::Utc;
use log::{debug, error, info, warn};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Tracks open network monitoring windows, keyed by process identifier.
///
/// Each `start(pid)` records a snapshot of the system-wide byte counters, and
/// the matching `end(pid)` takes a second snapshot, removes the session and
/// returns the deltas as a [`UsageReport`].
///
/// The tracker is an explicit value: construct one and share it (for example
/// behind an `Arc`) with every caller that needs it. All access to the session
/// map goes through a single mutex, so sessions for different identifiers can
/// be opened and closed from different threads.
///
/// # Fields Overview
///
/// - `sessions`: open sessions, at most one per pid
/// - `counters`: source of system-wide byte counters
/// - `connections`: source of per-process connection counts
/// - `restart_policy`: what a second `start` for an open pid does
/// - `query_timeout`: upper bound on each OS query
pub struct SessionTracker {
    sessions: Mutex<HashMap<u32, Session>>,
    counters: Arc<dyn CounterSource>,
    connections: Arc<dyn ConnectionSource>,
    restart_policy: RestartPolicy,
    query_timeout: Duration,
}

impl SessionTracker {
    /// Creates a tracker reading the operating system's own counters.
    pub fn new(config: &Config) -> Self {
        Self::with_sources(
            config,
            Arc::new(SystemCounters::new(config.exclude_loopback)),
            Arc::new(ProcConnections::new()),
        )
    }

    pub fn with_sources(
        config: &Config,
        counters: Arc<dyn CounterSource>,
        connections: Arc<dyn ConnectionSource>,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            counters,
            connections,
            restart_policy: config.restart_policy,
            query_timeout: config.query_timeout(),
        }
    }

    /// Opens a monitoring window for `pid`.
    ///
    /// Under [`RestartPolicy::Replace`] an already open window for the same pid
    /// is discarded and the new one wins. Under [`RestartPolicy::Reject`] the
    /// call fails with `AlreadyStarted` and the open window is kept.
    ///
    /// Fails with `CountersUnavailable` if the byte counters cannot be read, in
    /// which case nothing is recorded.
    pub fn start(&self, pid: u32) -> Result<(), MonitorError> {
        let before = self.read_counters()?;
        let connections_at_start = self.connection_count(pid);

        let session = Session {
            pid,
            started: Instant::now(),
            started_at: Utc::now(),
            bytes_sent_before: before.bytes_sent,
            bytes_recv_before: before.bytes_recv,
            connections_at_start,
        };

        let mut sessions = self.lock_sessions();
        match sessions.entry(pid) {
            Entry::Occupied(mut entry) => match self.restart_policy {
                RestartPolicy::Replace => {
                    warn!(
                        "monitoring restarted for pid {}, discarding window opened at {}",
                        pid,
                        entry.get().started_at.to_rfc3339()
                    );
                    entry.insert(session);
                }
                RestartPolicy::Reject => {
                    warn!("rejected second start for pid {}", pid);
                    return Err(MonitorError::AlreadyStarted(pid));
                }
            },
            Entry::Vacant(entry) => {
                entry.insert(session);
            }
        }

        info!(
            "monitoring started for pid {} (sent={} recv={} connections={})",
            pid, before.bytes_sent, before.bytes_recv, connections_at_start
        );
        Ok(())
    }

    /// Closes the monitoring window for `pid` and reports what happened in it.
    ///
    /// Fails with `NotStarted` if no window is open, leaving the tracker
    /// untouched. Once a window is found it is removed regardless of whether
    /// the end snapshot succeeds.
    pub fn end(&self, pid: u32) -> Result<UsageReport, MonitorError> {
        let session = match self.lock_sessions().remove(&pid) {
            Some(session) => session,
            None => return Err(MonitorError::NotStarted(pid)),
        };

        let after = self.read_counters()?;
        let connections = self.connection_count(pid);
        let elapsed = session.started.elapsed();

        let bytes_sent =
            counter_delta(pid, "bytes_sent", session.bytes_sent_before, after.bytes_sent)?;
        let bytes_recv =
            counter_delta(pid, "bytes_recv", session.bytes_recv_before, after.bytes_recv)?;

        let report = UsageReport::from_deltas(bytes_sent, bytes_recv, connections, elapsed);
        info!("monitoring ended for pid {}: {}", pid, report.summary());
        Ok(report)
    }

    /// Number of inet connections currently held by `pid`.
    ///
    /// Never fails: a process that is gone or cannot be inspected counts as
    /// zero. Use [`SessionTracker::try_connection_count`] to see the reason.
    pub fn connection_count(&self, pid: u32) -> usize {
        match self.try_connection_count(pid) {
            Ok(count) => count,
            Err(e) => {
                debug!("connection count for pid {} treated as 0: {}", pid, e);
                0
            }
        }
    }

    pub fn try_connection_count(&self, pid: u32) -> Result<usize, InspectionError> {
        let source = Arc::clone(&self.connections);
        run_bounded(self.query_timeout, move || source.connections(pid))
    }

    pub fn status(&self, pid: u32) -> SessionStatus {
        if self.is_active(pid) {
            SessionStatus::Open
        } else {
            SessionStatus::Unmonitored
        }
    }

    pub fn is_active(&self, pid: u32) -> bool {
        self.lock_sessions().contains_key(&pid)
    }

    pub fn active_session_count(&self) -> usize {
        self.lock_sessions().len()
    }

    /// Identifiers with an open window, in ascending order.
    pub fn active_pids(&self) -> Vec<u32> {
        let mut pids: Vec<u32> = self.lock_sessions().keys().copied().collect();
        pids.sort_unstable();
        pids
    }

    /// Drops the window for `pid` without measuring it.
    pub fn abandon(&self, pid: u32) -> Option<Session> {
        let session = self.lock_sessions().remove(&pid);
        if session.is_some() {
            debug!("monitoring abandoned for pid {}", pid);
        }
        session
    }

    /// Ends every open window, returning one outcome per pid in ascending order.
    pub fn shutdown_all(&self) -> Vec<(u32, Result<UsageReport, MonitorError>)> {
        self.active_pids()
            .into_iter()
            .map(|pid| (pid, self.end(pid)))
            .collect()
    }

    fn read_counters(&self) -> Result<NetCounters, MonitorError> {
        let source = Arc::clone(&self.counters);
        run_bounded(self.query_timeout, move || source.counters()).map_err(|e| {
            error!("failed to read network counters: {}", e);
            MonitorError::CountersUnavailable(e)
        })
    }

    // The map only holds plain values, so a panic while it was locked cannot
    // leave it half-updated.
    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<u32, Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn counter_delta(
    pid: u32,
    counter: &'static str,
    before: u64,
    after: u64,
) -> Result<u64, MonitorError> {
    after.checked_sub(before).ok_or_else(|| {
        error!(
            "{} counter went backwards for pid {} ({} -> {})",
            counter, pid, before, after
        );
        MonitorError::CounterReset {
            pid,
            counter,
            before,
            after,
        }
    })
}
