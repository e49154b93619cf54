//! Session management core module.
//!
//! A session is one open monitoring window for a process, from
//! [`SessionTracker::start`](session_tracker::SessionTracker::start) to
//! [`SessionTracker::end`](session_tracker::SessionTracker::end).

use serde::{Deserialize, Serialize};

/// Snapshot recorded when a window opens.
pub mod session;
/// The tracker owning all open sessions.
pub mod session_tracker;
/// Result record returned when a window closes.
pub mod usage_report;

/// Monitoring state of a single process identifier.
///
/// Variants:
/// - `Unmonitored`: no window is open for the identifier.
/// - `Open`: a window was started and has not been ended yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Unmonitored,
    Open,
}
