//! # netusage
//!
//! Measures the network activity of a process over an explicit window:
//! bytes sent and received (system-wide), active connections held by the
//! process, and elapsed time.
//!
//! ```no_run
//! use netusage::configuration::Config;
//! use netusage::session_management::session_tracker::SessionTracker;
//!
//! let tracker = SessionTracker::new(&Config::default());
//! let pid = std::process::id();
//!
//! tracker.start(pid)?;
//! // ... network activity ...
//! let report = tracker.end(pid)?;
//! println!("{}", report.summary());
//! # Ok::<(), netusage::error_handling::types::MonitorError>(())
//! ```

pub mod configuration;
pub mod controller;
pub mod error_handling;
pub mod network;
pub mod session_management;

pub use configuration::Config;
pub use error_handling::types::{InspectionError, MonitorError};
pub use session_management::session_tracker::SessionTracker;
pub use session_management::usage_report::UsageReport;
pub use session_management::SessionStatus;
