//! OS-facing network introspection.
//!
//! The session tracker never talks to the operating system directly. It goes
//! through two collaborators defined here:
//!
//! - [`CounterSource`]: system-wide cumulative bytes sent/received.
//! - [`ConnectionSource`]: number of inet sockets held by a process.
//!
//! Both are traits so the tracker can be driven by scripted sources in tests.
//! [`bounded::run_bounded`] puts a wall-clock limit on any of these queries.

/// Wall-clock bound around blocking OS queries.
pub mod bounded;
/// Per-process connection enumeration.
pub mod connections;
/// System-wide byte counters.
pub mod counters;
#[cfg(test)]
pub mod fakes;
/// Snapshot value types.
pub mod types;

pub use connections::{ConnectionSource, ProcConnections};
pub use counters::{CounterSource, SystemCounters};
pub use types::NetCounters;
