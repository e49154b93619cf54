//! Command-line operations built on the session tracker.

pub mod controller_handler;

pub use controller_handler::{render, Controller, OutputFormat, ProgramRun};
