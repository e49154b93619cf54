use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    NotInRange(String),
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
            ConfigError::InvalidValue(e) => write!(f, "Invalid value: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlError(err.to_string())
    }
}

/// Why an OS-level inspection (byte counters or connection table) did not
/// produce a value.
#[derive(Debug, Clone, PartialEq)]
pub enum InspectionError {
    NoSuchProcess(u32),
    AccessDenied(u32),
    TimedOut(Duration),
    Unsupported,
    Other(String),
}

impl fmt::Display for InspectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectionError::NoSuchProcess(pid) => write!(f, "No such process: {}", pid),
            InspectionError::AccessDenied(pid) => {
                write!(f, "Access denied while inspecting process {}", pid)
            }
            InspectionError::TimedOut(timeout) => {
                write!(f, "Query timed out after {} ms", timeout.as_millis())
            }
            InspectionError::Unsupported => {
                write!(f, "Inspection not supported on this platform")
            }
            InspectionError::Other(e) => write!(f, "Inspection failed: {}", e),
        }
    }
}

impl std::error::Error for InspectionError {}

/// Errors surfaced by the session tracker.
///
/// `NotStarted` is a protocol violation by the caller. The remaining variants
/// come from the byte-counter source, which has no fallback value.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorError {
    NotStarted(u32),
    AlreadyStarted(u32),
    CountersUnavailable(InspectionError),
    CounterReset {
        pid: u32,
        counter: &'static str,
        before: u64,
        after: u64,
    },
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::NotStarted(pid) => {
                write!(f, "Monitoring was not started for PID {}", pid)
            }
            MonitorError::AlreadyStarted(pid) => {
                write!(f, "Monitoring is already running for PID {}", pid)
            }
            MonitorError::CountersUnavailable(e) => {
                write!(f, "Network counters unavailable: {}", e)
            }
            MonitorError::CounterReset {
                pid,
                counter,
                before,
                after,
            } => write!(
                f,
                "Counter {} went backwards during session for PID {} ({} -> {})",
                counter, pid, before, after
            ),
        }
    }
}

impl std::error::Error for MonitorError {}

#[derive(Debug)]
pub enum ControllerError {
    ConfigurationError(ConfigError),
    MonitorError(MonitorError),
    SpawnFailed(std::io::Error),
    WaitFailed(std::io::Error),
    ProcessExited,
    SignalError(std::io::Error),
    OutputError(String),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            ControllerError::MonitorError(e) => write!(f, "Monitoring error: {}", e),
            ControllerError::SpawnFailed(e) => write!(f, "Failed to spawn program: {}", e),
            ControllerError::WaitFailed(e) => write!(f, "Failed to wait for program: {}", e),
            ControllerError::ProcessExited => {
                write!(f, "Program exited before monitoring could start")
            }
            ControllerError::SignalError(e) => write!(f, "Signal handling error: {}", e),
            ControllerError::OutputError(e) => write!(f, "Output error: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<ConfigError> for ControllerError {
    fn from(err: ConfigError) -> Self {
        ControllerError::ConfigurationError(err)
    }
}

impl From<MonitorError> for ControllerError {
    fn from(err: MonitorError) -> Self {
        ControllerError::MonitorError(err)
    }
}
