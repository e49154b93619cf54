use serde::{Deserialize, Serialize};

/// What `start` does when a window is already open for the same pid.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RestartPolicy {
    /// Discard the open window and start a new one (last start wins).
    #[default]
    Replace,
    /// Keep the open window and fail the second start.
    Reject,
}
