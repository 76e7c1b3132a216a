//! Pipeline run status enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifecycle state of one pipeline run.
///
/// `Building -> Running -> {Succeeded, Failed, Cancelled}`. The terminal
/// states all release the run's cancellation token; `Failed` and
/// `Cancelled` differ only in whether an error was seen before the merged
/// error stream drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// Stages are being instantiated and wired.
    Building,
    /// The run is draining the merged error stream.
    Running,
    /// Every stage finished without reporting an error.
    Succeeded,
    /// A stage reported an error before the drain completed.
    Failed,
    /// The run was cancelled before any error was seen.
    Cancelled,
}

impl PipelineStatus {
    /// Returns whether this status ends the run.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

impl Default for PipelineStatus {
    fn default() -> Self {
        Self::Building
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Building => write!(f, "building"),
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}
