//! Agent lifecycle state.

use serde::{Deserialize, Serialize};

/// The execution state of an agent run.
///
/// A run may only start from `Idle`; `Idle → Running` is the sole entry
/// transition. `Finished` and `Error` are terminal within a run — once
/// reached, the run never transitions out of them. A resumed session gets a
/// fresh context back in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    /// Waiting for a run to start
    Idle,
    /// The step loop is executing
    Running,
    /// The run completed (answer produced or budget exhausted)
    Finished,
    /// The run failed (stream timeout or unrecoverable fault)
    Error,
}

impl AgentState {
    /// Whether a run may be started from this state.
    pub fn can_start(self) -> bool {
        self == Self::Idle
    }

    /// Whether this state ends the run.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Error)
    }
}

impl Default for AgentState {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Error => "error",
        };
        write!(f, "{name}")
    }
}
