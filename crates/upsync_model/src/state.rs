//! Run status state machine.

use serde::{Deserialize, Serialize};

/// Status of a single sync-up run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    /// Run has been created but not started.
    New,
    /// Run is in progress.
    Running,
    /// Run completed and the caller finalized it.
    Done,
    /// Run aborted on an error.
    Failed,
    /// Run exited on a stop request.
    Stopped,
}

impl SyncStatus {
    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncStatus::Done | SyncStatus::Failed | SyncStatus::Stopped)
    }

    /// Returns true if the run is in progress.
    pub fn is_running(&self) -> bool {
        *self == SyncStatus::Running
    }

    /// Returns true if moving to `next` is a legal transition.
    ///
    /// Legal transitions are `New → Running` and `Running → {Done, Failed,
    /// Stopped}`. Terminal statuses accept nothing.
    pub fn can_transition_to(&self, next: SyncStatus) -> bool {
        match self {
            SyncStatus::New => next == SyncStatus::Running,
            SyncStatus::Running => next.is_terminal(),
            _ => false,
        }
    }
}

/// Mutable state of one sync-up run.
///
/// Created at run start and mutated only by the orchestrator. Progress is
/// non-decreasing; regressions are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRunState {
    /// Current status.
    pub status: SyncStatus,
    /// Percent complete, in `[0, 100]`.
    pub progress: u8,
}

impl SyncRunState {
    /// Creates a fresh, not-yet-started run state.
    pub fn new() -> Self {
        Self {
            status: SyncStatus::New,
            progress: 0,
        }
    }

    /// Raises progress to `percent` if it is an increase within bounds.
    pub fn set_progress(&mut self, percent: u8) {
        if percent > self.progress && percent <= 100 {
            self.progress = percent;
        }
    }
}

impl Default for SyncRunState {
    fn default() -> Self {
        Self::new()
    }
}
