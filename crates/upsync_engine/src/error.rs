//! Error types for the sync-up engine.

use thiserror::Error;

/// Result type for sync-up operations.
pub type SyncUpResult<T> = Result<T, SyncUpError>;

/// Stage of a run in which an error occurred.
///
/// Lets callers decide on retry/resume without matching error variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Loading dirty records from the local store.
    Load,
    /// Computing eligibility against remote modification info.
    Classify,
    /// Uploading a batch or a single record.
    Upload,
    /// Run bookkeeping (state transitions, configuration).
    Control,
}

/// Errors that can occur during a sync-up run.
#[derive(Error, Debug)]
pub enum SyncUpError {
    /// Reading records from the local store failed.
    ///
    /// Raised before any network activity; zero batches were uploaded.
    #[error("local read failed: {message}")]
    LocalRead {
        /// Error message from the store.
        message: String,
    },

    /// Looking up remote modification info failed.
    ///
    /// Only possible in leave-if-changed mode; zero batches were uploaded.
    #[error("remote lookup failed: {message}")]
    RemoteLookup {
        /// Error message from the target.
        message: String,
    },

    /// Uploading a batch failed.
    ///
    /// Batches uploaded before the failing one remain committed.
    #[error("upload failed: {message}")]
    Upload {
        /// Error message from the target.
        message: String,
    },

    /// A batch-capable target reported an unusable batch capacity.
    #[error("invalid batch capacity {0}, must be at least 1")]
    InvalidBatchSize(usize),

    /// An illegal run-state transition was attempted.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        /// Current status.
        from: String,
        /// Attempted status.
        to: String,
    },
}

impl SyncUpError {
    /// Creates a local-read error.
    pub fn local_read(message: impl Into<String>) -> Self {
        Self::LocalRead {
            message: message.into(),
        }
    }

    /// Creates a remote-lookup error.
    pub fn remote_lookup(message: impl Into<String>) -> Self {
        Self::RemoteLookup {
            message: message.into(),
        }
    }

    /// Creates an upload error.
    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload {
            message: message.into(),
        }
    }

    /// Returns the stage in which this error occurred.
    pub fn stage(&self) -> Stage {
        match self {
            SyncUpError::LocalRead { .. } => Stage::Load,
            SyncUpError::RemoteLookup { .. } => Stage::Classify,
            SyncUpError::Upload { .. } => Stage::Upload,
            SyncUpError::InvalidBatchSize(_) | SyncUpError::InvalidStateTransition { .. } => {
                Stage::Control
            }
        }
    }
}
