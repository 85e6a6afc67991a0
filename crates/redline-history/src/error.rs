//! Errors surfaced by the history manager.

use std::path::PathBuf;

use thiserror::Error;

use crate::report::Direction;

/// Errors raised while capturing or restoring snapshots.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Undo and redo need at least one step.
    #[error("Error: steps must be >= 1")]
    InvalidSteps,

    /// The current document bytes could not be captured.
    #[error("failed to capture snapshot of {path}: {message}")]
    Capture {
        /// Document path.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// Writing a snapshot back failed. The popped snapshot is back on its
    /// stack and earlier steps stay applied.
    #[error("Failed to {} snapshot for {path} after {applied} step(s): {message}", .direction.verb())]
    Restore {
        /// Undo or redo.
        direction: Direction,
        /// Document path.
        path: PathBuf,
        /// Steps applied before the failure.
        applied: usize,
        /// Description of the write error.
        message: String,
    },

    /// The history lock was poisoned by a panicking holder.
    #[error("history lock poisoned")]
    LockPoisoned,
}
