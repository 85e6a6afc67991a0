//! Values describing history operations, rendered as caller-facing text.

use std::fmt;
use std::path::PathBuf;

/// Tag appended to summaries once the byte budget has evicted a snapshot.
pub const UNDO_BUDGET_EXCEEDED: &str = "UNDO_BUDGET_EXCEEDED";

/// Direction of a history step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Restore an earlier state.
    Undo,
    /// Re-apply an undone state.
    Redo,
}

impl Direction {
    pub(crate) const fn verb(self) -> &'static str {
        match self {
            Self::Undo => "restore",
            Self::Redo => "re-apply",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }
}

/// Steps requested versus applied for one undo or redo call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Undo or redo.
    pub direction: Direction,
    /// Canonical document path.
    pub path: PathBuf,
    /// Steps the caller asked for.
    pub requested: usize,
    /// Steps actually applied.
    pub applied: usize,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, verb) = match self.direction {
            Direction::Undo => ("Undo", "restored"),
            Direction::Redo => ("Redo", "applied"),
        };
        write!(
            f,
            "{name} successful (requested {}, {verb} {}) for {}",
            self.requested,
            self.applied,
            self.path.display()
        )
    }
}

/// Result of an undo or redo call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// At least one step was applied.
    Applied(StepReport),
    /// The relevant stack was empty.
    NoHistory {
        /// Undo or redo.
        direction: Direction,
        /// Canonical document path.
        path: PathBuf,
    },
}

impl StepOutcome {
    /// Steps applied; zero when there was no history.
    #[must_use]
    pub const fn applied(&self) -> usize {
        match self {
            Self::Applied(report) => report.applied,
            Self::NoHistory { .. } => 0,
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied(report) => report.fmt(f),
            Self::NoHistory { direction, path } => {
                write!(f, "No {} history for {}", direction.label(), path.display())
            }
        }
    }
}

/// Stack depths for one document plus manager-wide budget figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySummary {
    /// Canonical document path.
    pub path: PathBuf,
    /// Snapshots on the undo stack.
    pub undo_depth: usize,
    /// Snapshots on the redo stack.
    pub redo_depth: usize,
    /// Snapshot bytes held across every tracked document.
    pub total_snapshot_bytes: u64,
    /// Snapshots evicted by the byte budget so far.
    pub budget_evictions: u64,
}

impl fmt::Display for HistorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "History for {}: undo={}, redo={}, total_snapshot_bytes={}, budget_evictions={}",
            self.path.display(),
            self.undo_depth,
            self.redo_depth,
            self.total_snapshot_bytes,
            self.budget_evictions
        )?;
        if self.budget_evictions > 0 {
            write!(f, " [{UNDO_BUDGET_EXCEEDED}]")?;
        }
        Ok(())
    }
}
