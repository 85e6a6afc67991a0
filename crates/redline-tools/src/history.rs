//! Undo, redo and history inspection.

use std::fmt;
use std::path::PathBuf;

use redline_history::{HistoryError, HistorySummary, StepOutcome, canonical_key};

use crate::editor::DocumentEditor;
use crate::error::EditError;
use crate::session::DocumentTarget;

/// A history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    /// Restore up to `steps` earlier states.
    Undo {
        /// Steps to undo, at least one.
        steps: usize,
    },
    /// Re-apply up to `steps` undone states.
    Redo {
        /// Steps to redo, at least one.
        steps: usize,
    },
    /// Report stack depths and budget figures.
    List,
    /// Forget history.
    Clear,
}

/// Result of a history action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOutcome {
    /// An undo or redo ran.
    Step(StepOutcome),
    /// Summary of one document.
    Summary(HistorySummary),
    /// Summaries of every tracked document.
    Tracked(Vec<HistorySummary>),
    /// History was cleared for one document, or for all when `None`.
    Cleared(Option<PathBuf>),
}

impl fmt::Display for HistoryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step(outcome) => outcome.fmt(f),
            Self::Summary(summary) => summary.fmt(f),
            Self::Tracked(summaries) if summaries.is_empty() => {
                f.write_str("No undo history tracked yet")
            }
            Self::Tracked(summaries) => {
                let lines: Vec<String> = summaries.iter().map(ToString::to_string).collect();
                f.write_str(&lines.join("\n"))
            }
            Self::Cleared(Some(path)) => write!(f, "Cleared history for {}", path.display()),
            Self::Cleared(None) => f.write_str("Cleared history for all documents"),
        }
    }
}

impl DocumentEditor {
    /// Runs a history action.
    ///
    /// Undo and redo fall back to the active session document when
    /// `target` names nothing; listing and clearing then cover every
    /// tracked document instead.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidSteps`] for zero steps, gateway errors
    /// for unresolvable targets and history I/O failures.
    pub fn history(
        &self,
        action: HistoryAction,
        target: &DocumentTarget,
    ) -> Result<HistoryOutcome, EditError> {
        let (outcome, path) = match action {
            HistoryAction::Undo { steps } => {
                let path = self.step_path(steps, target)?;
                (HistoryOutcome::Step(self.history.undo(&path, steps)?), Some(path))
            }
            HistoryAction::Redo { steps } => {
                let path = self.step_path(steps, target)?;
                (HistoryOutcome::Step(self.history.redo(&path, steps)?), Some(path))
            }
            HistoryAction::List if target.is_unspecified() => {
                (HistoryOutcome::Tracked(self.history.summaries()?), None)
            }
            HistoryAction::List => {
                let path = self.history_path(target)?;
                (HistoryOutcome::Summary(self.history.summary(&path)?), Some(path))
            }
            HistoryAction::Clear if target.is_unspecified() => {
                self.history.clear(None)?;
                (HistoryOutcome::Cleared(None), None)
            }
            HistoryAction::Clear => {
                let path = self.history_path(target)?;
                self.history.clear(Some(&path))?;
                (HistoryOutcome::Cleared(Some(path.clone())), Some(path))
            }
        };
        self.reporter.history(&action, path.as_deref());
        Ok(outcome)
    }

    fn step_path(&self, steps: usize, target: &DocumentTarget) -> Result<PathBuf, EditError> {
        if steps < 1 {
            return Err(HistoryError::InvalidSteps.into());
        }
        self.history_path(target)
    }

    fn history_path(&self, target: &DocumentTarget) -> Result<PathBuf, EditError> {
        let resolved = self.sessions.resolve(target)?;
        Ok(canonical_key(&resolved.path))
    }
}
