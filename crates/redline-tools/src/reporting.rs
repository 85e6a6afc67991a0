//! Structured reporting of editor lifecycle events.

use std::path::Path;
use std::sync::Arc;

use redline_splice::GuardrailRejection;

use crate::history::HistoryAction;

/// Observer notified as editor operations finish.
pub trait EditReporter: Send + Sync {
    /// A guardrail refused `operation` before anything was written.
    fn rejected(&self, operation: &str, rejection: &GuardrailRejection);

    /// `operation` wrote `applied` replacements to `path`.
    fn committed(&self, operation: &str, path: &Path, applied: usize);

    /// `operation` ran against `path` without changing it.
    fn unchanged(&self, operation: &str, path: &Path);

    /// A history action ran, against `path` when one was targeted.
    fn history(&self, action: &HistoryAction, path: Option<&Path>);
}

impl<T> EditReporter for Arc<T>
where
    T: EditReporter + ?Sized,
{
    fn rejected(&self, operation: &str, rejection: &GuardrailRejection) {
        (**self).rejected(operation, rejection);
    }

    fn committed(&self, operation: &str, path: &Path, applied: usize) {
        (**self).committed(operation, path, applied);
    }

    fn unchanged(&self, operation: &str, path: &Path) {
        (**self).unchanged(operation, path);
    }

    fn history(&self, action: &HistoryAction, path: Option<&Path>) {
        (**self).history(action, path);
    }
}

/// Default reporter that records events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredEditReporter;

impl StructuredEditReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EditReporter for StructuredEditReporter {
    fn rejected(&self, operation: &str, rejection: &GuardrailRejection) {
        tracing::warn!(
            target: "redline_tools::edit",
            event = "guardrail_rejected",
            operation,
            tag = %rejection.tag(),
            message = rejection.message(),
            "operation refused by guardrail"
        );
    }

    fn committed(&self, operation: &str, path: &Path, applied: usize) {
        tracing::info!(
            target: "redline_tools::edit",
            event = "committed",
            operation,
            path = %path.display(),
            applied,
            "document updated"
        );
    }

    fn unchanged(&self, operation: &str, path: &Path) {
        tracing::debug!(
            target: "redline_tools::edit",
            event = "unchanged",
            operation,
            path = %path.display(),
            "operation left document unchanged"
        );
    }

    fn history(&self, action: &HistoryAction, path: Option<&Path>) {
        tracing::info!(
            target: "redline_tools::edit",
            event = "history",
            action = ?action,
            path = ?path,
            "history action completed"
        );
    }
}
