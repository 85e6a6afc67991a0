//! The editor service that owns history, sessions and collaborators.

use std::sync::Arc;

use redline_config::{Config, Limits};
use redline_document::EquationConverter;
use redline_history::UndoManager;
use redline_splice::EngineCapabilities;

use crate::error::EditError;
use crate::reporting::{EditReporter, StructuredEditReporter};
use crate::session::SessionRegistry;

/// Entry point for every document operation.
///
/// Hosts build one editor per process and share it; it owns the undo
/// history and the session registry, so tests get a clean slate simply by
/// building a new one.
pub struct DocumentEditor {
    pub(crate) limits: Limits,
    pub(crate) history: UndoManager,
    pub(crate) sessions: SessionRegistry,
    pub(crate) converter: Arc<dyn EquationConverter>,
    pub(crate) capabilities: EngineCapabilities,
    pub(crate) reporter: Arc<dyn EditReporter>,
}

impl DocumentEditor {
    /// Creates an editor enforcing `limits` that converts equation markup
    /// with `converter`.
    #[must_use]
    pub fn new(limits: Limits, converter: Arc<dyn EquationConverter>) -> Self {
        Self {
            limits,
            history: UndoManager::from_limits(&limits),
            sessions: SessionRegistry::new(),
            converter,
            capabilities: EngineCapabilities::builtin(),
            reporter: Arc::new(StructuredEditReporter::new()),
        }
    }

    /// Creates an editor from loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config, converter: Arc<dyn EquationConverter>) -> Self {
        Self::new(config.limits(), converter)
    }

    /// Replaces the event reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn EditReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Declares what the matching engine can enforce.
    #[must_use]
    pub const fn with_capabilities(mut self, capabilities: EngineCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Ceilings enforced by this editor.
    #[must_use]
    pub const fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Undo history shared by every operation.
    #[must_use]
    pub const fn undo_manager(&self) -> &UndoManager {
        &self.history
    }

    /// Session handles known to this editor.
    #[must_use]
    pub const fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Passes `result` through, telling the reporter about rejections.
    pub(crate) fn observe<T>(
        &self,
        operation: &str,
        result: Result<T, EditError>,
    ) -> Result<T, EditError> {
        if let Err(error) = &result
            && let Some(rejection) = error.rejection()
        {
            self.reporter.rejected(operation, rejection);
        }
        result
    }
}
