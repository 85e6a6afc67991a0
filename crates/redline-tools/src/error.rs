//! Errors returned by editor operations.
//!
//! Every variant renders as the caller-facing text of a failed call:
//! validation problems carry an `Error:` prefix and guardrail rejections
//! their bracketed tag.

use std::path::PathBuf;

use redline_document::{ConversionError, DocumentError};
use redline_history::HistoryError;
use redline_splice::{GuardrailRejection, SelectionError, SpliceError};
use thiserror::Error;

/// Request problems found before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The search text is empty.
    #[error("find text must not be empty")]
    EmptyFind,

    /// Explicit paragraph indices were combined with a paragraph range.
    #[error("paragraph_indices cannot be combined with start_paragraph/end_paragraph")]
    ConflictingSelection,

    /// Occurrence ordinals are 1-based.
    #[error("occurrence_index must be >= 1")]
    OccurrenceIndex,

    /// Only one bound of a character range was supplied.
    #[error("char_start and char_end must both be provided together")]
    PartialCharRange,

    /// A character range was supplied without a paragraph scope.
    #[error("char_start/char_end require a paragraph range to be specified")]
    UnscopedCharRange,

    /// The character range ends before it starts.
    #[error("char_end cannot be less than char_start")]
    InvertedCharRange,

    /// No words were given to format.
    #[error("word list must not be empty")]
    EmptyWordList,

    /// The search term of a text search is empty.
    #[error("search term must not be empty")]
    EmptySearchTerm,
}

/// Failures of the document access gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No session is registered under the handle.
    #[error("Document '{id}' not found in sessions")]
    UnknownHandle {
        /// Handle that was looked up.
        id: String,
    },

    /// The call named no document and no session is active.
    #[error("Error: no document specified and no active session document")]
    NoActiveDocument,

    /// A session was opened on a path with no file behind it.
    #[error("Document {path} does not exist")]
    Missing {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The session lock was poisoned by a panicking holder.
    #[error("session registry lock poisoned")]
    LockPoisoned,
}

/// Errors surfaced by [`crate::DocumentEditor`] operations.
#[derive(Debug, Error)]
pub enum EditError {
    /// The request itself is malformed.
    #[error("Error: {0}")]
    Invalid(#[from] ValidationError),

    /// The target could not be resolved to a document path.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A guardrail refused the operation.
    #[error(transparent)]
    Rejected(#[from] GuardrailRejection),

    /// The pattern does not compile.
    #[error("Invalid regex pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Pattern as supplied.
        pattern: String,
        /// Compiler diagnostic.
        message: String,
    },

    /// The paragraph selection does not fit the document.
    #[error("Error: {0}")]
    Selection(#[from] SelectionError),

    /// Equation markup could not be converted.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// The document could not be read, parsed or written.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// A history operation failed.
    #[error(transparent)]
    History(#[from] HistoryError),
}

impl From<SpliceError> for EditError {
    fn from(error: SpliceError) -> Self {
        match error {
            SpliceError::Rejected(rejection) => Self::Rejected(rejection),
            SpliceError::InvalidPattern { pattern, message } => {
                Self::InvalidPattern { pattern, message }
            }
            SpliceError::Selection(selection) => Self::Selection(selection),
        }
    }
}

impl EditError {
    /// The guardrail rejection behind this error, if any.
    #[must_use]
    pub const fn rejection(&self) -> Option<&GuardrailRejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}
