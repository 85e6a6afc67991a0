//! Operation surface of the redline editor.
//!
//! [`DocumentEditor`] ties the pieces together. Each operation resolves its
//! target through the session registry, runs the guardrails, loads the
//! document fresh from disk, and, for edits, snapshots the old bytes into
//! the undo history before saving atomically. Results render as text via
//! [`render`]; failures carry an `Error:` prefix or a bracketed guardrail
//! tag so callers can tell them apart mechanically.

mod editor;
mod error;
mod format;
mod history;
mod outcome;
mod read;
mod replace;
pub mod reporting;
mod session;
pub mod telemetry;

pub use editor::DocumentEditor;
pub use error::{EditError, GatewayError, ValidationError};
pub use format::{FormatWordsOutcome, FormatWordsRequest, WordOutcome};
pub use history::{HistoryAction, HistoryOutcome};
pub use outcome::render;
pub use read::{
    CONTEXT_CHARS, DEFAULT_MAX_RESULTS, SearchHit, SearchQuery, SearchReport, TextOutcome,
    TextScope,
};
pub use replace::{ReplaceOutcome, ReplaceRequest, ReplacementSource};
pub use reporting::{EditReporter, StructuredEditReporter};
pub use session::{DocumentTarget, ResolvedDocument, SESSION_CONSISTENCY_WARNING, SessionRegistry};
