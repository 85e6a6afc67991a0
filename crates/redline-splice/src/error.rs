//! Error types for the locator, selector and guardrails.

use std::fmt;

use strum::{Display, EnumString};
use thiserror::Error;

/// Machine-parseable tag attached to every guardrail rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionTag {
    /// The on-disk document exceeds the byte ceiling.
    DocTooLarge,
    /// A pattern, scan or output ceiling was exceeded.
    LimitExceeded,
    /// The pattern or matching configuration risks unbounded work.
    RegexComplexityBlocked,
}

/// A guardrail refused to let an operation proceed.
///
/// Renders as `[TAG] message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardrailRejection {
    tag: RejectionTag,
    message: String,
}

impl GuardrailRejection {
    /// Builds a rejection.
    #[must_use]
    pub fn new(tag: RejectionTag, message: impl Into<String>) -> Self {
        Self {
            tag,
            message: message.into(),
        }
    }

    /// Tag identifying the guardrail.
    #[must_use]
    pub const fn tag(&self) -> RejectionTag {
        self.tag
    }

    /// Human-readable explanation.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for GuardrailRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.tag, self.message)
    }
}

impl std::error::Error for GuardrailRejection {}

/// Block selection failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// An explicit index does not address a top-level paragraph.
    #[error("Invalid paragraph index {index}. Document has {count} paragraphs")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of top-level paragraphs.
        count: usize,
    },

    /// A range bound does not address a top-level paragraph.
    #[error("Invalid paragraph range {start}-{end}. Document has {count} paragraphs")]
    RangeOutOfBounds {
        /// First paragraph of the range.
        start: usize,
        /// Last paragraph of the range, inclusive.
        end: usize,
        /// Number of top-level paragraphs.
        count: usize,
    },

    /// The range ends before it starts.
    #[error("Invalid paragraph range: start {start} is after end {end}")]
    InvertedRange {
        /// First paragraph of the range.
        start: usize,
        /// Last paragraph of the range, inclusive.
        end: usize,
    },
}

/// Errors surfaced while preparing or running a matching pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpliceError {
    /// A guardrail refused the operation.
    #[error(transparent)]
    Rejected(#[from] GuardrailRejection),

    /// The pattern is not valid syntax.
    #[error("Invalid regex pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Pattern as supplied.
        pattern: String,
        /// Compiler diagnostic.
        message: String,
    },

    /// The block selection does not fit the document.
    #[error(transparent)]
    Selection(#[from] SelectionError),
}
