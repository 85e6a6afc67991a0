//! Search and replace across a document.

use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use redline_document::{Document, DocumentError, Formatting, storage};
use redline_splice::guardrails::{
    Deadline, check_document_size, check_pattern_complexity, check_pattern_length,
    check_timeout_capability,
};
use redline_splice::{
    MatchPattern, PatternSpec, Replacement, Selection, SpliceRequest, select_blocks,
    splice_document,
};

use crate::editor::DocumentEditor;
use crate::error::{EditError, ValidationError};
use crate::session::DocumentTarget;

const OPERATION: &str = "search_and_replace";

/// What matches are replaced with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacementSource {
    /// Plain text; `$&`, `$N` and `${name}` expand in regex mode.
    Text(String),
    /// Equation markup, converted once before the document is scanned.
    Equation {
        /// Source markup handed to the equation converter.
        markup: String,
    },
}

/// Parameters of a search-and-replace call.
///
/// Fields mirror the call surface; use [`ReplaceRequest::new`] and struct
/// update syntax for the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceRequest {
    /// Document to edit.
    pub target: DocumentTarget,
    /// Literal text or regular expression to look for.
    pub find: String,
    /// What each match becomes.
    pub replacement: ReplacementSource,
    /// Case-sensitive matching. Defaults to `true`.
    pub match_case: bool,
    /// Only match whole words.
    pub whole_words: bool,
    /// Treat `find` as a regular expression.
    pub use_regex: bool,
    /// Formatting layered on each replacement.
    pub formatting: Option<Formatting>,
    /// Explicit top-level paragraphs to visit.
    pub paragraph_indices: Option<Vec<usize>>,
    /// First paragraph of an inclusive range.
    pub start_paragraph: Option<usize>,
    /// Last paragraph of an inclusive range.
    pub end_paragraph: Option<usize>,
    /// Replace only the Nth match, counted across the document.
    pub occurrence_index: Option<usize>,
    /// Start of the character window matches must lie in.
    pub char_start: Option<usize>,
    /// End of the character window, exclusive.
    pub char_end: Option<usize>,
}

impl ReplaceRequest {
    /// Replaces `find` with `replacement` text in the active document.
    #[must_use]
    pub fn new(find: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::with_source(find.into(), ReplacementSource::Text(replacement.into()))
    }

    /// Replaces `find` with an equation built from `markup`.
    #[must_use]
    pub fn equation(find: impl Into<String>, markup: impl Into<String>) -> Self {
        Self::with_source(
            find.into(),
            ReplacementSource::Equation {
                markup: markup.into(),
            },
        )
    }

    const fn with_source(find: String, replacement: ReplacementSource) -> Self {
        Self {
            target: DocumentTarget {
                document_id: None,
                filename: None,
            },
            find,
            replacement,
            match_case: true,
            whole_words: false,
            use_regex: false,
            formatting: None,
            paragraph_indices: None,
            start_paragraph: None,
            end_paragraph: None,
            occurrence_index: None,
            char_start: None,
            char_end: None,
        }
    }

    /// Points the request at `target`.
    #[must_use]
    pub fn on(mut self, target: DocumentTarget) -> Self {
        self.target = target;
        self
    }

    fn scope(&self) -> Result<Scope, ValidationError> {
        if self.find.is_empty() {
            return Err(ValidationError::EmptyFind);
        }
        let ranged = self.start_paragraph.is_some() || self.end_paragraph.is_some();
        if self.paragraph_indices.is_some() && ranged {
            return Err(ValidationError::ConflictingSelection);
        }
        if self.occurrence_index == Some(0) {
            return Err(ValidationError::OccurrenceIndex);
        }
        let char_range = match (self.char_start, self.char_end) {
            (None, None) => None,
            (Some(start), Some(end)) => {
                if self.paragraph_indices.is_none() && !ranged {
                    return Err(ValidationError::UnscopedCharRange);
                }
                if end < start {
                    return Err(ValidationError::InvertedCharRange);
                }
                Some(start..end)
            }
            _ => return Err(ValidationError::PartialCharRange),
        };
        let selection = match (&self.paragraph_indices, ranged) {
            (Some(indices), _) => Selection::Indices(indices.clone()),
            (None, true) => Selection::Range {
                start: self.start_paragraph,
                end: self.end_paragraph,
            },
            (None, false) => Selection::All,
        };
        Ok(Scope {
            selection,
            char_range,
        })
    }

    fn pattern_spec(&self) -> PatternSpec {
        let spec = if self.use_regex {
            PatternSpec::regex(self.find.clone())
        } else {
            PatternSpec::literal(self.find.clone())
        };
        spec.with_match_case(self.match_case)
            .with_whole_words(self.whole_words)
    }
}

struct Scope {
    selection: Selection,
    char_range: Option<Range<usize>>,
}

/// Result of a search-and-replace call that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// Document that was searched.
    pub path: PathBuf,
    /// Pattern as supplied.
    pub find: String,
    /// Whether `find` was a regular expression.
    pub use_regex: bool,
    /// Whether matching was case-sensitive.
    pub match_case: bool,
    /// Whether only whole words matched.
    pub whole_words: bool,
    /// Replacement as supplied.
    pub replacement: ReplacementSource,
    /// Whether formatting overrides were applied.
    pub formatted: bool,
    /// Replacements written.
    pub applied: usize,
    /// The per-call cap when it left eligible matches untouched.
    pub cap: Option<usize>,
}

impl ReplaceOutcome {
    const fn kind(&self) -> &'static str {
        if self.use_regex {
            "regex pattern"
        } else {
            "text"
        }
    }
}

impl fmt::Display for ReplaceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.applied == 0 {
            return write!(f, "No occurrences of {} '{}' found.", self.kind(), self.find);
        }
        write!(
            f,
            "Replaced {} occurrence(s) of {} '{}'",
            self.applied,
            self.kind(),
            self.find
        )?;
        if !self.match_case {
            f.write_str(" (case-insensitive)")?;
        }
        if self.whole_words {
            f.write_str(" (whole words only)")?;
        }
        match &self.replacement {
            ReplacementSource::Text(text) => write!(f, " with '{text}'")?,
            ReplacementSource::Equation { .. } => f.write_str(" with equation")?,
        }
        if self.formatted {
            f.write_str(" with formatting")?;
        }
        f.write_str(".")?;
        if let Some(cap) = self.cap {
            write!(
                f,
                " Replacement limit reached (max_matches_per_call={cap}); remaining matches were left unchanged."
            )?;
        }
        Ok(())
    }
}

impl DocumentEditor {
    /// Replaces matches of `request.find` in the target document.
    ///
    /// Nothing is written, and no snapshot is taken, unless at least one
    /// replacement applies. A rejected or failed call leaves the file
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns validation errors, gateway errors, guardrail rejections,
    /// pattern and selection errors, equation conversion failures, and
    /// document or history I/O failures.
    pub fn search_and_replace(
        &self,
        request: &ReplaceRequest,
    ) -> Result<ReplaceOutcome, EditError> {
        let result = self.run_replace(request);
        self.observe(OPERATION, result)
    }

    fn run_replace(&self, request: &ReplaceRequest) -> Result<ReplaceOutcome, EditError> {
        let scope = request.scope()?;
        let path = self.sessions.resolve(&request.target)?.path;
        let size = storage::file_size(&path)?;
        check_document_size(OPERATION, size, &self.limits)?;
        if request.use_regex {
            check_pattern_length(&request.find, &self.limits)?;
            check_timeout_capability(&self.limits, self.capabilities)?;
            check_pattern_complexity(&request.find)?;
        }
        let pattern = MatchPattern::compile(&request.pattern_spec())?;

        let replacement = match &request.replacement {
            ReplacementSource::Text(text) => Replacement::Text(text.clone()),
            ReplacementSource::Equation { markup } => {
                Replacement::Equation(self.converter.convert(markup)?)
            }
        };
        let mut splice = SpliceRequest::new(pattern, replacement);
        if let Some(formatting) = &request.formatting {
            splice = splice.with_overrides(formatting.clone());
        }
        if let Some(range) = scope.char_range {
            splice = splice.with_char_range(range);
        }

        let mut document = storage::load(&path)?;
        let plan = select_blocks(&document, &scope.selection)?;
        let deadline = Deadline::start(self.limits.regex_timeout_ms);
        let spliced = splice_document(
            &mut document,
            &plan,
            &splice,
            request.occurrence_index,
            &self.limits,
            &deadline,
        )?;

        if spliced.modified() {
            self.commit(&path, &document, spliced.applied)?;
        } else {
            self.reporter.unchanged(OPERATION, &path);
        }

        Ok(ReplaceOutcome {
            path,
            find: request.find.clone(),
            use_regex: request.use_regex,
            match_case: request.match_case,
            whole_words: request.whole_words,
            replacement: request.replacement.clone(),
            formatted: request.formatting.is_some(),
            applied: spliced.applied,
            cap: spliced.cap_hit.then_some(self.limits.max_matches_per_call),
        })
    }

    fn commit(
        &self,
        path: &Path,
        document: &Document,
        applied: usize,
    ) -> Result<(), EditError> {
        self.commit_with(path, applied, || storage::save(path, document))
    }

    /// Runs `write` between capturing the current bytes and recording them,
    /// so a failed write leaves the history as it was.
    pub(crate) fn commit_with(
        &self,
        path: &Path,
        applied: usize,
        write: impl FnOnce() -> Result<(), DocumentError>,
    ) -> Result<(), EditError> {
        let pending = self.history.capture(path)?;
        write()?;
        if let Some(pending) = pending {
            self.history.record(pending)?;
        }
        self.reporter.committed(OPERATION, path, applied);
        Ok(())
    }
}
