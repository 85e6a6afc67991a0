//! Reading document text and searching it without changing anything.

use std::fmt;

use redline_document::{Document, DocumentError, storage};
use redline_splice::guardrails::{Deadline, check_document_size};
use redline_splice::{MatchPattern, PatternSpec};
use serde::Serialize;

use crate::editor::DocumentEditor;
use crate::error::{EditError, ValidationError};
use crate::session::DocumentTarget;

const OPERATION: &str = "get_text";

/// Results returned by a search when the caller sets no maximum.
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Characters of surrounding text shown on each side of a search hit.
pub const CONTEXT_CHARS: usize = 40;

/// What [`DocumentEditor::get_text`] returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextScope {
    /// The logical text of every block, one per line.
    All,
    /// Every occurrence of a term, as JSON.
    Search(SearchQuery),
}

/// A literal text search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Text to look for.
    pub term: String,
    /// Case-sensitive matching. Defaults to `true`.
    pub match_case: bool,
    /// Only match whole words.
    pub whole_word: bool,
    /// Hits to return at most.
    pub max_results: usize,
}

impl SearchQuery {
    /// Searches for `term` case-sensitively.
    #[must_use]
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            match_case: true,
            whole_word: false,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// JSON payload of a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchReport {
    /// Term as supplied.
    pub term: String,
    /// Every occurrence found.
    pub total_count: usize,
    /// Occurrences listed in `results`.
    pub returned_count: usize,
    /// Whether `max_results` cut the list.
    pub truncated: bool,
    /// Whether `max_output_chars` cut the list further.
    pub output_truncated: bool,
    /// Listed occurrences in document order.
    pub results: Vec<SearchHit>,
}

/// One occurrence of a search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// Block holding the match, e.g. `paragraph 3`.
    pub location: String,
    /// 1-based ordinal across the document.
    pub occurrence: usize,
    /// Character offset of the match in its block.
    pub start: usize,
    /// Character offset just past the match.
    pub end: usize,
    /// The match with surrounding text.
    pub context: String,
}

/// Text returned by a read, with the advisory session warning if one
/// applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOutcome {
    /// Plain text or JSON payload.
    pub body: String,
    /// Session consistency warning.
    pub warning: Option<String>,
}

impl fmt::Display for TextOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)?;
        if let Some(warning) = &self.warning {
            write!(f, "\n\n{warning}")?;
        }
        Ok(())
    }
}

impl DocumentEditor {
    /// Reads the target document's text, or searches it.
    ///
    /// Reads through a session handle count towards that handle's
    /// operation limit.
    ///
    /// # Errors
    ///
    /// Returns gateway errors, a `DOC_TOO_LARGE` rejection, validation
    /// errors for an empty search term, and document read failures.
    pub fn get_text(
        &self,
        target: &DocumentTarget,
        scope: &TextScope,
    ) -> Result<TextOutcome, EditError> {
        let result = self.run_read(target, scope);
        self.observe(OPERATION, result)
    }

    fn run_read(
        &self,
        target: &DocumentTarget,
        scope: &TextScope,
    ) -> Result<TextOutcome, EditError> {
        if let TextScope::Search(query) = scope
            && query.term.is_empty()
        {
            return Err(ValidationError::EmptySearchTerm.into());
        }
        let resolved = self.sessions.resolve(target)?;
        let size = storage::file_size(&resolved.path)?;
        check_document_size(OPERATION, size, &self.limits)?;
        let document = storage::load(&resolved.path)?;

        let body = match scope {
            TextScope::All => full_text(&document),
            TextScope::Search(query) => self.search(&document, query)?,
        };
        let warning = match &resolved.handle {
            Some(id) => self.sessions.record_read(id, self.limits.session_op_limit)?,
            None => None,
        };
        Ok(TextOutcome { body, warning })
    }

    fn search(&self, document: &Document, query: &SearchQuery) -> Result<String, EditError> {
        let spec = PatternSpec::literal(query.term.clone())
            .with_match_case(query.match_case)
            .with_whole_words(query.whole_word);
        let pattern = MatchPattern::compile(&spec)?;
        let deadline = Deadline::start(self.limits.regex_timeout_ms);

        let mut total_count = 0;
        let mut results = Vec::new();
        for (address, block) in document.blocks() {
            let text = block.logical_text();
            for span in pattern.find_spans(&text, &deadline)? {
                total_count += 1;
                if results.len() < query.max_results {
                    results.push(SearchHit {
                        location: address.to_string(),
                        occurrence: total_count,
                        start: span.chars.start,
                        end: span.chars.end,
                        context: context(&text, span.chars.start, span.chars.end),
                    });
                }
            }
        }

        let mut report = SearchReport {
            term: query.term.clone(),
            total_count,
            returned_count: results.len(),
            truncated: results.len() < total_count,
            output_truncated: false,
            results,
        };
        let mut payload = encode(&report)?;
        while payload.chars().count() > self.limits.max_output_chars
            && report.results.pop().is_some()
        {
            report.returned_count = report.results.len();
            report.output_truncated = true;
            payload = encode(&report)?;
        }
        Ok(payload)
    }
}

fn full_text(document: &Document) -> String {
    let lines: Vec<String> = document
        .blocks()
        .map(|(_, block)| block.logical_text())
        .collect();
    lines.join("\n")
}

fn context(text: &str, start: usize, end: usize) -> String {
    let from = start.saturating_sub(CONTEXT_CHARS);
    let to = end.saturating_add(CONTEXT_CHARS);
    text.chars().skip(from).take(to - from).collect()
}

fn encode(report: &SearchReport) -> Result<String, EditError> {
    serde_json::to_string_pretty(report).map_err(|error| {
        EditError::Document(DocumentError::Encode {
            message: error.to_string(),
        })
    })
}
