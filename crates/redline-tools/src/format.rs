//! Formatting every occurrence of a list of words.

use std::fmt;

use redline_document::Formatting;

use crate::editor::DocumentEditor;
use crate::error::{EditError, ValidationError};
use crate::outcome::render;
use crate::replace::ReplaceRequest;
use crate::session::DocumentTarget;

/// Parameters of a word-formatting call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatWordsRequest {
    /// Document to edit.
    pub target: DocumentTarget,
    /// Words to format, each handled as its own replacement.
    pub words: Vec<String>,
    /// Formatting layered on each occurrence.
    pub formatting: Formatting,
    /// Case-sensitive matching. Defaults to `true`.
    pub match_case: bool,
    /// Only match whole words. Defaults to `true`.
    pub whole_words: bool,
}

impl FormatWordsRequest {
    /// Formats `words` with `formatting` in the active document.
    #[must_use]
    pub fn new<I, W>(words: I, formatting: Formatting) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<String>,
    {
        Self {
            target: DocumentTarget::active(),
            words: words.into_iter().map(Into::into).collect(),
            formatting,
            match_case: true,
            whole_words: true,
        }
    }
}

/// One word's rendered result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordOutcome {
    /// The word as supplied.
    pub word: String,
    /// Rendered search-and-replace result for the word.
    pub outcome: String,
}

/// Per-word results, one line each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatWordsOutcome {
    /// Results in request order.
    pub words: Vec<WordOutcome>,
}

impl fmt::Display for FormatWordsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self
            .words
            .iter()
            .map(|entry| format!("'{}': {}", entry.word, entry.outcome))
            .collect();
        f.write_str(&lines.join("\n"))
    }
}

impl DocumentEditor {
    /// Applies `request.formatting` to every occurrence of each word.
    ///
    /// Each word runs as a separate replacement of itself, so each gets its
    /// own guardrail checks and undo snapshot. A failure for one word is
    /// reported on its line and does not stop the others.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty word list and gateway errors
    /// when the target cannot be resolved.
    pub fn format_words(
        &self,
        request: &FormatWordsRequest,
    ) -> Result<FormatWordsOutcome, EditError> {
        if request.words.is_empty() {
            return Err(ValidationError::EmptyWordList.into());
        }
        let path = self.sessions.resolve(&request.target)?.path;

        let words = request
            .words
            .iter()
            .map(|word| {
                let replace = ReplaceRequest {
                    target: DocumentTarget::file(path.clone()),
                    match_case: request.match_case,
                    whole_words: request.whole_words,
                    formatting: Some(request.formatting.clone()),
                    ..ReplaceRequest::new(word.clone(), word.clone())
                };
                WordOutcome {
                    word: word.clone(),
                    outcome: render(&self.search_and_replace(&replace), &self.limits),
                }
            })
            .collect();
        Ok(FormatWordsOutcome { words })
    }
}
