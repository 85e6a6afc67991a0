//! Pattern compilation and match enumeration over logical text.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

use crate::error::{GuardrailRejection, SpliceError};
use crate::guardrails::Deadline;

/// Upper bound on the compiled program size of a single pattern.
pub const COMPILED_SIZE_LIMIT: usize = 10 * (1 << 20);

/// How the search text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// The text is matched verbatim.
    Literal,
    /// The text is a regular expression.
    Regex,
}

/// Everything needed to compile a search pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSpec {
    /// Search text as supplied by the caller.
    pub text: String,
    /// Literal or regular-expression interpretation.
    pub kind: PatternKind,
    /// Whether letter case must match exactly.
    pub match_case: bool,
    /// Whether matches must start and end on word boundaries.
    pub whole_words: bool,
}

impl PatternSpec {
    /// A case-sensitive literal pattern.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: PatternKind::Literal,
            match_case: true,
            whole_words: false,
        }
    }

    /// A case-sensitive regular-expression pattern.
    #[must_use]
    pub fn regex(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: PatternKind::Regex,
            match_case: true,
            whole_words: false,
        }
    }

    /// Sets case sensitivity.
    #[must_use]
    pub fn with_match_case(mut self, match_case: bool) -> Self {
        self.match_case = match_case;
        self
    }

    /// Sets whole-word matching.
    #[must_use]
    pub fn with_whole_words(mut self, whole_words: bool) -> Self {
        self.whole_words = whole_words;
        self
    }
}

/// One match within a block's logical text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    /// Half-open character range.
    pub chars: Range<usize>,
    /// Half-open byte range.
    pub bytes: Range<usize>,
    /// Byte ranges of each capture group; index zero is the whole match.
    pub groups: Vec<Option<Range<usize>>>,
}

/// A compiled search pattern.
#[derive(Debug, Clone)]
pub struct MatchPattern {
    regex: Regex,
    spec: PatternSpec,
}

impl MatchPattern {
    /// Compiles `spec`.
    ///
    /// Literal text is escaped. Whole-word matching wraps the pattern in
    /// word-boundary assertions in both modes; case-insensitivity is a
    /// compile-time flag.
    ///
    /// # Errors
    ///
    /// Returns [`SpliceError::InvalidPattern`] when the expression does not
    /// compile or exceeds [`COMPILED_SIZE_LIMIT`].
    pub fn compile(spec: &PatternSpec) -> Result<Self, SpliceError> {
        let body = match spec.kind {
            PatternKind::Literal => regex::escape(&spec.text),
            PatternKind::Regex => spec.text.clone(),
        };
        let source = match (spec.whole_words, spec.kind) {
            (false, _) => body,
            (true, PatternKind::Literal) => format!(r"\b{body}\b"),
            (true, PatternKind::Regex) => format!(r"\b(?:{body})\b"),
        };
        let regex = RegexBuilder::new(&source)
            .case_insensitive(!spec.match_case)
            .size_limit(COMPILED_SIZE_LIMIT)
            .build()
            .map_err(|error| SpliceError::InvalidPattern {
                pattern: spec.text.clone(),
                message: error.to_string(),
            })?;
        Ok(Self {
            regex,
            spec: spec.clone(),
        })
    }

    /// The pattern settings this was compiled from.
    #[must_use]
    pub const fn spec(&self) -> &PatternSpec {
        &self.spec
    }

    /// Returns `true` for regular-expression patterns.
    #[must_use]
    pub fn is_regex(&self) -> bool {
        self.spec.kind == PatternKind::Regex
    }

    /// Index of the named capture group `name`, if any.
    #[must_use]
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.regex
            .capture_names()
            .position(|candidate| candidate == Some(name))
    }

    /// Every match in `text`, leftmost first.
    ///
    /// # Errors
    ///
    /// Fails when `deadline` passes between match iterations.
    pub fn find_spans(
        &self,
        text: &str,
        deadline: &Deadline,
    ) -> Result<Vec<MatchSpan>, GuardrailRejection> {
        let mut spans = Vec::new();
        let mut indexer = CharIndexer::new(text);
        for captures in self.regex.captures_iter(text) {
            deadline.check()?;
            let Some(whole) = captures.get(0) else {
                continue;
            };
            let start = indexer.char_offset(whole.start());
            let end = indexer.char_offset(whole.end());
            spans.push(MatchSpan {
                chars: start..end,
                bytes: whole.range(),
                groups: captures
                    .iter()
                    .map(|group| group.map(|found| found.range()))
                    .collect(),
            });
        }
        Ok(spans)
    }
}

/// Converts ascending byte offsets into character offsets in one pass.
struct CharIndexer<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharIndexer<'a> {
    const fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    fn char_offset(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            self.byte = 0;
            self.chars = 0;
        }
        let counted = self
            .text
            .get(self.byte..byte)
            .map_or(0, |segment| segment.chars().count());
        self.byte = byte;
        self.chars += counted;
        self.chars
    }
}
