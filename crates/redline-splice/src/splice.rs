//! Locating matches in one block and splicing replacements into its
//! fragments.
//!
//! Matches are computed against an immutable copy of the block's logical
//! text. Kept matches are then folded into a fresh fragment list from the
//! rightmost to the leftmost, so the character offsets of matches still to be
//! applied never move.

use std::ops::Range;

use redline_document::{Block, Content, Equation, Formatting, Fragment};

use crate::backrefs;
use crate::case::preserve_case;
use crate::error::GuardrailRejection;
use crate::guardrails::Deadline;
use crate::pattern::{MatchPattern, MatchSpan, PatternKind};

/// Characters before which a dangling space is removed.
const CLOSING_PUNCTUATION: [char; 7] = ['.', '!', ',', '?', ':', ';', ')'];

/// What a match is replaced with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// Text; back-references are expanded in regular-expression mode.
    Text(String),
    /// An already converted equation object. The whole match becomes one
    /// equation fragment.
    Equation(Equation),
}

/// A replacement to run against one or more blocks.
#[derive(Debug, Clone)]
pub struct SpliceRequest {
    pattern: MatchPattern,
    replacement: Replacement,
    overrides: Option<Formatting>,
    char_range: Option<Range<usize>>,
}

impl SpliceRequest {
    /// Creates a request replacing matches of `pattern` with `replacement`.
    #[must_use]
    pub const fn new(pattern: MatchPattern, replacement: Replacement) -> Self {
        Self {
            pattern,
            replacement,
            overrides: None,
            char_range: None,
        }
    }

    /// Layers `overrides` on the formatting of each replacement.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Formatting) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Only replaces matches lying wholly inside `range` (character offsets).
    #[must_use]
    pub fn with_char_range(mut self, range: Range<usize>) -> Self {
        self.char_range = Some(range);
        self
    }

    /// The compiled pattern.
    #[must_use]
    pub const fn pattern(&self) -> &MatchPattern {
        &self.pattern
    }

    /// The replacement content.
    #[must_use]
    pub const fn replacement(&self) -> &Replacement {
        &self.replacement
    }

    /// Whether replacements copy the case shape of the matched text.
    #[must_use]
    pub fn preserves_case(&self) -> bool {
        let spec = self.pattern.spec();
        spec.kind == PatternKind::Literal && !spec.match_case
    }
}

/// Result of splicing one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSplice {
    /// The rewritten fragments; equal to the input when nothing applied.
    pub fragments: Vec<Fragment>,
    /// Every match in the block, before any filtering.
    pub total_matches: usize,
    /// Matches that passed the range and occurrence filters.
    pub eligible: usize,
    /// Matches actually replaced.
    pub applied: usize,
}

/// Finds, filters and replaces matches in `block`.
///
/// `occurrence` is a 1-based ordinal among the matches left after the
/// character-range filter; `remaining` caps how many replacements may be
/// applied.
///
/// # Errors
///
/// Fails when `deadline` passes during the scan.
pub fn splice_block(
    block: &Block,
    request: &SpliceRequest,
    occurrence: Option<usize>,
    remaining: usize,
    deadline: &Deadline,
) -> Result<BlockSplice, GuardrailRejection> {
    let text = block.logical_text();
    let spans = request.pattern.find_spans(&text, deadline)?;
    Ok(splice_spans(block, &text, spans, request, occurrence, remaining))
}

/// Filters `spans`, found in `text`, and splices the survivors into `block`.
pub(crate) fn splice_spans(
    block: &Block,
    text: &str,
    spans: Vec<MatchSpan>,
    request: &SpliceRequest,
    occurrence: Option<usize>,
    remaining: usize,
) -> BlockSplice {
    let total_matches = spans.len();
    let candidates = filter_spans(spans, request.char_range.as_ref(), occurrence);
    let eligible = candidates.len();
    let kept: Vec<MatchSpan> = candidates.into_iter().take(remaining).collect();
    let applied = kept.len();

    if kept.is_empty() {
        return BlockSplice {
            fragments: block.fragments.clone(),
            total_matches,
            eligible,
            applied,
        };
    }

    let chars: Vec<char> = text.chars().collect();
    let original: Vec<Slot> = block.fragments.iter().cloned().map(Slot::kept).collect();
    let spliced = kept.iter().rev().fold(original, |slots, span| {
        let piece = replacement_piece(request, text, &chars, span);
        splice_one(slots, &span.chars, &piece, request.overrides.as_ref())
    });

    BlockSplice {
        fragments: tidy(spliced),
        total_matches,
        eligible,
        applied,
    }
}

fn filter_spans(
    spans: Vec<MatchSpan>,
    char_range: Option<&Range<usize>>,
    occurrence: Option<usize>,
) -> Vec<MatchSpan> {
    let mut in_range = spans.into_iter().filter(|span| {
        char_range
            .is_none_or(|range| range.start <= span.chars.start && span.chars.end <= range.end)
    });
    match occurrence {
        None => in_range.collect(),
        Some(ordinal) => ordinal
            .checked_sub(1)
            .and_then(|skip| in_range.nth(skip))
            .into_iter()
            .collect(),
    }
}

/// Content standing in for one match.
enum Piece {
    Text(String),
    Equation(Equation),
}

fn replacement_piece(
    request: &SpliceRequest,
    text: &str,
    chars: &[char],
    span: &MatchSpan,
) -> Piece {
    let template = match &request.replacement {
        Replacement::Equation(equation) => return Piece::Equation(equation.clone()),
        Replacement::Text(template) => template,
    };

    if template.is_empty() {
        if span.chars.is_empty() {
            return Piece::Text(String::new());
        }
        let before = span
            .chars
            .start
            .checked_sub(1)
            .and_then(|index| chars.get(index));
        let after = chars.get(span.chars.end);
        let collapse = before.is_some_and(|ch| ch.is_whitespace())
            && after.is_some_and(|ch| ch.is_whitespace());
        return Piece::Text(if collapse { " ".to_owned() } else { String::new() });
    }

    if request.pattern.is_regex() {
        return Piece::Text(backrefs::expand(template, &request.pattern, text, span));
    }
    if request.preserves_case() {
        let matched = text.get(span.bytes.clone()).unwrap_or_default();
        return Piece::Text(preserve_case(matched, template));
    }
    Piece::Text(template.clone())
}

fn char_slice(text: &str, range: Range<usize>) -> String {
    text.chars()
        .skip(range.start)
        .take(range.end.saturating_sub(range.start))
        .collect()
}

fn replacement_fragment(
    piece: &Piece,
    host: &Formatting,
    overrides: Option<&Formatting>,
) -> Fragment {
    let format = overrides.map_or_else(|| host.clone(), |layer| host.layered(layer));
    let content = match piece {
        Piece::Text(text) => Content::Text(text.clone()),
        Piece::Equation(equation) => Content::Equation(equation.clone()),
    };
    Fragment { format, content }
}

/// A fragment in a block being rebuilt, marking replacements so the
/// cleanup pass only touches their boundaries.
struct Slot {
    fragment: Fragment,
    inserted: bool,
}

impl Slot {
    const fn kept(fragment: Fragment) -> Self {
        Self {
            fragment,
            inserted: false,
        }
    }

    fn text(&self) -> Option<&str> {
        match &self.fragment.content {
            Content::Text(text) => Some(text),
            Content::Field(_) | Content::Equation(_) => None,
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match &mut self.fragment.content {
            Content::Text(text) => Some(text),
            Content::Field(_) | Content::Equation(_) => None,
        }
    }

    fn is_blank_text(&self) -> bool {
        self.text().is_some_and(str::is_empty)
    }
}

/// Rebuilds `slots` with the characters in `span` replaced by `piece`.
///
/// Fragments wholly before or after the span are kept verbatim. The first
/// fragment touching the span hosts the replacement and keeps its text on
/// either side as separate fragments; later touching fragments keep only
/// their text after the span. Field and equation payloads of touching
/// fragments are not reconstructed.
fn splice_one(
    slots: Vec<Slot>,
    span: &Range<usize>,
    piece: &Piece,
    overrides: Option<&Formatting>,
) -> Vec<Slot> {
    let mut spliced = Vec::with_capacity(slots.len() + 2);
    let mut position = 0;
    let mut inserted = false;
    let mut last_format = Formatting::default();
    let replacement = |host: &Formatting| Slot {
        fragment: replacement_fragment(piece, host, overrides),
        inserted: true,
    };

    for slot in slots {
        let text = slot.fragment.logical_text().to_owned();
        let length = text.chars().count();
        let start = position;
        let end = position + length;
        position = end;
        last_format.clone_from(&slot.fragment.format);

        if end <= span.start {
            spliced.push(slot);
            continue;
        }
        if start >= span.end {
            if !inserted {
                spliced.push(replacement(&slot.fragment.format));
                inserted = true;
            }
            spliced.push(slot);
            continue;
        }

        let format = &slot.fragment.format;
        if start < span.start {
            let before = char_slice(&text, 0..span.start - start);
            spliced.push(Slot::kept(Fragment::styled(before, format.clone())));
        }
        if !inserted {
            spliced.push(replacement(format));
            inserted = true;
        }
        if end > span.end {
            let after = char_slice(&text, span.end - start..length);
            spliced.push(Slot::kept(Fragment::styled(after, format.clone())));
        }
    }

    if !inserted {
        spliced.push(replacement(&last_format));
    }
    spliced
}

/// Nearest non-empty text slot before `index`. Stops at a field or equation.
fn text_before(slots: &[Slot], index: usize) -> Option<usize> {
    let preceding = slots.get(..index)?;
    let (found, slot) = preceding
        .iter()
        .enumerate()
        .rev()
        .find(|(_, slot)| !slot.is_blank_text())?;
    slot.text().map(|_| found)
}

/// Nearest non-empty text slot at or after `index`. Stops at a field or
/// equation.
fn text_from(slots: &[Slot], index: usize) -> Option<usize> {
    let following = slots.get(index..)?;
    let (offset, slot) = following
        .iter()
        .enumerate()
        .find(|(_, slot)| !slot.is_blank_text())?;
    slot.text().map(|_| index + offset)
}

/// Smooths the join between two text slots: a double space loses the later
/// space; a space before closing punctuation is removed.
fn join(slots: &mut [Slot], left: Option<usize>, right: Option<usize>) {
    let (Some(left), Some(right)) = (left, right) else {
        return;
    };
    let left_spaced = slots
        .get(left)
        .and_then(Slot::text)
        .is_some_and(|text| text.ends_with(' '));
    if !left_spaced {
        return;
    }
    let Some(next) = slots.get(right).and_then(Slot::text) else {
        return;
    };
    if next.starts_with(' ') {
        if let Some(text) = slots.get_mut(right).and_then(Slot::text_mut) {
            text.remove(0);
        }
    } else if next.starts_with(CLOSING_PUNCTUATION)
        && let Some(text) = slots.get_mut(left).and_then(Slot::text_mut)
    {
        text.pop();
    }
}

/// Joins the text on either side of `index`, or `index` itself when it holds
/// text.
fn join_around(slots: &mut [Slot], index: usize) {
    let left = text_before(slots, index);
    let right = text_from(slots, index);
    join(slots, left, right);
}

/// Removes spacing artefacts at the boundaries of each replacement and drops
/// empty text fragments. Boundaries between untouched fragments are left
/// alone; field and equation fragments are always kept.
fn tidy(mut slots: Vec<Slot>) -> Vec<Fragment> {
    let inserted: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.inserted)
        .map(|(index, _)| index)
        .collect();

    for index in inserted {
        let had_text = slots
            .get(index)
            .and_then(Slot::text)
            .is_some_and(|text| !text.is_empty());
        join_around(&mut slots, index);
        let Some(slot) = slots.get(index) else {
            continue;
        };
        if slot.is_blank_text() {
            if had_text {
                join_around(&mut slots, index);
            }
        } else if slot.text().is_some() {
            let next = text_from(&slots, index + 1);
            join(&mut slots, Some(index), next);
        }
    }

    slots
        .into_iter()
        .map(|slot| slot.fragment)
        .filter(|fragment| fragment.is_embedded() || !fragment.logical_text().is_empty())
        .collect()
}
