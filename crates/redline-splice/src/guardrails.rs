//! Preflight policy checks.
//!
//! Every check is a pure function of document metadata or a pattern string
//! and the configured [`Limits`]. None of them touch the document, so a
//! rejected operation leaves no trace on disk or in history.

use std::time::{Duration, Instant};

use redline_config::Limits;
use tracing::warn;

use crate::error::{GuardrailRejection, RejectionTag};

/// Largest alternation count a pattern may contain.
pub const MAX_ALTERNATIONS: usize = 256;

/// Suffix appended to payloads cut short by [`truncate_output`].
pub const TRUNCATION_SUFFIX: &str = "\n... [output truncated]";

/// What the matching engine in use can enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineCapabilities {
    /// Whether a matching deadline can be honoured.
    pub supports_timeout: bool,
}

impl EngineCapabilities {
    /// Capabilities of the built-in engine, which checks a cooperative
    /// deadline between match iterations.
    #[must_use]
    pub const fn builtin() -> Self {
        Self {
            supports_timeout: true,
        }
    }

    /// Capabilities of an engine with no deadline support.
    #[must_use]
    pub const fn without_timeout() -> Self {
        Self {
            supports_timeout: false,
        }
    }
}

impl Default for EngineCapabilities {
    fn default() -> Self {
        Self::builtin()
    }
}

fn reject(tag: RejectionTag, message: String) -> GuardrailRejection {
    warn!(target: "redline_splice::guardrails", %tag, %message, "guardrail rejected operation");
    GuardrailRejection::new(tag, message)
}

/// Rejects documents larger than `max_doc_bytes`.
///
/// # Errors
///
/// Returns a [`RejectionTag::DocTooLarge`] rejection.
pub fn check_document_size(
    operation: &str,
    size: u64,
    limits: &Limits,
) -> Result<(), GuardrailRejection> {
    if size <= limits.max_doc_bytes {
        return Ok(());
    }
    Err(reject(
        RejectionTag::DocTooLarge,
        format!(
            "Operation '{operation}' refused: document size {size} bytes exceeds max_doc_bytes={}.",
            limits.max_doc_bytes
        ),
    ))
}

/// Rejects patterns longer than `max_pattern_chars`.
///
/// # Errors
///
/// Returns a [`RejectionTag::LimitExceeded`] rejection.
pub fn check_pattern_length(pattern: &str, limits: &Limits) -> Result<(), GuardrailRejection> {
    let length = pattern.chars().count();
    if length <= limits.max_pattern_chars {
        return Ok(());
    }
    Err(reject(
        RejectionTag::LimitExceeded,
        format!(
            "Regex pattern too long: {length} characters exceeds max_pattern_chars={}.",
            limits.max_pattern_chars
        ),
    ))
}

/// Refuses a non-zero matching timeout the engine cannot enforce.
///
/// # Errors
///
/// Returns a [`RejectionTag::RegexComplexityBlocked`] rejection.
pub fn check_timeout_capability(
    limits: &Limits,
    capabilities: EngineCapabilities,
) -> Result<(), GuardrailRejection> {
    if limits.regex_timeout_ms == 0 || capabilities.supports_timeout {
        return Ok(());
    }
    Err(reject(
        RejectionTag::RegexComplexityBlocked,
        format!(
            "Regex timeout requested (regex_timeout_ms={}) but the matching engine cannot enforce timeouts; refusing to run without one.",
            limits.regex_timeout_ms
        ),
    ))
}

/// Rejects patterns whose structure resembles catastrophic backtracking.
///
/// The check is deliberately conservative: it refuses some patterns that
/// would run fine, and must never pass one that would not.
///
/// # Errors
///
/// Returns a [`RejectionTag::RegexComplexityBlocked`] rejection naming the
/// offending shape.
pub fn check_pattern_complexity(pattern: &str) -> Result<(), GuardrailRejection> {
    let shape = PatternShape::scan(pattern);
    let reason = if shape.repeated_wildcard_group {
        Some("repeated greedy wildcard group".to_owned())
    } else if shape.nested_quantifiers {
        Some("nested quantifiers".to_owned())
    } else if shape.alternations > MAX_ALTERNATIONS {
        Some(format!(
            "too many alternations ({} > {MAX_ALTERNATIONS})",
            shape.alternations
        ))
    } else {
        None
    };
    match reason {
        None => Ok(()),
        Some(reason) => Err(reject(
            RejectionTag::RegexComplexityBlocked,
            format!("Regex pattern refused: {reason}."),
        )),
    }
}

/// Rejects scans covering more than `max_scan_chars` of logical text.
///
/// # Errors
///
/// Returns a [`RejectionTag::LimitExceeded`] rejection.
pub fn check_scan_size(scan_chars: usize, limits: &Limits) -> Result<(), GuardrailRejection> {
    if scan_chars <= limits.max_scan_chars {
        return Ok(());
    }
    Err(reject(
        RejectionTag::LimitExceeded,
        format!(
            "Regex search refused due to scan-size guardrail: {scan_chars} characters exceeds max_scan_chars={}.",
            limits.max_scan_chars
        ),
    ))
}

/// Caps `text` to `max_chars` characters, marking the cut with
/// [`TRUNCATION_SUFFIX`].
#[must_use]
pub fn truncate_output(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let keep = max_chars.saturating_sub(TRUNCATION_SUFFIX.chars().count());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_SUFFIX);
    truncated
}

/// Cooperative matching deadline.
///
/// The built-in engine runs in linear time, so the deadline is checked
/// between match iterations and between blocks rather than inside the
/// automaton.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Option<Instant>,
    timeout_ms: u64,
}

impl Deadline {
    /// Starts a deadline of `timeout_ms`; zero never expires.
    #[must_use]
    pub fn start(timeout_ms: u64) -> Self {
        let expires_at =
            (timeout_ms > 0).then(|| Instant::now() + Duration::from_millis(timeout_ms));
        Self {
            expires_at,
            timeout_ms,
        }
    }

    /// A deadline that never expires.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            expires_at: None,
            timeout_ms: 0,
        }
    }

    /// Fails once the deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns a [`RejectionTag::RegexComplexityBlocked`] rejection.
    pub fn check(&self) -> Result<(), GuardrailRejection> {
        match self.expires_at {
            Some(expires_at) if Instant::now() >= expires_at => Err(reject(
                RejectionTag::RegexComplexityBlocked,
                format!(
                    "Regex matching exceeded regex_timeout_ms={}; no changes were made.",
                    self.timeout_ms
                ),
            )),
            _ => Ok(()),
        }
    }
}

/// Remaining replacements a single call may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplacementBudget {
    limit: usize,
    applied: usize,
    exhausted: bool,
}

impl ReplacementBudget {
    /// Starts a budget of `limit` replacements.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            limit,
            applied: 0,
            exhausted: false,
        }
    }

    /// Replacements still allowed.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.applied)
    }

    /// Replacements applied so far.
    #[must_use]
    pub const fn applied(&self) -> usize {
        self.applied
    }

    /// Configured ceiling.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Whether eligible matches were left untouched because of the cap.
    #[must_use]
    pub const fn cap_hit(&self) -> bool {
        self.exhausted
    }

    /// Records `eligible` matches offered, of which `applied` were taken.
    pub const fn record(&mut self, eligible: usize, applied: usize) {
        self.applied = self.applied.saturating_add(applied);
        if eligible > applied {
            self.exhausted = true;
        }
    }
}

#[derive(Debug, Default)]
struct GroupState {
    quantified_inside: bool,
    wildcard_inside: bool,
}

/// Structural summary of a pattern, gathered by a single left-to-right scan.
#[derive(Debug, Default, PartialEq, Eq)]
struct PatternShape {
    nested_quantifiers: bool,
    repeated_wildcard_group: bool,
    alternations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantifier {
    None,
    Optional,
    Repeat,
}

impl PatternShape {
    fn scan(pattern: &str) -> Self {
        let chars: Vec<char> = pattern.chars().collect();
        let mut shape = Self::default();
        let mut groups: Vec<GroupState> = vec![GroupState::default()];
        let mut cursor = 0;

        while let Some(&current) = chars.get(cursor) {
            cursor += 1;
            let wildcard_atom = match current {
                '\\' => {
                    let escaped = chars.get(cursor).copied();
                    cursor += 1;
                    matches!(escaped, Some('w' | 'W' | 's' | 'S' | 'd' | 'D'))
                }
                '[' => {
                    cursor = skip_class(&chars, cursor);
                    false
                }
                '.' => true,
                '|' => {
                    shape.alternations += 1;
                    continue;
                }
                '(' => {
                    if chars.get(cursor) == Some(&'?') {
                        let (next, opens_group) = skip_group_prefix(&chars, cursor);
                        cursor = next;
                        if !opens_group {
                            continue;
                        }
                    }
                    groups.push(GroupState::default());
                    continue;
                }
                ')' => {
                    let closed = if groups.len() > 1 {
                        groups.pop().unwrap_or_default()
                    } else {
                        GroupState::default()
                    };
                    let (quantifier, next) = read_quantifier(&chars, cursor);
                    cursor = next;
                    if quantifier == Quantifier::Repeat {
                        if closed.wildcard_inside {
                            shape.repeated_wildcard_group = true;
                        }
                        if closed.quantified_inside {
                            shape.nested_quantifiers = true;
                        }
                    }
                    if let Some(parent) = groups.last_mut() {
                        parent.quantified_inside |=
                            closed.quantified_inside || quantifier != Quantifier::None;
                        parent.wildcard_inside |= closed.wildcard_inside;
                    }
                    continue;
                }
                _ => false,
            };

            let (quantifier, next) = read_quantifier(&chars, cursor);
            cursor = next;
            if quantifier != Quantifier::None
                && let Some(group) = groups.last_mut()
            {
                group.quantified_inside = true;
                if wildcard_atom {
                    group.wildcard_inside = true;
                }
            }
        }
        shape
    }
}

/// Skips a bracketed class starting just after `[`, returning the index
/// after the closing `]`.
fn skip_class(chars: &[char], start: usize) -> usize {
    let mut cursor = start;
    if chars.get(cursor) == Some(&'^') {
        cursor += 1;
    }
    if chars.get(cursor) == Some(&']') {
        cursor += 1;
    }
    while let Some(&current) = chars.get(cursor) {
        cursor += 1;
        match current {
            '\\' => cursor += 1,
            '[' => cursor = skip_class(chars, cursor),
            ']' => return cursor,
            _ => {}
        }
    }
    cursor
}

/// Skips a `(?...` prefix. Returns the next index and whether a group was
/// opened (as opposed to a bare flag setting such as `(?i)`).
fn skip_group_prefix(chars: &[char], start: usize) -> (usize, bool) {
    let mut cursor = start;
    while let Some(&current) = chars.get(cursor) {
        cursor += 1;
        match current {
            ':' | '>' => return (cursor, true),
            ')' => return (cursor, false),
            _ => {}
        }
    }
    (cursor, false)
}

/// Reads a quantifier at `start`, including a trailing lazy or possessive
/// marker.
fn read_quantifier(chars: &[char], start: usize) -> (Quantifier, usize) {
    let (quantifier, mut cursor) = match chars.get(start) {
        Some('*' | '+') => (Quantifier::Repeat, start + 1),
        Some('?') => (Quantifier::Optional, start + 1),
        Some('{') => match counted_repetition_end(chars, start + 1) {
            Some(end) => (Quantifier::Repeat, end),
            None => (Quantifier::None, start),
        },
        _ => (Quantifier::None, start),
    };
    if quantifier != Quantifier::None && matches!(chars.get(cursor), Some('?' | '+')) {
        cursor += 1;
    }
    (quantifier, cursor)
}

/// Returns the index after `}` when `start` begins a `{n}`, `{n,}` or
/// `{n,m}` body.
fn counted_repetition_end(chars: &[char], start: usize) -> Option<usize> {
    let mut cursor = start;
    let mut saw_digit = false;
    while let Some(&current) = chars.get(cursor) {
        cursor += 1;
        match current {
            '0'..='9' => saw_digit = true,
            ',' | ' ' => {}
            '}' => return saw_digit.then_some(cursor),
            _ => return None,
        }
    }
    None
}
