//! Back-reference expansion for regular-expression replacements.
//!
//! Supported tokens: `$&` and `$0` for the whole match, `$1` to `$99` for
//! numbered groups, `${name}` or `${N}` for named or numbered groups, and
//! `$$` for a literal dollar. Two-digit references fall back to one digit
//! when the pattern has fewer groups. References to groups that did not
//! participate in the match expand to nothing; a `$` that starts no token
//! is kept verbatim.

use std::ops::Range;

use crate::pattern::{MatchPattern, MatchSpan};

/// Expands `template` against `span`, a match found in `text` by `pattern`.
#[must_use]
pub fn expand(template: &str, pattern: &MatchPattern, text: &str, span: &MatchSpan) -> String {
    let group_text = |index: usize| captured(text, span, index);

    let mut expanded = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(position) = rest.find('$') {
        let (literal, tail) = rest.split_at(position);
        expanded.push_str(literal);
        let after = tail.get(1..).unwrap_or("");
        let mut chars = after.chars();
        match chars.next() {
            Some('$') => {
                expanded.push('$');
                rest = chars.as_str();
            }
            Some('&') => {
                expanded.push_str(group_text(0));
                rest = chars.as_str();
            }
            Some('{') => match after.find('}') {
                Some(close) => {
                    let name = after.get(1..close).unwrap_or("");
                    let index = name
                        .parse::<usize>()
                        .ok()
                        .or_else(|| pattern.group_index(name));
                    if let Some(index) = index {
                        expanded.push_str(group_text(index));
                    }
                    rest = after.get(close + 1..).unwrap_or("");
                }
                None => {
                    expanded.push('$');
                    rest = after;
                }
            },
            Some(first) if first.is_ascii_digit() => {
                let (index, consumed) = numbered_reference(after, span.groups.len());
                expanded.push_str(group_text(index));
                rest = after.get(consumed..).unwrap_or("");
            }
            _ => {
                expanded.push('$');
                rest = after;
            }
        }
    }
    expanded.push_str(rest);
    expanded
}

fn captured<'t>(text: &'t str, span: &MatchSpan, index: usize) -> &'t str {
    span.groups
        .get(index)
        .cloned()
        .flatten()
        .and_then(|range: Range<usize>| text.get(range))
        .unwrap_or("")
}

/// Parses a one- or two-digit group number at the start of `digits`,
/// preferring two digits when such a group exists.
fn numbered_reference(digits: &str, group_count: usize) -> (usize, usize) {
    let mut values = digits
        .chars()
        .map_while(|ch| ch.to_digit(10))
        .map(|digit| usize::try_from(digit).unwrap_or_default());
    let first = values.next().unwrap_or(0);
    match values.next() {
        Some(second) if first * 10 + second < group_count => (first * 10 + second, 2),
        _ => (first, 1),
    }
}
