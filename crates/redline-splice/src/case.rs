//! Case-shape transfer for case-insensitive literal replacement.

/// Shape of the letter case in a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseShape {
    Upper,
    Lower,
    Capitalised,
    Mixed,
}

fn is_cased(ch: char) -> bool {
    ch.is_uppercase() || ch.is_lowercase()
}

fn all_upper(text: &str) -> bool {
    text.chars().any(is_cased) && !text.chars().any(char::is_lowercase)
}

fn all_lower(text: &str) -> bool {
    text.chars().any(is_cased) && !text.chars().any(char::is_uppercase)
}

fn shape_of(text: &str) -> CaseShape {
    if all_upper(text) {
        return CaseShape::Upper;
    }
    if all_lower(text) {
        return CaseShape::Lower;
    }
    let mut chars = text.chars();
    let first_upper = chars.next().is_some_and(char::is_uppercase);
    if first_upper && all_lower(chars.as_str()) {
        CaseShape::Capitalised
    } else {
        CaseShape::Mixed
    }
}

fn capitalise(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first
            .to_uppercase()
            .chain(chars.as_str().chars().flat_map(char::to_lowercase))
            .collect()
    })
}

/// Re-cases `replacement` to follow the case shape of `matched`.
///
/// All-upper and all-lower originals force the replacement to that case; a
/// capitalised original capitalises the replacement. Any other shape is
/// copied position by position, leaving characters beyond the original's
/// length untouched.
#[must_use]
pub fn preserve_case(matched: &str, replacement: &str) -> String {
    if matched.is_empty() || replacement.is_empty() {
        return replacement.to_owned();
    }
    match shape_of(matched) {
        CaseShape::Upper => replacement.to_uppercase(),
        CaseShape::Lower => replacement.to_lowercase(),
        CaseShape::Capitalised => capitalise(replacement),
        CaseShape::Mixed => {
            let mut template = matched.chars();
            replacement
                .chars()
                .flat_map(|ch| {
                    let recased: Vec<char> = match template.next() {
                        Some(source) if source.is_uppercase() => ch.to_uppercase().collect(),
                        Some(_) => ch.to_lowercase().collect(),
                        None => vec![ch],
                    };
                    recased
                })
                .collect()
        }
    }
}
