//! Fragment formatting profiles and colour normalisation.

use std::fmt;

use serde::{Deserialize, Serialize};

const NAMED_COLORS: [(&str, [u8; 3]); 18] = [
    ("red", [255, 0, 0]),
    ("blue", [0, 0, 255]),
    ("green", [0, 128, 0]),
    ("yellow", [255, 255, 0]),
    ("black", [0, 0, 0]),
    ("gray", [128, 128, 128]),
    ("white", [255, 255, 255]),
    ("purple", [128, 0, 128]),
    ("orange", [255, 165, 0]),
    ("brown", [165, 42, 42]),
    ("pink", [255, 192, 203]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("lime", [0, 255, 0]),
    ("navy", [0, 0, 128]),
    ("maroon", [128, 0, 0]),
    ("olive", [128, 128, 0]),
    ("teal", [0, 128, 128]),
];

/// An RGB text colour.
///
/// Parsing never fails: named colours and 3- or 6-digit hex codes (with or
/// without a leading `#`) are recognised and anything else becomes black.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Color {
    rgb: [u8; 3],
}

impl Color {
    /// Black, the fallback for unrecognised input.
    pub const BLACK: Self = Self { rgb: [0, 0, 0] };

    /// Builds a colour from its components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            rgb: [red, green, blue],
        }
    }

    /// Normalises a colour name or hex code.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let lowered = trimmed.to_ascii_lowercase();
        if let Some((_, rgb)) = NAMED_COLORS.iter().find(|(name, _)| *name == lowered) {
            return Self { rgb: *rgb };
        }
        parse_hex(trimmed.trim_start_matches('#')).unwrap_or(Self::BLACK)
    }

    /// Red, green and blue components.
    #[must_use]
    pub const fn rgb(&self) -> [u8; 3] {
        self.rgb
    }
}

fn parse_hex(code: &str) -> Option<Color> {
    let digits: Vec<u8> = code
        .chars()
        .map(|ch| ch.to_digit(16).and_then(|digit| u8::try_from(digit).ok()))
        .collect::<Option<_>>()?;
    let expanded: Vec<u8> = match digits.len() {
        3 => digits.iter().flat_map(|digit| [*digit, *digit]).collect(),
        6 => digits,
        _ => return None,
    };
    let mut rgb = [0_u8; 3];
    for (slot, pair) in rgb.iter_mut().zip(expanded.chunks_exact(2)) {
        let [high, low] = pair else { return None };
        *slot = high * 16 + low;
    }
    Some(Color { rgb })
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [red, green, blue] = self.rgb;
        write!(f, "{red:02X}{green:02X}{blue:02X}")
    }
}

impl From<String> for Color {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

/// Formatting profile carried by a fragment.
///
/// Every attribute is optional; `None` means "inherit from the surrounding
/// style" rather than "off".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formatting {
    /// Bold weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    /// Italic style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    /// Single underline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    /// Text colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Font family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    /// Font size in points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
}

impl Formatting {
    /// Returns `true` when no attribute is set.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self == &Self::default()
    }

    /// Layers `overrides` on top of this profile. Attributes left unset in
    /// `overrides` keep their current value.
    #[must_use]
    pub fn layered(&self, overrides: &Self) -> Self {
        Self {
            bold: overrides.bold.or(self.bold),
            italic: overrides.italic.or(self.italic),
            underline: overrides.underline.or(self.underline),
            color: overrides.color.or(self.color),
            font_name: overrides
                .font_name
                .clone()
                .or_else(|| self.font_name.clone()),
            font_size: overrides.font_size.or(self.font_size),
        }
    }
}
