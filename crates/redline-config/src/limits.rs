//! Validated guardrail ceilings.

use tracing::warn;

use crate::Config;
use crate::defaults::{
    DEFAULT_CONVERTER_TIMEOUT_MS, DEFAULT_MAX_DOC_BYTES, DEFAULT_MAX_MATCHES_PER_CALL,
    DEFAULT_MAX_OUTPUT_CHARS, DEFAULT_MAX_PATTERN_CHARS, DEFAULT_MAX_SCAN_CHARS,
    DEFAULT_MAX_UNDO_BYTES, DEFAULT_MAX_UNDO_DEPTH, DEFAULT_REGEX_TIMEOUT_MS,
    DEFAULT_SESSION_OP_LIMIT, MIN_CONVERTER_TIMEOUT_MS, MIN_MAX_DOC_BYTES,
    MIN_MAX_MATCHES_PER_CALL, MIN_MAX_OUTPUT_CHARS, MIN_MAX_PATTERN_CHARS, MIN_MAX_SCAN_CHARS,
    MIN_MAX_UNDO_BYTES, MIN_MAX_UNDO_DEPTH, MIN_REGEX_TIMEOUT_MS, MIN_SESSION_OP_LIMIT,
};

/// A single configurable ceiling: its key, built-in default and floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting {
    /// Configuration key, matching the [`Config`] field name.
    pub name: &'static str,
    /// Value used when nothing valid is configured.
    pub default: u64,
    /// Smallest accepted value.
    pub floor: u64,
}

impl Setting {
    const fn new(name: &'static str, default: u64, floor: u64) -> Self {
        Self {
            name,
            default,
            floor,
        }
    }

    /// Returns `configured` when it is at or above the floor, otherwise the
    /// default. Rejected values are reported at `warn` level.
    #[must_use]
    pub fn resolve(&self, configured: u64) -> u64 {
        if configured >= self.floor {
            return configured;
        }
        warn!(
            target: "redline_config",
            setting = self.name,
            configured,
            floor = self.floor,
            default = self.default,
            "configured value below floor; using default"
        );
        self.default
    }
}

const MAX_DOC_BYTES: Setting =
    Setting::new("max_doc_bytes", DEFAULT_MAX_DOC_BYTES, MIN_MAX_DOC_BYTES);
const MAX_PATTERN_CHARS: Setting = Setting::new(
    "max_pattern_chars",
    DEFAULT_MAX_PATTERN_CHARS,
    MIN_MAX_PATTERN_CHARS,
);
const MAX_SCAN_CHARS: Setting =
    Setting::new("max_scan_chars", DEFAULT_MAX_SCAN_CHARS, MIN_MAX_SCAN_CHARS);
const MAX_MATCHES_PER_CALL: Setting = Setting::new(
    "max_matches_per_call",
    DEFAULT_MAX_MATCHES_PER_CALL,
    MIN_MAX_MATCHES_PER_CALL,
);
const MAX_OUTPUT_CHARS: Setting = Setting::new(
    "max_output_chars",
    DEFAULT_MAX_OUTPUT_CHARS,
    MIN_MAX_OUTPUT_CHARS,
);
const MAX_UNDO_BYTES: Setting =
    Setting::new("max_undo_bytes", DEFAULT_MAX_UNDO_BYTES, MIN_MAX_UNDO_BYTES);
const MAX_UNDO_DEPTH: Setting =
    Setting::new("max_undo_depth", DEFAULT_MAX_UNDO_DEPTH, MIN_MAX_UNDO_DEPTH);
const SESSION_OP_LIMIT: Setting = Setting::new(
    "session_op_limit",
    DEFAULT_SESSION_OP_LIMIT,
    MIN_SESSION_OP_LIMIT,
);
const REGEX_TIMEOUT_MS: Setting = Setting::new(
    "regex_timeout_ms",
    DEFAULT_REGEX_TIMEOUT_MS,
    MIN_REGEX_TIMEOUT_MS,
);

const CONVERTER_TIMEOUT_MS: Setting = Setting::new(
    "converter_timeout_ms",
    DEFAULT_CONVERTER_TIMEOUT_MS,
    MIN_CONVERTER_TIMEOUT_MS,
);

/// Every ceiling the guardrails enforce, in configuration order.
pub const SETTINGS: [Setting; 10] = [
    MAX_DOC_BYTES,
    MAX_PATTERN_CHARS,
    MAX_SCAN_CHARS,
    MAX_MATCHES_PER_CALL,
    MAX_OUTPUT_CHARS,
    MAX_UNDO_BYTES,
    MAX_UNDO_DEPTH,
    SESSION_OP_LIMIT,
    REGEX_TIMEOUT_MS,
    CONVERTER_TIMEOUT_MS,
];

/// Immutable snapshot of the guardrail ceilings.
///
/// Constructed once by the host and passed to each component; nothing reads
/// configuration after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest document, in bytes, an operation will open.
    pub max_doc_bytes: u64,
    /// Longest regular-expression pattern accepted, in characters.
    pub max_pattern_chars: usize,
    /// Largest logical text, in characters, a regex scan covers.
    pub max_scan_chars: usize,
    /// Most replacements applied by one call.
    pub max_matches_per_call: usize,
    /// Longest textual result, in characters.
    pub max_output_chars: usize,
    /// Aggregate snapshot bytes the history manager retains.
    pub max_undo_bytes: u64,
    /// Per-document undo depth.
    pub max_undo_depth: usize,
    /// Reads per session handle before a consistency warning is attached.
    pub session_op_limit: u64,
    /// Pattern-matching deadline in milliseconds; zero disables it.
    pub regex_timeout_ms: u64,
    /// Deadline for one external equation conversion, in milliseconds.
    pub converter_timeout_ms: u64,
}

impl Limits {
    /// Builds limits from `config`, replacing below-floor values with the
    /// built-in default.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_doc_bytes: MAX_DOC_BYTES.resolve(config.max_doc_bytes),
            max_pattern_chars: to_usize(MAX_PATTERN_CHARS.resolve(config.max_pattern_chars)),
            max_scan_chars: to_usize(MAX_SCAN_CHARS.resolve(config.max_scan_chars)),
            max_matches_per_call: to_usize(
                MAX_MATCHES_PER_CALL.resolve(config.max_matches_per_call),
            ),
            max_output_chars: to_usize(MAX_OUTPUT_CHARS.resolve(config.max_output_chars)),
            max_undo_bytes: MAX_UNDO_BYTES.resolve(config.max_undo_bytes),
            max_undo_depth: to_usize(MAX_UNDO_DEPTH.resolve(config.max_undo_depth)),
            session_op_limit: SESSION_OP_LIMIT.resolve(config.session_op_limit),
            regex_timeout_ms: REGEX_TIMEOUT_MS.resolve(config.regex_timeout_ms),
            converter_timeout_ms: CONVERTER_TIMEOUT_MS.resolve(config.converter_timeout_ms),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}
