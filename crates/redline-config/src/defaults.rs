//! Built-in defaults and floors for every configurable ceiling.
//!
//! Each guardrail ceiling has a safe default and a floor. Values configured
//! below the floor are ignored in favour of the default; see
//! [`crate::Limits::from_config`].

/// Default log filter expression used by hosting binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Largest document, in bytes, any single operation will open.
pub const DEFAULT_MAX_DOC_BYTES: u64 = 50_000_000;
/// Smallest accepted value for [`DEFAULT_MAX_DOC_BYTES`].
pub const MIN_MAX_DOC_BYTES: u64 = 1_024;

/// Longest accepted regular-expression pattern, in characters.
pub const DEFAULT_MAX_PATTERN_CHARS: u64 = 5_000;
/// Smallest accepted value for [`DEFAULT_MAX_PATTERN_CHARS`].
pub const MIN_MAX_PATTERN_CHARS: u64 = 1;

/// Largest amount of logical text, in characters, a pattern scan may cover.
pub const DEFAULT_MAX_SCAN_CHARS: u64 = 2_000_000;
/// Smallest accepted value for [`DEFAULT_MAX_SCAN_CHARS`].
pub const MIN_MAX_SCAN_CHARS: u64 = 1;

/// Most replacements a single call may apply.
pub const DEFAULT_MAX_MATCHES_PER_CALL: u64 = 1_000;
/// Smallest accepted value for [`DEFAULT_MAX_MATCHES_PER_CALL`].
pub const MIN_MAX_MATCHES_PER_CALL: u64 = 1;

/// Longest textual result payload, in characters.
pub const DEFAULT_MAX_OUTPUT_CHARS: u64 = 200_000;
/// Smallest accepted value for [`DEFAULT_MAX_OUTPUT_CHARS`].
pub const MIN_MAX_OUTPUT_CHARS: u64 = 256;

/// Aggregate snapshot bytes retained across every tracked document.
pub const DEFAULT_MAX_UNDO_BYTES: u64 = 200_000_000;
/// Smallest accepted value for [`DEFAULT_MAX_UNDO_BYTES`].
pub const MIN_MAX_UNDO_BYTES: u64 = 1_024;

/// Undo stack depth per document.
pub const DEFAULT_MAX_UNDO_DEPTH: u64 = 20;
/// Smallest accepted value for [`DEFAULT_MAX_UNDO_DEPTH`].
pub const MIN_MAX_UNDO_DEPTH: u64 = 1;

/// Reads through one session handle before a consistency warning is attached.
pub const DEFAULT_SESSION_OP_LIMIT: u64 = 2_000;
/// Smallest accepted value for [`DEFAULT_SESSION_OP_LIMIT`].
pub const MIN_SESSION_OP_LIMIT: u64 = 1;

/// Pattern-matching deadline in milliseconds; zero disables the deadline.
pub const DEFAULT_REGEX_TIMEOUT_MS: u64 = 0;
/// Smallest accepted value for [`DEFAULT_REGEX_TIMEOUT_MS`].
pub const MIN_REGEX_TIMEOUT_MS: u64 = 0;

/// Longest an external equation converter may run, in milliseconds.
pub const DEFAULT_CONVERTER_TIMEOUT_MS: u64 = 30_000;
/// Smallest accepted value for [`DEFAULT_CONVERTER_TIMEOUT_MS`].
pub const MIN_CONVERTER_TIMEOUT_MS: u64 = 1;

/// Default log filter expression used by hosting binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for hosting binaries.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}
