//! Shared configuration for the redline document editing services.
//!
//! [`Config`] layers built-in defaults, an optional configuration file,
//! `REDLINE_*` environment variables and command-line flags through
//! `ortho_config`. Editing code never reads [`Config`] directly: it consumes
//! the validated [`Limits`] snapshot derived from it.

mod defaults;
mod limits;
mod logging;

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::*;
pub use limits::{Limits, SETTINGS, Setting};
pub use logging::{LogFormat, LogFormatParseError};

/// Layered configuration for hosts embedding the editing services.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "REDLINE")]
pub struct Config {
    /// Tracing filter expression, for example `info` or `redline_tools=debug`.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output encoding for log events.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Largest document, in bytes, an operation will open.
    #[ortho_config(default = DEFAULT_MAX_DOC_BYTES)]
    pub max_doc_bytes: u64,
    /// Longest regular-expression pattern accepted, in characters.
    #[ortho_config(default = DEFAULT_MAX_PATTERN_CHARS)]
    pub max_pattern_chars: u64,
    /// Largest amount of logical text, in characters, one regex scan covers.
    #[ortho_config(default = DEFAULT_MAX_SCAN_CHARS)]
    pub max_scan_chars: u64,
    /// Most replacements applied by a single call.
    #[ortho_config(default = DEFAULT_MAX_MATCHES_PER_CALL)]
    pub max_matches_per_call: u64,
    /// Longest textual result, in characters.
    #[ortho_config(default = DEFAULT_MAX_OUTPUT_CHARS)]
    pub max_output_chars: u64,
    /// Aggregate snapshot bytes retained by the history manager.
    #[ortho_config(default = DEFAULT_MAX_UNDO_BYTES)]
    pub max_undo_bytes: u64,
    /// Per-document undo depth.
    #[ortho_config(default = DEFAULT_MAX_UNDO_DEPTH)]
    pub max_undo_depth: u64,
    /// Reads per session handle before a consistency warning is attached.
    #[ortho_config(default = DEFAULT_SESSION_OP_LIMIT)]
    pub session_op_limit: u64,
    /// Pattern-matching deadline in milliseconds; zero disables it.
    #[ortho_config(default = DEFAULT_REGEX_TIMEOUT_MS)]
    pub regex_timeout_ms: u64,
    /// Deadline for one external equation conversion, in milliseconds.
    #[ortho_config(default = DEFAULT_CONVERTER_TIMEOUT_MS)]
    pub converter_timeout_ms: u64,
}

impl Config {
    /// Loads configuration from the process arguments, environment and files.
    ///
    /// # Errors
    ///
    /// Returns the aggregated `ortho_config` error when any source is
    /// malformed.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load()
    }

    /// Loads configuration using `args` in place of the process arguments.
    ///
    /// The first item is treated as the binary name.
    ///
    /// # Errors
    ///
    /// Returns the aggregated `ortho_config` error when any source is
    /// malformed.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output encoding for log events.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Validated guardrail ceilings derived from this configuration.
    #[must_use]
    pub fn limits(&self) -> Limits {
        Limits::from_config(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            max_doc_bytes: DEFAULT_MAX_DOC_BYTES,
            max_pattern_chars: DEFAULT_MAX_PATTERN_CHARS,
            max_scan_chars: DEFAULT_MAX_SCAN_CHARS,
            max_matches_per_call: DEFAULT_MAX_MATCHES_PER_CALL,
            max_output_chars: DEFAULT_MAX_OUTPUT_CHARS,
            max_undo_bytes: DEFAULT_MAX_UNDO_BYTES,
            max_undo_depth: DEFAULT_MAX_UNDO_DEPTH,
            session_op_limit: DEFAULT_SESSION_OP_LIMIT,
            regex_timeout_ms: DEFAULT_REGEX_TIMEOUT_MS,
            converter_timeout_ms: DEFAULT_CONVERTER_TIMEOUT_MS,
        }
    }
}
