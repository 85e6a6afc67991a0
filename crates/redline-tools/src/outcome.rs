//! Rendering of operation results as caller-facing text.

use std::fmt;

use redline_config::Limits;
use redline_splice::guardrails::truncate_output;

use crate::error::EditError;

/// Renders `result` as the text returned to a caller.
///
/// Successes and failures alike are capped at `max_output_chars`.
#[must_use]
pub fn render<T: fmt::Display>(result: &Result<T, EditError>, limits: &Limits) -> String {
    let text = match result {
        Ok(outcome) => outcome.to_string(),
        Err(error) => error.to_string(),
    };
    truncate_output(&text, limits.max_output_chars)
}
