//! Text Locator & Splice Engine with its guardrails.
//!
//! Matching runs over a block's logical text, the concatenation of its
//! fragment texts, so matches may span fragment boundaries. Replacement
//! rewrites only the fragments a match touches:
//!
//! - [`guardrails`] holds the preflight checks (document size, pattern
//!   length and complexity, timeout capability, scan size), the per-call
//!   replacement budget and output truncation.
//! - [`select_blocks`] plans which blocks a pass visits.
//! - [`splice_block`] rewrites one block; [`splice_document`] drives a pass
//!   across a whole document with document-wide occurrence counting.

mod backrefs;
mod case;
mod engine;
mod error;
pub mod guardrails;
mod pattern;
mod selector;
mod splice;

pub use backrefs::expand as expand_backreferences;
pub use case::preserve_case;
pub use engine::{DocumentSplice, splice_document};
pub use error::{GuardrailRejection, RejectionTag, SelectionError, SpliceError};
pub use guardrails::{Deadline, EngineCapabilities};
pub use pattern::{COMPILED_SIZE_LIMIT, MatchPattern, MatchSpan, PatternKind, PatternSpec};
pub use selector::{BlockPlan, Selection, select_blocks};
pub use splice::{BlockSplice, Replacement, SpliceRequest, splice_block};

#[cfg(test)]
mod tests;
