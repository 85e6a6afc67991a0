//! Document-wide replacement pass.

use std::collections::HashMap;

use redline_config::Limits;
use redline_document::{BlockAddress, Document, Fragment};
use tracing::debug;

use crate::error::GuardrailRejection;
use crate::guardrails::{Deadline, ReplacementBudget, check_scan_size};
use crate::selector::BlockPlan;
use crate::splice::{SpliceRequest, splice_spans};

/// Outcome of a document-wide pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSplice {
    /// Replacements applied across all blocks.
    pub applied: usize,
    /// Matches seen in the blocks that were scanned, before filtering.
    pub total_matches: usize,
    /// Whether eligible matches were left untouched by the per-call cap.
    pub cap_hit: bool,
    /// Blocks whose fragments changed, in visiting order.
    pub changed: Vec<BlockAddress>,
}

impl DocumentSplice {
    /// Returns `true` when at least one replacement was applied.
    #[must_use]
    pub const fn modified(&self) -> bool {
        self.applied > 0
    }
}

/// Runs `request` over the blocks in `plan`.
///
/// `occurrence` is document-wide: blocks are visited in plan order while a
/// running total of each block's unfiltered match count is kept, and the
/// block in which that total reaches the ordinal receives the remainder as
/// its block-local ordinal. Scanning stops after that block, or once the
/// per-call cap leaves an eligible match untouched.
///
/// The document is only modified when the whole pass succeeds.
///
/// # Errors
///
/// Returns a rejection when a regular-expression scan would exceed
/// `max_scan_chars` or when `deadline` passes.
pub fn splice_document(
    document: &mut Document,
    plan: &BlockPlan,
    request: &SpliceRequest,
    occurrence: Option<usize>,
    limits: &Limits,
    deadline: &Deadline,
) -> Result<DocumentSplice, GuardrailRejection> {
    let blocks = plan.resolve(document);
    if request.pattern().is_regex() {
        let scan_chars = blocks
            .iter()
            .map(|(_, block)| block.logical_text().chars().count())
            .sum();
        check_scan_size(scan_chars, limits)?;
    }

    let mut budget = ReplacementBudget::new(limits.max_matches_per_call);
    let mut seen = 0_usize;
    let mut total_matches = 0_usize;
    let mut changed = Vec::new();
    let mut edits: HashMap<BlockAddress, Vec<Fragment>> = HashMap::new();

    for (address, block) in blocks {
        deadline.check()?;
        let text = block.logical_text();
        let spans = request.pattern().find_spans(&text, deadline)?;
        let block_total = spans.len();
        total_matches += block_total;

        let local = match occurrence {
            None => None,
            Some(target) if seen + block_total < target => {
                seen += block_total;
                continue;
            }
            Some(target) => Some(target - seen),
        };

        let spliced = splice_spans(block, &text, spans, request, local, budget.remaining());
        budget.record(spliced.eligible, spliced.applied);
        if spliced.applied > 0 {
            debug!(
                target: "redline_splice",
                block = %address,
                applied = spliced.applied,
                "block rewritten"
            );
            changed.push(address);
            edits.insert(address, spliced.fragments);
        }
        if local.is_some() || budget.cap_hit() {
            break;
        }
    }

    if !edits.is_empty() {
        for (address, block) in document.blocks_mut() {
            if let Some(fragments) = edits.remove(&address) {
                block.fragments = fragments;
            }
        }
    }

    Ok(DocumentSplice {
        applied: budget.applied(),
        total_matches,
        cap_hit: budget.cap_hit(),
        changed,
    })
}
