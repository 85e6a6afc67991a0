//! Block selection.

use std::collections::HashSet;

use redline_document::{Block, BlockAddress, Document};

use crate::error::SelectionError;

/// Which top-level paragraphs take part in a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// Every paragraph, plus every table-cell block.
    #[default]
    All,
    /// An explicit list of paragraph indices. Duplicates are ignored and the
    /// list is visited in ascending order.
    Indices(Vec<usize>),
    /// An inclusive paragraph range. Missing bounds default to the first and
    /// last paragraph.
    Range {
        /// First paragraph, inclusive.
        start: Option<usize>,
        /// Last paragraph, inclusive.
        end: Option<usize>,
    },
}

impl Selection {
    /// Returns `true` when the selection names paragraphs explicitly.
    #[must_use]
    pub const fn is_scoped(&self) -> bool {
        !matches!(self, Self::All)
    }
}

/// Ordered blocks to scan: top-level paragraphs, then table-cell blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockPlan {
    /// Selected top-level paragraphs in ascending order.
    pub paragraphs: Vec<BlockAddress>,
    /// Table-cell blocks in document order.
    pub cells: Vec<BlockAddress>,
}

impl BlockPlan {
    /// Every planned block in visiting order.
    pub fn addresses(&self) -> impl Iterator<Item = BlockAddress> + '_ {
        self.paragraphs.iter().chain(self.cells.iter()).copied()
    }

    /// The planned blocks of `document`, found in a single walk of its body.
    ///
    /// Blocks come back in document order, which is the visiting order for
    /// plans built by [`select_blocks`]. Addresses the document lacks are
    /// skipped.
    #[must_use]
    pub fn resolve<'d>(&self, document: &'d Document) -> Vec<(BlockAddress, &'d Block)> {
        let wanted: HashSet<BlockAddress> = self.addresses().collect();
        document
            .blocks()
            .filter(|(address, _)| wanted.contains(address))
            .collect()
    }

    /// Number of planned blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paragraphs.len() + self.cells.len()
    }

    /// Returns `true` when nothing is planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Plans which blocks of `document` a pass visits.
///
/// Table-cell blocks have their own address space and are only visited for
/// [`Selection::All`]; explicit indices and ranges address top-level
/// paragraphs only. A document without paragraphs is not an error for
/// [`Selection::All`].
///
/// # Errors
///
/// Returns a [`SelectionError`] for out-of-bounds indices or inverted
/// ranges.
pub fn select_blocks(
    document: &Document,
    selection: &Selection,
) -> Result<BlockPlan, SelectionError> {
    let count = document.paragraph_count();
    match selection {
        Selection::All => Ok(BlockPlan {
            paragraphs: (0..count).map(BlockAddress::Paragraph).collect(),
            cells: document.cell_addresses(),
        }),
        Selection::Indices(indices) => {
            let mut sorted = indices.clone();
            sorted.sort_unstable();
            sorted.dedup();
            if let Some(&index) = sorted.iter().find(|index| **index >= count) {
                return Err(SelectionError::IndexOutOfRange { index, count });
            }
            Ok(BlockPlan {
                paragraphs: sorted.into_iter().map(BlockAddress::Paragraph).collect(),
                cells: Vec::new(),
            })
        }
        Selection::Range { start, end } => {
            let first = start.unwrap_or(0);
            let last = match end {
                Some(last) => *last,
                None => count.saturating_sub(1),
            };
            if first > last {
                return Err(SelectionError::InvertedRange {
                    start: first,
                    end: last,
                });
            }
            if last >= count {
                return Err(SelectionError::RangeOutOfBounds {
                    start: first,
                    end: last,
                    count,
                });
            }
            Ok(BlockPlan {
                paragraphs: (first..=last).map(BlockAddress::Paragraph).collect(),
                cells: Vec::new(),
            })
        }
    }
}
