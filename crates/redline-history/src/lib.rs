//! Snapshot Undo/Redo Manager.
//!
//! Before every mutation the whole document is captured as a byte snapshot.
//! Each document path owns an undo stack and a redo stack; every snapshot
//! carries a global sequence number so the byte budget shared by all
//! documents can always evict the oldest snapshot anywhere first.
//!
//! The manager is an owned service. Hosts construct one per process and
//! pass it to the operations that need it; tests build fresh instances.

mod error;
mod manager;
mod report;

pub use error::HistoryError;
pub use manager::{PendingSnapshot, SnapshotOutcome, UndoManager, canonical_key};
pub use report::{Direction, HistorySummary, StepOutcome, StepReport, UNDO_BUDGET_EXCEEDED};

#[cfg(test)]
mod tests;
