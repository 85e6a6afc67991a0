//! Per-document undo/redo stacks under one lock.

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use redline_config::Limits;
use redline_document::storage;
use tracing::{debug, info, warn};

use crate::error::HistoryError;
use crate::report::{Direction, HistorySummary, StepOutcome, StepReport};

/// Canonical key under which a document's history is tracked.
///
/// Existing paths are canonicalised; paths that cannot be canonicalised are
/// made absolute instead.
#[must_use]
pub fn canonical_key(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Result of [`UndoManager::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// The current bytes were pushed onto the undo stack.
    Captured {
        /// Size of the snapshot in bytes.
        bytes: u64,
    },
    /// Nothing exists at the path yet.
    Skipped,
}

/// Document bytes read ahead of a write and recorded only once the write
/// has landed. Dropping it leaves the history untouched.
#[derive(Debug)]
#[must_use = "a pending snapshot is discarded unless recorded"]
pub struct PendingSnapshot {
    key: PathBuf,
    data: Vec<u8>,
}

impl PendingSnapshot {
    /// Canonical path the bytes were read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.key
    }
}

#[derive(Debug)]
struct Snapshot {
    seq: u64,
    data: Vec<u8>,
}

impl Snapshot {
    fn len(&self) -> u64 {
        u64::try_from(self.data.len()).unwrap_or(u64::MAX)
    }
}

#[derive(Debug, Default)]
struct Stacks {
    undo: VecDeque<Snapshot>,
    redo: VecDeque<Snapshot>,
}

impl Stacks {
    const fn stack_mut(&mut self, direction: Direction) -> &mut VecDeque<Snapshot> {
        match direction {
            Direction::Undo => &mut self.undo,
            Direction::Redo => &mut self.redo,
        }
    }
}

#[derive(Debug, Default)]
struct HistoryState {
    documents: BTreeMap<PathBuf, Stacks>,
    next_seq: u64,
    total_bytes: u64,
    evictions: u64,
}

impl HistoryState {
    fn stacks_mut(&mut self, key: &Path) -> &mut Stacks {
        self.documents.entry(key.to_path_buf()).or_default()
    }

    /// Pushes `data` onto `direction`'s stack of `key`.
    fn push(&mut self, key: &Path, direction: Direction, data: Vec<u8>) {
        let snapshot = Snapshot {
            seq: self.next_seq,
            data,
        };
        self.next_seq += 1;
        self.total_bytes = self.total_bytes.saturating_add(snapshot.len());
        self.stacks_mut(key).stack_mut(direction).push_back(snapshot);
    }

    /// Drops the oldest entries of `direction`'s stack of `key` beyond
    /// `max_depth`.
    fn trim(&mut self, key: &Path, direction: Direction, max_depth: usize) {
        let Some(stacks) = self.documents.get_mut(key) else {
            return;
        };
        let stack = stacks.stack_mut(direction);
        let mut dropped = 0_u64;
        while stack.len() > max_depth {
            if let Some(oldest) = stack.pop_front() {
                dropped = dropped.saturating_add(oldest.len());
            }
        }
        self.total_bytes = self.total_bytes.saturating_sub(dropped);
    }

    fn pop(&mut self, key: &Path, direction: Direction) -> Option<Snapshot> {
        let snapshot = self
            .documents
            .get_mut(key)?
            .stack_mut(direction)
            .pop_back()?;
        self.total_bytes = self.total_bytes.saturating_sub(snapshot.len());
        Some(snapshot)
    }

    /// Returns a popped snapshot to the top of its stack unchanged.
    fn restore(&mut self, key: &Path, direction: Direction, snapshot: Snapshot) {
        self.total_bytes = self.total_bytes.saturating_add(snapshot.len());
        self.stacks_mut(key).stack_mut(direction).push_back(snapshot);
    }

    fn clear_redo(&mut self, key: &Path) {
        let cleared: u64 = self
            .stacks_mut(key)
            .redo
            .drain(..)
            .map(|snapshot| snapshot.len())
            .sum();
        self.total_bytes = self.total_bytes.saturating_sub(cleared);
    }

    fn depth(&self, key: &Path, direction: Direction) -> usize {
        self.documents.get(key).map_or(0, |stacks| match direction {
            Direction::Undo => stacks.undo.len(),
            Direction::Redo => stacks.redo.len(),
        })
    }

    /// Evicts the globally oldest snapshot until the total fits `max_bytes`.
    fn enforce_budget(&mut self, max_bytes: u64) {
        while self.total_bytes > max_bytes {
            let oldest = self
                .documents
                .iter()
                .flat_map(|(path, stacks)| {
                    [
                        stacks.undo.front().map(|s| (s.seq, path, Direction::Undo)),
                        stacks.redo.front().map(|s| (s.seq, path, Direction::Redo)),
                    ]
                })
                .flatten()
                .min_by_key(|(seq, _, _)| *seq)
                .map(|(seq, path, direction)| (seq, path.clone(), direction));

            let Some((seq, path, direction)) = oldest else {
                break;
            };
            let evicted = self
                .documents
                .get_mut(&path)
                .and_then(|stacks| stacks.stack_mut(direction).pop_front());
            if let Some(snapshot) = evicted {
                self.total_bytes = self.total_bytes.saturating_sub(snapshot.len());
                self.evictions += 1;
                info!(
                    target: "redline_history",
                    path = %path.display(),
                    seq,
                    bytes = snapshot.len(),
                    "snapshot evicted by byte budget"
                );
            }
        }
    }

    fn summary(&self, key: &Path) -> HistorySummary {
        HistorySummary {
            path: key.to_path_buf(),
            undo_depth: self.depth(key, Direction::Undo),
            redo_depth: self.depth(key, Direction::Redo),
            total_snapshot_bytes: self.total_bytes,
            budget_evictions: self.evictions,
        }
    }
}

/// Keeps whole-document snapshots for undo and redo.
///
/// A single mutex guards every stack, the byte total and the eviction
/// counter, because eviction needs a consistent view across documents.
#[derive(Debug)]
pub struct UndoManager {
    state: Mutex<HistoryState>,
    max_depth: usize,
    max_bytes: u64,
}

impl UndoManager {
    /// Creates a manager with the given per-document depth and global byte
    /// budget.
    #[must_use]
    pub fn new(max_depth: usize, max_bytes: u64) -> Self {
        Self {
            state: Mutex::new(HistoryState::default()),
            max_depth,
            max_bytes,
        }
    }

    /// Creates a manager sized by `limits`.
    #[must_use]
    pub fn from_limits(limits: &Limits) -> Self {
        Self::new(limits.max_undo_depth, limits.max_undo_bytes)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HistoryState>, HistoryError> {
        self.state.lock().map_err(|_| HistoryError::LockPoisoned)
    }

    /// Captures the current bytes of `path` before it is modified.
    ///
    /// Clears the document's redo stack and then enforces the byte budget.
    /// Does nothing when no file exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Capture`] when the file exists but cannot be
    /// read, and [`HistoryError::LockPoisoned`] if the lock is poisoned.
    pub fn snapshot(&self, path: &Path) -> Result<SnapshotOutcome, HistoryError> {
        match self.capture(path)? {
            Some(pending) => self.record(pending),
            None => Ok(SnapshotOutcome::Skipped),
        }
    }

    /// Reads the current bytes of `path` without touching any stack.
    ///
    /// Returns `None` when no file exists at `path`. Pass the result to
    /// [`UndoManager::record`] once the mutation it guards has been written.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Capture`] when the file exists but cannot be
    /// read.
    pub fn capture(&self, path: &Path) -> Result<Option<PendingSnapshot>, HistoryError> {
        let key = canonical_key(path);
        if !key.is_file() {
            return Ok(None);
        }
        let data = fs::read(&key).map_err(|error| HistoryError::Capture {
            path: key.clone(),
            message: error.to_string(),
        })?;
        Ok(Some(PendingSnapshot { key, data }))
    }

    /// Pushes a captured snapshot onto its undo stack, clears the redo stack
    /// and enforces the depth cap and byte budget.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::LockPoisoned`] if the lock is poisoned.
    pub fn record(&self, pending: PendingSnapshot) -> Result<SnapshotOutcome, HistoryError> {
        let PendingSnapshot { key, data } = pending;
        let bytes = u64::try_from(data.len()).unwrap_or(u64::MAX);
        let mut state = self.lock()?;
        state.push(&key, Direction::Undo, data);
        state.trim(&key, Direction::Undo, self.max_depth);
        state.clear_redo(&key);
        state.enforce_budget(self.max_bytes);
        debug!(
            target: "redline_history",
            path = %key.display(),
            bytes,
            undo_depth = state.depth(&key, Direction::Undo),
            "snapshot captured"
        );
        Ok(SnapshotOutcome::Captured { bytes })
    }

    /// Restores up to `steps` earlier states of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidSteps`] for zero steps and
    /// [`HistoryError::Restore`] when writing a snapshot back fails.
    pub fn undo(&self, path: &Path, steps: usize) -> Result<StepOutcome, HistoryError> {
        self.step(path, steps, Direction::Undo)
    }

    /// Re-applies up to `steps` undone states of `path`.
    ///
    /// # Errors
    ///
    /// As for [`UndoManager::undo`].
    pub fn redo(&self, path: &Path, steps: usize) -> Result<StepOutcome, HistoryError> {
        self.step(path, steps, Direction::Redo)
    }

    fn step(
        &self,
        path: &Path,
        steps: usize,
        direction: Direction,
    ) -> Result<StepOutcome, HistoryError> {
        if steps < 1 {
            return Err(HistoryError::InvalidSteps);
        }
        let key = canonical_key(path);
        let mut state = self.lock()?;
        if state.depth(&key, direction) == 0 {
            return Ok(StepOutcome::NoHistory {
                direction,
                path: key,
            });
        }

        let opposite = match direction {
            Direction::Undo => Direction::Redo,
            Direction::Redo => Direction::Undo,
        };

        let mut applied = 0;
        while applied < steps {
            let Some(target) = state.pop(&key, direction) else {
                break;
            };

            let saved_current = match fs::read(&key) {
                Ok(current) => {
                    state.push(&key, opposite, current);
                    true
                }
                Err(error) => {
                    warn!(
                        target: "redline_history",
                        path = %key.display(),
                        %error,
                        "current bytes unreadable; step will not be reversible"
                    );
                    false
                }
            };

            if let Err(error) = storage::write_atomic(&key, &target.data) {
                if saved_current {
                    state.pop(&key, opposite);
                }
                state.restore(&key, direction, target);
                return Err(HistoryError::Restore {
                    direction,
                    path: key,
                    applied,
                    message: error.to_string(),
                });
            }

            applied += 1;
            if opposite == Direction::Undo {
                state.trim(&key, opposite, self.max_depth);
            }
            state.enforce_budget(self.max_bytes);
        }

        info!(
            target: "redline_history",
            path = %key.display(),
            ?direction,
            requested = steps,
            applied,
            "history step applied"
        );
        Ok(StepOutcome::Applied(StepReport {
            direction,
            path: key,
            requested: steps,
            applied,
        }))
    }

    /// Stack depths for `path` plus manager-wide budget figures.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::LockPoisoned`] if the lock is poisoned.
    pub fn summary(&self, path: &Path) -> Result<HistorySummary, HistoryError> {
        let key = canonical_key(path);
        Ok(self.lock()?.summary(&key))
    }

    /// Summaries for every tracked document, ordered by path.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::LockPoisoned`] if the lock is poisoned.
    pub fn summaries(&self) -> Result<Vec<HistorySummary>, HistoryError> {
        let state = self.lock()?;
        Ok(state
            .documents
            .keys()
            .map(|key| state.summary(key))
            .collect())
    }

    /// Forgets the history of `path`, or of every document when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::LockPoisoned`] if the lock is poisoned.
    pub fn clear(&self, path: Option<&Path>) -> Result<(), HistoryError> {
        let mut state = self.lock()?;
        match path {
            Some(path) => {
                let key = canonical_key(path);
                if let Some(stacks) = state.documents.remove(&key) {
                    let released: u64 = stacks
                        .undo
                        .iter()
                        .chain(stacks.redo.iter())
                        .map(Snapshot::len)
                        .sum();
                    state.total_bytes = state.total_bytes.saturating_sub(released);
                }
            }
            None => {
                state.documents.clear();
                state.total_bytes = 0;
            }
        }
        Ok(())
    }

    /// Snapshot bytes held across every tracked document.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::LockPoisoned`] if the lock is poisoned.
    pub fn total_bytes(&self) -> Result<u64, HistoryError> {
        Ok(self.lock()?.total_bytes)
    }
}
