//! Unit tests for the undo manager.

use std::fs;
use std::path::{Path, PathBuf};

use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::{
    Direction, HistoryError, SnapshotOutcome, StepOutcome, UNDO_BUDGET_EXCEEDED, UndoManager,
    canonical_key,
};

#[fixture]
fn workspace() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

fn document(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write document");
    path
}

fn contents(path: &Path) -> Vec<u8> {
    fs::read(path).expect("read document")
}

#[rstest]
fn snapshot_of_missing_file_is_skipped(workspace: TempDir) {
    let manager = UndoManager::new(20, 1_000_000);
    let outcome = manager
        .snapshot(&workspace.path().join("absent.json"))
        .expect("snapshot");
    assert_eq!(outcome, SnapshotOutcome::Skipped);
    assert!(manager.summaries().expect("summaries").is_empty());
}

#[rstest]
fn undo_then_redo_restores_exact_bytes(workspace: TempDir) {
    let manager = UndoManager::new(20, 1_000_000);
    let path = document(&workspace, "doc.json", b"before");

    let outcome = manager.snapshot(&path).expect("snapshot");
    assert_eq!(outcome, SnapshotOutcome::Captured { bytes: 6 });
    fs::write(&path, b"after edit").expect("edit");

    let undone = manager.undo(&path, 1).expect("undo");
    assert_eq!(undone.applied(), 1);
    assert_eq!(contents(&path), b"before");

    let redone = manager.redo(&path, 1).expect("redo");
    assert_eq!(redone.applied(), 1);
    assert_eq!(contents(&path), b"after edit");
}

#[rstest]
fn multi_step_undo_reports_requested_and_applied(workspace: TempDir) {
    let manager = UndoManager::new(20, 1_000_000);
    let path = document(&workspace, "doc.json", b"v1");
    for next in [b"v2", b"v3"] {
        manager.snapshot(&path).expect("snapshot");
        fs::write(&path, next).expect("edit");
    }

    let outcome = manager.undo(&path, 5).expect("undo");
    assert_eq!(contents(&path), b"v1");
    assert_eq!(
        outcome.to_string(),
        format!(
            "Undo successful (requested 5, restored 2) for {}",
            canonical_key(&path).display()
        )
    );

    let summary = manager.summary(&path).expect("summary");
    assert_eq!((summary.undo_depth, summary.redo_depth), (0, 2));
}

#[rstest]
fn undo_without_history_reports_no_history(workspace: TempDir) {
    let manager = UndoManager::new(20, 1_000_000);
    let path = document(&workspace, "doc.json", b"data");

    let outcome = manager.undo(&path, 1).expect("undo");
    assert_eq!(
        outcome,
        StepOutcome::NoHistory {
            direction: Direction::Undo,
            path: canonical_key(&path),
        }
    );
    assert!(outcome.to_string().starts_with("No undo history for "));
    assert_eq!(
        manager.redo(&path, 1).expect("redo").to_string(),
        format!("No redo history for {}", canonical_key(&path).display())
    );
}

#[rstest]
#[case::undo(Direction::Undo)]
#[case::redo(Direction::Redo)]
fn zero_steps_are_rejected(workspace: TempDir, #[case] direction: Direction) {
    let manager = UndoManager::new(20, 1_000_000);
    let path = document(&workspace, "doc.json", b"data");
    let result = match direction {
        Direction::Undo => manager.undo(&path, 0),
        Direction::Redo => manager.redo(&path, 0),
    };
    let error = result.expect_err("zero steps must fail");
    assert!(matches!(error, HistoryError::InvalidSteps));
    assert_eq!(error.to_string(), "Error: steps must be >= 1");
}

#[rstest]
fn depth_cap_drops_oldest_snapshots(workspace: TempDir) {
    let manager = UndoManager::new(2, 1_000_000);
    let path = document(&workspace, "doc.json", b"v1");
    for next in [b"v2", b"v3", b"v4"] {
        manager.snapshot(&path).expect("snapshot");
        fs::write(&path, next).expect("edit");
    }

    let summary = manager.summary(&path).expect("summary");
    assert_eq!(summary.undo_depth, 2);
    assert_eq!(summary.total_snapshot_bytes, 4);
    assert_eq!(summary.budget_evictions, 0);

    let outcome = manager.undo(&path, 10).expect("undo");
    assert_eq!(outcome.applied(), 2);
    assert_eq!(contents(&path), b"v2");
}

#[rstest]
fn new_snapshot_clears_redo(workspace: TempDir) {
    let manager = UndoManager::new(20, 1_000_000);
    let path = document(&workspace, "doc.json", b"v1");
    manager.snapshot(&path).expect("snapshot");
    fs::write(&path, b"v2").expect("edit");
    manager.undo(&path, 1).expect("undo");
    assert_eq!(manager.summary(&path).expect("summary").redo_depth, 1);

    manager.snapshot(&path).expect("snapshot");
    let summary = manager.summary(&path).expect("summary");
    assert_eq!(summary.redo_depth, 0);
    assert_eq!(summary.undo_depth, 1);
    assert_eq!(summary.total_snapshot_bytes, 2);
}

#[rstest]
fn budget_evicts_oldest_snapshot_across_documents(workspace: TempDir) {
    let manager = UndoManager::new(20, 250);
    let first = document(&workspace, "a.json", &[b'a'; 100]);
    let second = document(&workspace, "b.json", &[b'b'; 100]);

    manager.snapshot(&first).expect("snapshot a");
    manager.snapshot(&second).expect("snapshot b");
    manager.snapshot(&first).expect("snapshot a again");

    let summary = manager.summary(&first).expect("summary");
    assert_eq!(summary.undo_depth, 1);
    assert_eq!(summary.total_snapshot_bytes, 200);
    assert_eq!(summary.budget_evictions, 1);
    assert!(summary.to_string().ends_with(&format!(" [{UNDO_BUDGET_EXCEEDED}]")));

    let other = manager.summary(&second).expect("summary");
    assert_eq!(other.undo_depth, 1);
}

#[rstest]
fn undo_past_evicted_boundary_reports_no_history(workspace: TempDir) {
    let manager = UndoManager::new(20, 25);
    let path = document(&workspace, "doc.json", b"0000000000");
    for next in [b"1111111111", b"2222222222", b"3333333333"] {
        manager.snapshot(&path).expect("snapshot");
        fs::write(&path, next).expect("edit");
    }
    assert_eq!(manager.summary(&path).expect("summary").budget_evictions, 1);

    let partial = manager.undo(&path, 3).expect("undo");
    assert!(partial.applied() < 3);
    assert!(partial.applied() >= 1);

    let exhausted = manager.undo(&path, 1).expect("undo");
    assert_eq!(exhausted.applied(), 0);
    assert!(matches!(exhausted, StepOutcome::NoHistory { .. }));
    assert!(manager.total_bytes().expect("total") <= 25);
}

#[rstest]
fn failed_restore_puts_snapshot_back(workspace: TempDir) {
    let manager = UndoManager::new(20, 1_000_000);
    let path = document(&workspace, "doc.json", b"before");
    manager.snapshot(&path).expect("snapshot");

    fs::remove_file(&path).expect("remove");
    fs::create_dir(&path).expect("replace file with directory");

    let error = manager.undo(&path, 1).expect_err("restore must fail");
    match error {
        HistoryError::Restore {
            direction, applied, ..
        } => {
            assert_eq!(direction, Direction::Undo);
            assert_eq!(applied, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
    let summary = manager.summary(&path).expect("summary");
    assert_eq!((summary.undo_depth, summary.redo_depth), (1, 0));
    assert_eq!(summary.total_snapshot_bytes, 6);
}

#[rstest]
fn failed_redo_keeps_both_stacks(workspace: TempDir) {
    let manager = UndoManager::new(2, 1_000_000);
    let path = document(&workspace, "doc.json", b"v1");
    for next in [b"v2", b"v3"] {
        manager.snapshot(&path).expect("snapshot");
        fs::write(&path, next).expect("edit");
    }
    manager.undo(&path, 1).expect("undo");

    fs::remove_file(&path).expect("remove");
    fs::create_dir(&path).expect("replace file with directory");

    let error = manager.redo(&path, 1).expect_err("restore must fail");
    assert!(matches!(
        error,
        HistoryError::Restore {
            direction: Direction::Redo,
            applied: 0,
            ..
        }
    ));
    let summary = manager.summary(&path).expect("summary");
    assert_eq!((summary.undo_depth, summary.redo_depth), (1, 1));
    assert_eq!(summary.total_snapshot_bytes, 4);
}

#[rstest]
fn redo_at_the_depth_cap_keeps_the_oldest_until_written(workspace: TempDir) {
    let manager = UndoManager::new(2, 1_000_000);
    let path = document(&workspace, "doc.json", b"v1");
    for next in [b"v2", b"v3"] {
        manager.snapshot(&path).expect("snapshot");
        fs::write(&path, next).expect("edit");
    }
    manager.undo(&path, 2).expect("undo");
    manager.redo(&path, 2).expect("redo");

    assert_eq!(contents(&path), b"v3");
    let summary = manager.summary(&path).expect("summary");
    assert_eq!((summary.undo_depth, summary.redo_depth), (2, 0));
    manager.undo(&path, 2).expect("undo again");
    assert_eq!(contents(&path), b"v1");
}

#[rstest]
fn dropped_capture_leaves_history_untouched(workspace: TempDir) {
    let manager = UndoManager::new(20, 1_000_000);
    let path = document(&workspace, "doc.json", b"v1");
    manager.snapshot(&path).expect("snapshot");
    fs::write(&path, b"v2").expect("edit");
    manager.undo(&path, 1).expect("undo");

    let pending = manager.capture(&path).expect("capture").expect("file exists");
    assert_eq!(pending.path(), canonical_key(&path));
    drop(pending);
    let summary = manager.summary(&path).expect("summary");
    assert_eq!((summary.undo_depth, summary.redo_depth), (0, 1));

    let pending = manager.capture(&path).expect("capture").expect("file exists");
    let outcome = manager.record(pending).expect("record");
    assert_eq!(outcome, SnapshotOutcome::Captured { bytes: 2 });
    let summary = manager.summary(&path).expect("summary");
    assert_eq!((summary.undo_depth, summary.redo_depth), (1, 0));
}

#[rstest]
fn summary_renders_depths_and_budget(workspace: TempDir) {
    let manager = UndoManager::new(20, 1_000_000);
    let path = document(&workspace, "doc.json", b"abc");
    manager.snapshot(&path).expect("snapshot");

    let summary = manager.summary(&path).expect("summary");
    assert_eq!(
        summary.to_string(),
        format!(
            "History for {}: undo=1, redo=0, total_snapshot_bytes=3, budget_evictions=0",
            canonical_key(&path).display()
        )
    );
}

#[rstest]
fn clear_forgets_one_or_all_documents(workspace: TempDir) {
    let manager = UndoManager::new(20, 1_000_000);
    let first = document(&workspace, "a.json", b"aaaa");
    let second = document(&workspace, "b.json", b"bb");
    manager.snapshot(&first).expect("snapshot");
    manager.snapshot(&second).expect("snapshot");

    manager.clear(Some(&first)).expect("clear one");
    assert_eq!(manager.total_bytes().expect("total"), 2);
    assert_eq!(manager.summaries().expect("summaries").len(), 1);

    manager.clear(None).expect("clear all");
    assert_eq!(manager.total_bytes().expect("total"), 0);
    assert!(manager.summaries().expect("summaries").is_empty());
}

#[rstest]
fn relative_and_absolute_paths_share_history(workspace: TempDir) {
    let manager = UndoManager::new(20, 1_000_000);
    let path = document(&workspace, "doc.json", b"data");
    manager.snapshot(&path).expect("snapshot");

    let dotted = workspace.path().join(".").join("doc.json");
    assert_eq!(manager.summary(&dotted).expect("summary").undo_depth, 1);
}
