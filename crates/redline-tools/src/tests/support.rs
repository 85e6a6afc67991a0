//! Shared fixtures for the editor test suites.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use redline_config::Limits;
use redline_document::{
    Block, BodyItem, Cell, ConfigurableConverter, Document, Fragment, Row, Table, storage,
};
use redline_splice::GuardrailRejection;
use tempfile::TempDir;

use crate::{DocumentEditor, DocumentTarget, EditReporter, HistoryAction};

/// Event captured by [`RecordingEditReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditEvent {
    Rejected(String),
    Committed(usize),
    Unchanged,
    History(HistoryAction),
}

/// Reporter that keeps every event for later assertions.
#[derive(Debug, Default)]
pub struct RecordingEditReporter {
    events: Mutex<Vec<EditEvent>>,
}

impl RecordingEditReporter {
    pub fn events(&self) -> Vec<EditEvent> {
        self.events.lock().expect("reporter lock").clone()
    }

    fn push(&self, event: EditEvent) {
        self.events.lock().expect("reporter lock").push(event);
    }
}

impl EditReporter for RecordingEditReporter {
    fn rejected(&self, _operation: &str, rejection: &GuardrailRejection) {
        self.push(EditEvent::Rejected(rejection.tag().to_string()));
    }

    fn committed(&self, _operation: &str, _path: &Path, applied: usize) {
        self.push(EditEvent::Committed(applied));
    }

    fn unchanged(&self, _operation: &str, _path: &Path) {
        self.push(EditEvent::Unchanged);
    }

    fn history(&self, action: &HistoryAction, _path: Option<&Path>) {
        self.push(EditEvent::History(*action));
    }
}

/// Editor, scratch directory and collaborators for one test.
pub struct TestWorld {
    pub dir: TempDir,
    pub limits: Limits,
    pub editor: DocumentEditor,
    pub reporter: Arc<RecordingEditReporter>,
    pub converter: Arc<ConfigurableConverter>,
    pub path: PathBuf,
    pub before: Vec<u8>,
    pub last: Option<String>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self::build(limits, Arc::new(ConfigurableConverter::succeeding("<m:oMath/>")))
    }

    pub fn build(limits: Limits, converter: Arc<ConfigurableConverter>) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let reporter = Arc::new(RecordingEditReporter::default());
        let editor =
            DocumentEditor::new(limits, converter.clone()).with_reporter(reporter.clone());
        let path = dir.path().join("document.json");
        Self {
            dir,
            limits,
            editor,
            reporter,
            converter,
            path,
            before: Vec::new(),
            last: None,
        }
    }

    /// Rebuilds the editor with new limits, keeping the directory.
    pub fn relimit(&mut self, limits: Limits) {
        self.limits = limits;
        self.editor = DocumentEditor::new(limits, self.converter.clone())
            .with_reporter(self.reporter.clone());
    }

    /// Swaps in a converter, keeping limits and directory.
    pub fn use_converter(&mut self, converter: ConfigurableConverter) {
        self.converter = Arc::new(converter);
        self.relimit(self.limits);
    }

    pub fn write(&mut self, document: &Document) {
        storage::save(&self.path, document).expect("save document");
        self.before = self.bytes();
    }

    pub fn write_paragraphs(&mut self, paragraphs: &[&str]) {
        self.write(&Document::from_paragraphs(paragraphs.iter().copied()));
    }

    pub fn target(&self) -> DocumentTarget {
        DocumentTarget::file(self.path.clone())
    }

    pub fn bytes(&self) -> Vec<u8> {
        std::fs::read(&self.path).expect("read document")
    }

    pub fn document(&self) -> Document {
        storage::load(&self.path).expect("load document")
    }

    pub fn paragraph_text(&self, index: usize) -> String {
        self.document()
            .paragraphs()
            .nth(index)
            .map(Block::logical_text)
            .expect("paragraph exists")
    }

    pub fn last(&self) -> &str {
        self.last.as_deref().expect("an operation ran")
    }
}

/// Two paragraphs around a table with one cell per row.
pub fn document_with_table(before: &str, cell: &str, after: &str) -> Document {
    Document {
        body: vec![
            BodyItem::Paragraph(Block::plain(before)),
            BodyItem::Table(Table {
                rows: vec![Row {
                    cells: vec![Cell {
                        blocks: vec![Block::plain(cell)],
                    }],
                }],
            }),
            BodyItem::Paragraph(Block::plain(after)),
        ],
    }
}

/// A paragraph split into separately formatted fragments.
pub fn fragmented(parts: &[&str]) -> Document {
    Document {
        body: vec![BodyItem::Paragraph(Block::new(
            parts.iter().map(|part| Fragment::text(*part)).collect(),
        ))],
    }
}

pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
