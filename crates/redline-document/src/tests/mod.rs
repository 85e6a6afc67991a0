//! Unit tests for the document model and storage.

use std::fs;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::{
    Block, BlockAddress, BodyItem, Cell, ConfigurableConverter, Content, ConversionError,
    Document, DocumentError, EquationConverter, Field, Fragment, Row, Table, storage,
};

#[fixture]
fn mixed_document() -> Document {
    Document {
        body: vec![
            BodyItem::Paragraph(Block::new(vec![Fragment::text("Hello"), Fragment::text("World")])),
            BodyItem::Table(Table {
                rows: vec![Row {
                    cells: vec![
                        Cell {
                            blocks: vec![Block::plain("alpha")],
                        },
                        Cell {
                            blocks: vec![Block::plain("beta"), Block::plain("gamma")],
                        },
                    ],
                }],
            }),
            BodyItem::Paragraph(Block::new(vec![
                Fragment::text("see "),
                Fragment {
                    format: crate::Formatting::default(),
                    content: Content::Field(Field {
                        instruction: "CITE smith2020".to_owned(),
                        display: "[1]".to_owned(),
                    }),
                },
            ])),
        ],
    }
}

#[rstest]
fn tables_do_not_consume_paragraph_indices(mixed_document: Document) {
    assert_eq!(mixed_document.paragraph_count(), 2);
    let second = mixed_document
        .block(BlockAddress::Paragraph(1))
        .expect("second paragraph");
    assert_eq!(second.logical_text(), "see [1]");
}

#[rstest]
fn cell_addresses_follow_document_order(mixed_document: Document) {
    let texts: Vec<String> = mixed_document
        .cell_addresses()
        .into_iter()
        .map(|address| {
            mixed_document
                .block(address)
                .expect("address resolves")
                .logical_text()
        })
        .collect();
    assert_eq!(texts, ["alpha", "beta", "gamma"]);
}

#[rstest]
fn blocks_list_paragraphs_before_cells(mixed_document: Document) {
    let walked: Vec<(String, String)> = mixed_document
        .blocks()
        .map(|(address, block)| (address.to_string(), block.logical_text()))
        .collect();
    let expected = [
        ("paragraph 0", "HelloWorld"),
        ("paragraph 1", "see [1]"),
        ("table 0 row 0 cell 0 block 0", "alpha"),
        ("table 0 row 0 cell 1 block 0", "beta"),
        ("table 0 row 0 cell 1 block 1", "gamma"),
    ]
    .map(|(address, text)| (address.to_owned(), text.to_owned()));
    assert_eq!(walked, expected);
}

#[rstest]
fn blocks_mut_agrees_with_blocks(mut mixed_document: Document) {
    let addresses: Vec<BlockAddress> = mixed_document
        .blocks()
        .map(|(address, _)| address)
        .collect();
    let mutable: Vec<BlockAddress> = mixed_document
        .blocks_mut()
        .into_iter()
        .map(|(address, _)| address)
        .collect();
    assert_eq!(mutable, addresses);

    for (address, block) in mixed_document.blocks_mut() {
        *block = Block::plain(address.to_string());
    }
    assert_eq!(
        mixed_document
            .block(BlockAddress::Paragraph(1))
            .map(Block::logical_text),
        Some("paragraph 1".to_owned())
    );
}

#[rstest]
fn cell_address_renders_location(mixed_document: Document) {
    let last = mixed_document
        .cell_addresses()
        .pop()
        .expect("cell blocks present");
    assert_eq!(last.to_string(), "table 0 row 0 cell 1 block 1");
}

#[rstest]
fn block_mut_reaches_cell_blocks(mut mixed_document: Document) {
    let address = BlockAddress::Cell {
        table: 0,
        row: 0,
        cell: 0,
        block: 0,
    };
    if let Some(block) = mixed_document.block_mut(address) {
        *block = Block::plain("changed");
    }
    assert_eq!(
        mixed_document.block(address).map(Block::logical_text),
        Some("changed".to_owned())
    );
    assert!(mixed_document.block_mut(BlockAddress::Paragraph(9)).is_none());
}

#[rstest]
fn save_then_load_preserves_document(mixed_document: Document) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("doc.json");

    storage::save(&path, &mixed_document).expect("save document");
    let loaded = storage::load(&path).expect("load document");

    assert_eq!(loaded, mixed_document);
    let entries = fs::read_dir(dir.path()).expect("list dir").count();
    assert_eq!(entries, 1, "temporary file left behind");
}

#[test]
fn missing_documents_are_reported() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("absent.json");

    let error = storage::file_size(&path).expect_err("missing file");

    assert!(matches!(error, DocumentError::Missing { .. }));
}

#[test]
fn malformed_documents_fail_to_parse() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").expect("write fixture");

    let error = storage::load(&path).expect_err("parse failure");

    assert!(matches!(error, DocumentError::Parse { .. }));
}

#[test]
fn on_disk_shape_uses_tagged_body_items() {
    let document = Document::from_paragraphs(["hi"]);
    let bytes = storage::encode(&document).expect("encode");
    let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(
        value["body"][0]["paragraph"]["fragments"][0]["content"]["text"],
        "hi"
    );
}

#[test]
fn configurable_converter_counts_calls() {
    let converter = ConfigurableConverter::succeeding("<math/>");
    let equation = converter.convert("x^2").expect("conversion succeeds");
    assert_eq!(equation.source, "x^2");
    assert_eq!(equation.structured, "<math/>");
    assert_eq!(converter.calls(), 1);

    let failing = ConfigurableConverter::failing("bad markup");
    assert_eq!(
        failing.convert("x^"),
        Err(ConversionError::Rejected {
            message: "bad markup".to_owned()
        })
    );
    assert_eq!(failing.calls(), 1);
}

#[cfg(unix)]
mod command_converter {
    use std::time::{Duration, Instant};

    use crate::{CommandConverter, ConversionError, EquationConverter};

    #[test]
    fn echoes_program_output() {
        let converter = CommandConverter::new("cat", Vec::new());
        let equation = converter.convert("a+b").expect("cat echoes input");
        assert_eq!(equation.structured, "a+b");
    }

    #[test]
    fn non_zero_exit_is_a_failure() {
        let converter = CommandConverter::new("sh", vec!["-c".to_owned(), "exit 3".to_owned()]);
        let error = converter.convert("a+b").expect_err("exit status 3");
        assert!(matches!(error, ConversionError::Failed { .. }));
    }

    #[test]
    fn large_payloads_round_trip_without_stalling() {
        let markup = "x+".repeat(256 * 1024);
        let converter = CommandConverter::new("cat", Vec::new());
        let equation = converter.convert(&markup).expect("cat echoes input");
        assert_eq!(equation.structured.len(), markup.len());
    }

    #[test]
    fn hanging_programs_are_killed_at_the_deadline() {
        let converter = CommandConverter::new("sleep", vec!["30".to_owned()])
            .with_timeout(Duration::from_millis(200));
        let started = Instant::now();

        let error = converter.convert("a+b").expect_err("deadline passes");

        assert_eq!(
            error,
            ConversionError::TimedOut {
                program: "sleep".to_owned(),
                timeout_ms: 200,
            }
        );
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn timeout_can_come_from_configuration() {
        let converter = CommandConverter::new("cat", Vec::new()).with_timeout_ms(5_000);
        let equation = converter.convert("a+b").expect("finishes well inside the deadline");
        assert_eq!(equation.structured, "a+b");
    }

    #[test]
    fn empty_output_is_a_failure() {
        let converter =
            CommandConverter::new("sh", vec!["-c".to_owned(), "cat > /dev/null".to_owned()]);
        let error = converter.convert("a+b").expect_err("no output");
        assert!(matches!(error, ConversionError::EmptyOutput { .. }));
    }
}
