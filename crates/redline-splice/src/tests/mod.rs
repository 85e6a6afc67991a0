//! Unit tests for block splicing and the document pass.


use redline_config::Limits;
use redline_document::{
    Block, BlockAddress, BodyItem, Cell, Content, Document, Equation, Field, Formatting,
    Fragment, Row, Table,
};
use rstest::rstest;

use crate::{
    BlockSplice, Deadline, MatchPattern, PatternSpec, RejectionTag, Replacement, Selection,
    SpliceRequest, select_blocks, splice_block, splice_document,
};

pub(super) fn request(spec: &PatternSpec, replacement: &str) -> SpliceRequest {
    let pattern = MatchPattern::compile(spec).expect("pattern compiles");
    SpliceRequest::new(pattern, Replacement::Text(replacement.to_owned()))
}

pub(super) fn run(block: &Block, request: &SpliceRequest) -> BlockSplice {
    splice_block(block, request, None, usize::MAX, &Deadline::unbounded()).expect("no deadline")
}

fn bold() -> Formatting {
    Formatting {
        bold: Some(true),
        ..Formatting::default()
    }
}

fn texts(fragments: &[Fragment]) -> Vec<&str> {
    fragments.iter().map(Fragment::logical_text).collect()
}

fn logical(fragments: &[Fragment]) -> String {
    fragments.iter().map(Fragment::logical_text).collect()
}

#[test]
fn matches_span_fragment_boundaries() {
    let block = Block::new(vec![
        Fragment::styled("Hello", bold()),
        Fragment::text("World"),
    ]);

    let result = run(&block, &request(&PatternSpec::literal("HelloWorld"), "Hi"));

    assert_eq!(result.applied, 1);
    assert_eq!(texts(&result.fragments), ["Hi"]);
    assert_eq!(result.fragments.first().map(|f| f.format.clone()), Some(bold()));
}

#[test]
fn untouched_fragments_keep_their_formatting() {
    let block = Block::new(vec![
        Fragment::text("The "),
        Fragment::styled("quick", bold()),
        Fragment::text(" fox"),
    ]);

    let result = run(&block, &request(&PatternSpec::literal("fox"), "dog"));

    assert_eq!(texts(&result.fragments), ["The ", "quick", " ", "dog"]);
    assert_eq!(result.fragments.get(1).map(|f| f.format.clone()), Some(bold()));
}

fn cited_block() -> Block {
    Block::new(vec![
        Fragment::text("see "),
        Fragment {
            format: Formatting::default(),
            content: Content::Field(Field {
                instruction: "CITE smith2020".to_owned(),
                display: "[1]".to_owned(),
            }),
        },
        Fragment::text(" here"),
    ])
}

#[test]
fn fields_outside_the_match_survive() {
    let result = run(&cited_block(), &request(&PatternSpec::literal("here"), "there"));

    assert_eq!(logical(&result.fragments), "see [1] there");
    assert!(matches!(
        result.fragments.get(1).map(|f| &f.content),
        Some(Content::Field(_))
    ));
}

#[test]
fn fields_touched_by_a_match_become_text() {
    let result = run(&cited_block(), &request(&PatternSpec::literal("[1]"), "(1)"));

    assert_eq!(logical(&result.fragments), "see (1) here");
    assert!(result.fragments.iter().all(|f| !f.is_embedded()));
}

#[test]
fn case_insensitive_literal_preserves_case_per_occurrence() {
    let spec = PatternSpec::literal("foo").with_match_case(false);
    let result = run(&Block::plain("FOO foo Foo"), &request(&spec, "bar"));

    assert_eq!(result.applied, 3);
    assert_eq!(logical(&result.fragments), "BAR bar Bar");
}

#[test]
fn occurrence_index_picks_one_match() {
    let block = Block::plain("x x x");
    let result = splice_block(
        &block,
        &request(&PatternSpec::literal("x"), "y"),
        Some(2),
        usize::MAX,
        &Deadline::unbounded(),
    )
    .expect("no deadline");

    assert_eq!(result.total_matches, 3);
    assert_eq!(result.applied, 1);
    assert_eq!(logical(&result.fragments), "x y x");
}

#[rstest]
#[case::collapse_spaces("a foo b", "foo", "a b")]
#[case::before_punctuation("Hello world.", "world", "Hello.")]
#[case::leading("foo bar", "foo", " bar")]
#[case::everything("foo", "foo", "")]
fn deletions_leave_no_spacing_artefacts(
    #[case] text: &str,
    #[case] find: &str,
    #[case] expected: &str,
) {
    let spec = PatternSpec::literal(find).with_whole_words(true);
    let result = run(&Block::plain(text), &request(&spec, ""));
    assert_eq!(logical(&result.fragments), expected);
}

#[rstest]
#[case::double_space_in_one_fragment(vec!["a  b"], "a  c")]
#[case::double_space_across_fragments(vec!["a ", " b"], "a  c")]
#[case::distant_boundary_untouched(vec!["a  ", " x", " b"], "a   x c")]
fn cleanup_ignores_boundaries_away_from_replacements(
    #[case] chunks: Vec<&str>,
    #[case] expected: &str,
) {
    let block = Block::new(chunks.into_iter().map(Fragment::text).collect());
    let result = run(&block, &request(&PatternSpec::literal("b"), "c"));
    assert_eq!(logical(&result.fragments), expected);
}

#[test]
fn cleanup_trims_a_single_space_only() {
    let spec = PatternSpec::literal("x").with_whole_words(true);
    let result = run(&Block::plain("a x \tb"), &request(&spec, ""));
    assert_eq!(logical(&result.fragments), "a \tb");
}

#[rstest]
#[case::between_tabs("\t\t", "x*")]
#[case::between_newlines("\n\n", r"\b|x*")]
fn zero_width_deletions_insert_nothing(#[case] text: &str, #[case] pattern: &str) {
    let result = run(&Block::plain(text), &request(&PatternSpec::regex(pattern), ""));
    assert_eq!(logical(&result.fragments), text);
}

#[test]
fn char_range_limits_candidates() {
    let block = Block::plain("aaa aaa");
    let spliced = request(&PatternSpec::literal("aaa"), "bbb").with_char_range(4..7);

    let result = run(&block, &spliced);

    assert_eq!(result.total_matches, 2);
    assert_eq!(logical(&result.fragments), "aaa bbb");
}

#[test]
fn overrides_layer_on_the_hosting_fragment() {
    let block = Block::new(vec![Fragment::text("x "), Fragment::styled("target", bold())]);
    let overrides = Formatting {
        italic: Some(true),
        ..Formatting::default()
    };
    let spliced = request(&PatternSpec::literal("target"), "hit").with_overrides(overrides);

    let result = run(&block, &spliced);

    let hit = result.fragments.last().expect("replacement fragment");
    assert_eq!(hit.logical_text(), "hit");
    assert_eq!(hit.format.bold, Some(true));
    assert_eq!(hit.format.italic, Some(true));
}

#[test]
fn equation_replacement_is_a_single_fragment() {
    let pattern = MatchPattern::compile(&PatternSpec::literal("mc2")).expect("compiles");
    let equation = Equation {
        source: "mc^2".to_owned(),
        structured: "<m/>".to_owned(),
    };
    let spliced = SpliceRequest::new(pattern, Replacement::Equation(equation.clone()));

    let result = run(&Block::plain("E = mc2 here"), &spliced);

    assert_eq!(result.fragments.len(), 3);
    assert_eq!(
        result.fragments.get(1).map(|f| &f.content),
        Some(&Content::Equation(equation))
    );
    assert_eq!(logical(&result.fragments), "E =  here");
}

#[test]
fn regex_replacements_expand_groups() {
    let spec = PatternSpec::regex(r"(\d{4})-(\d{2})-(\d{2})");
    let result = run(&Block::plain("due 2024-03-09."), &request(&spec, "$2/$3/$1"));
    assert_eq!(logical(&result.fragments), "due 03/09/2024.");
}

#[rstest]
#[case::start("^", "> ", "> quote")]
#[case::end("$", "!", "quote!")]
fn zero_width_matches_insert(#[case] pattern: &str, #[case] with: &str, #[case] expected: &str) {
    let result = run(&Block::plain("quote"), &request(&PatternSpec::regex(pattern), with));
    assert_eq!(logical(&result.fragments), expected);
}

#[test]
fn remaining_budget_caps_block_replacements() {
    let block = Block::plain("x x x x");
    let result = splice_block(
        &block,
        &request(&PatternSpec::literal("x"), "y"),
        None,
        2,
        &Deadline::unbounded(),
    )
    .expect("no deadline");

    assert_eq!(result.eligible, 4);
    assert_eq!(result.applied, 2);
    assert_eq!(logical(&result.fragments), "y y x x");
}

fn document_with_table() -> Document {
    let mut document = Document::from_paragraphs(["alpha x", "beta x"]);
    document.body.push(BodyItem::Table(Table {
        rows: vec![Row {
            cells: vec![
                Cell {
                    blocks: vec![Block::plain("cell x")],
                },
                Cell {
                    blocks: vec![Block::plain("other")],
                },
            ],
        }],
    }));
    document
}

fn block_text(document: &Document, address: BlockAddress) -> String {
    document
        .block(address)
        .map(Block::logical_text)
        .unwrap_or_default()
}

const FIRST_CELL: BlockAddress = BlockAddress::Cell {
    table: 0,
    row: 0,
    cell: 0,
    block: 0,
};

#[test]
fn table_cell_replacement_touches_only_that_cell() {
    let mut document = document_with_table();
    let plan = select_blocks(&document, &Selection::All).expect("plan");

    let outcome = splice_document(
        &mut document,
        &plan,
        &request(&PatternSpec::literal("cell"), "box"),
        None,
        &Limits::default(),
        &Deadline::unbounded(),
    )
    .expect("pass succeeds");

    assert_eq!(outcome.changed, [FIRST_CELL]);
    assert_eq!(block_text(&document, FIRST_CELL), "box x");
    assert_eq!(block_text(&document, BlockAddress::Paragraph(0)), "alpha x");
}

#[rstest]
#[case::first_paragraph(1, BlockAddress::Paragraph(0), "alpha y")]
#[case::second_paragraph(2, BlockAddress::Paragraph(1), "beta y")]
#[case::cell(3, FIRST_CELL, "cell y")]
fn occurrence_index_counts_across_blocks(
    #[case] occurrence: usize,
    #[case] changed: BlockAddress,
    #[case] expected: &str,
) {
    let mut document = document_with_table();
    let plan = select_blocks(&document, &Selection::All).expect("plan");

    let outcome = splice_document(
        &mut document,
        &plan,
        &request(&PatternSpec::literal("x"), "y"),
        Some(occurrence),
        &Limits::default(),
        &Deadline::unbounded(),
    )
    .expect("pass succeeds");

    assert_eq!(outcome.applied, 1);
    assert_eq!(outcome.changed, [changed]);
    assert_eq!(block_text(&document, changed), expected);
}

#[test]
fn occurrence_beyond_the_last_match_is_a_no_op() {
    let mut document = document_with_table();
    let before = document.clone();
    let plan = select_blocks(&document, &Selection::All).expect("plan");

    let outcome = splice_document(
        &mut document,
        &plan,
        &request(&PatternSpec::literal("x"), "y"),
        Some(9),
        &Limits::default(),
        &Deadline::unbounded(),
    )
    .expect("pass succeeds");

    assert!(!outcome.modified());
    assert_eq!(document, before);
}

#[test]
fn per_call_cap_leaves_later_matches_verbatim() {
    let mut document = Document::from_paragraphs(["x x", "x x"]);
    let plan = select_blocks(&document, &Selection::All).expect("plan");
    let limits = Limits {
        max_matches_per_call: 2,
        ..Limits::default()
    };

    let outcome = splice_document(
        &mut document,
        &plan,
        &request(&PatternSpec::literal("x").with_whole_words(true), "y"),
        None,
        &limits,
        &Deadline::unbounded(),
    )
    .expect("pass succeeds");

    assert_eq!(outcome.applied, 2);
    assert!(outcome.cap_hit);
    assert_eq!(block_text(&document, BlockAddress::Paragraph(0)), "y y");
    assert_eq!(block_text(&document, BlockAddress::Paragraph(1)), "x x");
}

#[test]
fn exact_budget_is_not_reported_as_cap() {
    let mut document = Document::from_paragraphs(["x x"]);
    let plan = select_blocks(&document, &Selection::All).expect("plan");
    let limits = Limits {
        max_matches_per_call: 2,
        ..Limits::default()
    };

    let outcome = splice_document(
        &mut document,
        &plan,
        &request(&PatternSpec::literal("x"), "y"),
        None,
        &limits,
        &Deadline::unbounded(),
    )
    .expect("pass succeeds");

    assert_eq!(outcome.applied, 2);
    assert!(!outcome.cap_hit);
}

#[test]
fn regex_scan_size_is_checked_before_scanning() {
    let mut document = Document::from_paragraphs(["a".repeat(200)]);
    let before = document.clone();
    let plan = select_blocks(&document, &Selection::All).expect("plan");
    let limits = Limits {
        max_scan_chars: 20,
        ..Limits::default()
    };

    let rejection = splice_document(
        &mut document,
        &plan,
        &request(&PatternSpec::regex("a+"), "z"),
        None,
        &limits,
        &Deadline::unbounded(),
    )
    .expect_err("scan refused");

    assert_eq!(rejection.tag(), RejectionTag::LimitExceeded);
    assert_eq!(document, before);
}

#[test]
fn scoped_selection_skips_table_cells() {
    let mut document = document_with_table();
    let plan = select_blocks(&document, &Selection::Indices(vec![1])).expect("plan");

    let outcome = splice_document(
        &mut document,
        &plan,
        &request(&PatternSpec::literal("x"), "y"),
        None,
        &Limits::default(),
        &Deadline::unbounded(),
    )
    .expect("pass succeeds");

    assert_eq!(outcome.changed, [BlockAddress::Paragraph(1)]);
    assert_eq!(block_text(&document, FIRST_CELL), "cell x");
}

#[test]
fn long_documents_are_walked_once() {
    let mut document =
        Document::from_paragraphs((0..50_000).map(|index| format!("line {index}")));
    let last = BlockAddress::Paragraph(49_999);
    let plan = select_blocks(&document, &Selection::All).expect("plan");

    let outcome = splice_document(
        &mut document,
        &plan,
        &request(&PatternSpec::literal("line 49999"), "last"),
        None,
        &Limits::default(),
        &Deadline::unbounded(),
    )
    .expect("pass succeeds");

    assert_eq!(outcome.changed, [last]);
    assert_eq!(block_text(&document, last), "last");
}
