//! Document tree types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::formatting::Formatting;

/// A whole document: top-level paragraphs and tables in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Body items in reading order.
    #[serde(default)]
    pub body: Vec<BodyItem>,
}

/// One item of a document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyItem {
    /// A top-level paragraph.
    Paragraph(Block),
    /// A table whose cells hold their own blocks.
    Table(Table),
}

/// A paragraph-like run of fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Fragments in order; their texts concatenate to the logical text.
    #[serde(default)]
    pub fragments: Vec<Fragment>,
}

/// A table of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in order.
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Cells in order.
    #[serde(default)]
    pub cells: Vec<Cell>,
}

/// A table cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Blocks in order.
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// A contiguous span of content sharing one formatting profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Formatting applied to the whole fragment.
    #[serde(default, skip_serializing_if = "Formatting::is_plain")]
    pub format: Formatting,
    /// What the fragment carries.
    pub content: Content,
}

/// Payload of a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    /// Plain text.
    Text(String),
    /// An embedded reference field; its display text is part of the logical
    /// text.
    Field(Field),
    /// An embedded equation object; contributes no logical text.
    Equation(Equation),
}

/// An embedded field such as a citation reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field instruction, e.g. a citation key.
    pub instruction: String,
    /// Rendered text shown in place of the field.
    pub display: String,
}

/// An embedded equation object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equation {
    /// Markup the equation was converted from.
    pub source: String,
    /// Converter output describing the structured equation.
    pub structured: String,
}

impl Fragment {
    /// Creates a plain text fragment.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            format: Formatting::default(),
            content: Content::Text(text.into()),
        }
    }

    /// Creates a text fragment carrying `format`.
    #[must_use]
    pub fn styled(text: impl Into<String>, format: Formatting) -> Self {
        Self {
            format,
            content: Content::Text(text.into()),
        }
    }

    /// Text this fragment contributes to the logical text.
    #[must_use]
    pub fn logical_text(&self) -> &str {
        match &self.content {
            Content::Text(text) => text,
            Content::Field(field) => &field.display,
            Content::Equation(_) => "",
        }
    }

    /// Returns `true` for fragments carrying a field or equation payload.
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        !matches!(self.content, Content::Text(_))
    }
}

impl Block {
    /// Creates a block from fragments.
    #[must_use]
    pub const fn new(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }

    /// Creates a block holding a single plain text fragment.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(vec![Fragment::text(text)])
    }

    /// Concatenation of the fragment texts.
    #[must_use]
    pub fn logical_text(&self) -> String {
        self.fragments.iter().map(Fragment::logical_text).collect()
    }
}

/// Address of a block within a document.
///
/// Top-level paragraphs are numbered among paragraphs only; tables do not
/// consume paragraph indices. Table blocks are addressed by table ordinal,
/// row, cell and block position, all zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockAddress {
    /// A top-level paragraph.
    Paragraph(usize),
    /// A block inside a table cell.
    Cell {
        /// Table ordinal among the document's tables.
        table: usize,
        /// Row within the table.
        row: usize,
        /// Cell within the row.
        cell: usize,
        /// Block within the cell.
        block: usize,
    },
}

impl BlockAddress {
    /// Returns `true` for top-level paragraph addresses.
    #[must_use]
    pub const fn is_paragraph(&self) -> bool {
        matches!(self, Self::Paragraph(_))
    }
}

impl fmt::Display for BlockAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paragraph(index) => write!(f, "paragraph {index}"),
            Self::Cell {
                table,
                row,
                cell,
                block,
            } => write!(f, "table {table} row {row} cell {cell} block {block}"),
        }
    }
}

impl Document {
    /// Creates a document whose body is one paragraph per text.
    #[must_use]
    pub fn from_paragraphs<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            body: texts
                .into_iter()
                .map(|text| BodyItem::Paragraph(Block::plain(text)))
                .collect(),
        }
    }

    /// Top-level paragraphs in order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Block> {
        self.body.iter().filter_map(|item| match item {
            BodyItem::Paragraph(block) => Some(block),
            BodyItem::Table(_) => None,
        })
    }

    /// Tables in order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(|item| match item {
            BodyItem::Table(table) => Some(table),
            BodyItem::Paragraph(_) => None,
        })
    }

    /// Number of top-level paragraphs.
    #[must_use]
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Addresses of every table-cell block in document order.
    #[must_use]
    pub fn cell_addresses(&self) -> Vec<BlockAddress> {
        self.blocks()
            .map(|(address, _)| address)
            .filter(|address| !address.is_paragraph())
            .collect()
    }

    /// Every block with its address in one walk: top-level paragraphs first,
    /// then table-cell blocks, each in document order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockAddress, &Block)> {
        let paragraphs = self
            .paragraphs()
            .enumerate()
            .map(|(index, block)| (BlockAddress::Paragraph(index), block));
        let cells = self
            .tables()
            .enumerate()
            .flat_map(|(table, found)| table_blocks(table, found));
        paragraphs.chain(cells)
    }

    /// Mutable counterpart of [`Document::blocks`], in the same order.
    pub fn blocks_mut(&mut self) -> Vec<(BlockAddress, &mut Block)> {
        let mut paragraphs = Vec::new();
        let mut cells = Vec::new();
        let mut tables = 0;
        for item in &mut self.body {
            match item {
                BodyItem::Paragraph(block) => {
                    paragraphs.push((BlockAddress::Paragraph(paragraphs.len()), block));
                }
                BodyItem::Table(found) => {
                    for (row, row_item) in found.rows.iter_mut().enumerate() {
                        for (cell, cell_item) in row_item.cells.iter_mut().enumerate() {
                            for (block, block_item) in cell_item.blocks.iter_mut().enumerate() {
                                let address = BlockAddress::Cell {
                                    table: tables,
                                    row,
                                    cell,
                                    block,
                                };
                                cells.push((address, block_item));
                            }
                        }
                    }
                    tables += 1;
                }
            }
        }
        paragraphs.extend(cells);
        paragraphs
    }

    /// Looks up a block by address.
    #[must_use]
    pub fn block(&self, address: BlockAddress) -> Option<&Block> {
        match address {
            BlockAddress::Paragraph(index) => self.paragraphs().nth(index),
            BlockAddress::Cell {
                table,
                row,
                cell,
                block,
            } => self
                .tables()
                .nth(table)?
                .rows
                .get(row)?
                .cells
                .get(cell)?
                .blocks
                .get(block),
        }
    }

    /// Looks up a block by address for mutation.
    pub fn block_mut(&mut self, address: BlockAddress) -> Option<&mut Block> {
        match address {
            BlockAddress::Paragraph(index) => self
                .body
                .iter_mut()
                .filter_map(|item| match item {
                    BodyItem::Paragraph(block) => Some(block),
                    BodyItem::Table(_) => None,
                })
                .nth(index),
            BlockAddress::Cell {
                table,
                row,
                cell,
                block,
            } => self
                .body
                .iter_mut()
                .filter_map(|item| match item {
                    BodyItem::Table(found) => Some(found),
                    BodyItem::Paragraph(_) => None,
                })
                .nth(table)?
                .rows
                .get_mut(row)?
                .cells
                .get_mut(cell)?
                .blocks
                .get_mut(block),
        }
    }
}

fn table_blocks(table: usize, found: &Table) -> impl Iterator<Item = (BlockAddress, &Block)> {
    found.rows.iter().enumerate().flat_map(move |(row, row_item)| {
        row_item
            .cells
            .iter()
            .enumerate()
            .flat_map(move |(cell, cell_item)| {
                cell_item.blocks.iter().enumerate().map(move |(block, found)| {
                    let address = BlockAddress::Cell {
                        table,
                        row,
                        cell,
                        block,
                    };
                    (address, found)
                })
            })
    })
}
