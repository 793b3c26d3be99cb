//! Table types.

use super::{Block, Paragraph};
use serde::{Deserialize, Serialize};

/// A table (`w:tbl`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (based on first row).
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.cells.len()).unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if any cell contains a nested table.
    pub fn has_nested_tables(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .flat_map(|c| &c.content)
            .any(|b| matches!(b, Block::Table(_)))
    }
}

/// A table row (`w:tr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    /// Create a row of single-paragraph cells from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }
}

/// A table cell (`w:tc`): paragraphs and, occasionally, nested tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell content in document order
    pub content: Vec<Block>,
}

impl TableCell {
    /// Create a cell holding one paragraph of text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_paragraphs(vec![Paragraph::with_text(text)])
    }

    /// Create a cell from paragraphs.
    pub fn with_paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            content: paragraphs.into_iter().map(Block::Paragraph).collect(),
        }
    }

    /// Create a cell from arbitrary blocks.
    pub fn with_content(content: Vec<Block>) -> Self {
        Self { content }
    }

    /// Logical text of the cell's direct paragraphs, joined by newlines.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p.text()),
                Block::Table(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
