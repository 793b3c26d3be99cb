//! Stories: the block sequences of the body, headers and footers.

use super::{Paragraph, Table};
use serde::{Deserialize, Serialize};

/// A block-level element within a story or table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph
    Paragraph(Paragraph),
    /// A table
    Table(Table),
}

impl Block {
    /// Get the paragraph if this block is one.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        }
    }

    /// Get the table if this block is one.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        }
    }
}

/// A document section and the header/footer stories it owns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Header stories (default, first page, even pages)
    pub headers: Vec<HeaderFooter>,

    /// Footer stories (default, first page, even pages)
    pub footers: Vec<HeaderFooter>,
}

impl Section {
    /// Create a section without headers or footers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a section with one default header and one default footer.
    pub fn with_header_footer(header: Vec<Block>, footer: Vec<Block>) -> Self {
        Self {
            headers: vec![HeaderFooter::new(HeaderFooterKind::Default, header)],
            footers: vec![HeaderFooter::new(HeaderFooterKind::Default, footer)],
        }
    }
}

/// Which pages a header or footer applies to (`w:type`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderFooterKind {
    /// Every page not covered by another kind
    #[default]
    Default,
    /// The first page of the section
    First,
    /// Even-numbered pages
    Even,
}

impl HeaderFooterKind {
    /// Parse a `w:headerReference/@w:type` value.
    pub fn from_ooxml(val: &str) -> Self {
        match val {
            "first" => HeaderFooterKind::First,
            "even" => HeaderFooterKind::Even,
            _ => HeaderFooterKind::Default,
        }
    }
}

/// A header or footer story.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderFooter {
    /// Page applicability
    pub kind: HeaderFooterKind,

    /// Package part name this story was read from (e.g. "word/header1.xml")
    pub part: Option<String>,

    /// Story content
    pub blocks: Vec<Block>,
}

impl HeaderFooter {
    /// Create an in-memory header/footer story.
    pub fn new(kind: HeaderFooterKind, blocks: Vec<Block>) -> Self {
        Self {
            kind,
            part: None,
            blocks,
        }
    }
}
