//! Document-level types.

use super::{Block, Paragraph, Section, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An in-memory template document.
///
/// Holds the body story and, per section, the header and footer stories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Core properties (title, author, dates)
    pub metadata: Metadata,

    /// Body blocks in document order
    pub body: Vec<Block>,

    /// Sections with their header/footer stories
    pub sections: Vec<Section>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a body paragraph.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.body.push(Block::Paragraph(paragraph));
    }

    /// Append a body table.
    pub fn add_table(&mut self, table: Table) {
        self.body.push(Block::Table(table));
    }

    /// Append a section.
    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Check if the document has no blocks at all.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
            && self
                .sections
                .iter()
                .all(|s| s.headers.is_empty() && s.footers.is_empty())
    }

    /// Every paragraph with its location, in traversal order.
    ///
    /// Order: top-level body paragraphs, body tables (row by row, cell by
    /// cell, recursing into nested tables), header stories of every section,
    /// then footer stories of every section.
    pub fn paragraphs(&self) -> Vec<(Location, &Paragraph)> {
        let mut out = Vec::new();
        collect(&self.body, StoryKind::Body, &[], &mut out);
        for (section, s) in self.sections.iter().enumerate() {
            for story in &s.headers {
                collect(&story.blocks, StoryKind::Header { section }, &[], &mut out);
            }
        }
        for (section, s) in self.sections.iter().enumerate() {
            for story in &s.footers {
                collect(&story.blocks, StoryKind::Footer { section }, &[], &mut out);
            }
        }
        out
    }

    /// Mutable counterpart of [`Document::paragraphs`], same order.
    pub fn paragraphs_mut(&mut self) -> Vec<(Location, &mut Paragraph)> {
        let mut out = Vec::new();
        let Document { body, sections, .. } = self;
        collect_mut(body, StoryKind::Body, &[], &mut out);
        let mut footers = Vec::new();
        for (section, s) in sections.iter_mut().enumerate() {
            for story in s.headers.iter_mut() {
                collect_mut(&mut story.blocks, StoryKind::Header { section }, &[], &mut out);
            }
            for story in s.footers.iter_mut() {
                footers.push((section, story));
            }
        }
        for (section, story) in footers {
            collect_mut(&mut story.blocks, StoryKind::Footer { section }, &[], &mut out);
        }
        out
    }

    /// Logical text of every paragraph, one per line, in traversal order.
    pub fn plain_text(&self) -> String {
        self.paragraphs()
            .into_iter()
            .map(|(_, p)| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn collect<'a>(
    blocks: &'a [Block],
    story: StoryKind,
    cells: &[CellRef],
    out: &mut Vec<(Location, &'a Paragraph)>,
) {
    let mut tables = Vec::new();
    let mut paragraph = 0;
    for block in blocks {
        match block {
            Block::Paragraph(p) => {
                out.push((Location::new(story, cells, paragraph), p));
                paragraph += 1;
            }
            Block::Table(t) => tables.push(t),
        }
    }
    for (table, t) in tables.into_iter().enumerate() {
        for (row, r) in t.rows.iter().enumerate() {
            for (cell, c) in r.cells.iter().enumerate() {
                let mut path = cells.to_vec();
                path.push(CellRef { table, row, cell });
                collect(&c.content, story, &path, out);
            }
        }
    }
}

fn collect_mut<'a>(
    blocks: &'a mut [Block],
    story: StoryKind,
    cells: &[CellRef],
    out: &mut Vec<(Location, &'a mut Paragraph)>,
) {
    let mut tables = Vec::new();
    let mut paragraph = 0;
    for block in blocks.iter_mut() {
        match block {
            Block::Paragraph(p) => {
                out.push((Location::new(story, cells, paragraph), p));
                paragraph += 1;
            }
            Block::Table(t) => tables.push(t),
        }
    }
    for (table, t) in tables.into_iter().enumerate() {
        for (row, r) in t.rows.iter_mut().enumerate() {
            for (cell, c) in r.cells.iter_mut().enumerate() {
                let mut path = cells.to_vec();
                path.push(CellRef { table, row, cell });
                collect_mut(&mut c.content, story, &path, out);
            }
        }
    }
}

/// The story a paragraph belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "story", rename_all = "snake_case")]
pub enum StoryKind {
    /// Main document body
    Body,
    /// A header of the given section (0-indexed)
    Header {
        /// Section index
        section: usize,
    },
    /// A footer of the given section (0-indexed)
    Footer {
        /// Section index
        section: usize,
    },
}

/// Position of a table cell within its enclosing block list (0-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    /// Table ordinal among the tables of the enclosing block list
    pub table: usize,
    /// Row index
    pub row: usize,
    /// Cell index
    pub cell: usize,
}

/// Where a paragraph sits in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Owning story
    pub story: StoryKind,
    /// Table cells from the outermost to the innermost (empty outside tables)
    pub cells: Vec<CellRef>,
    /// Paragraph ordinal within its container
    pub paragraph: usize,
}

impl Location {
    fn new(story: StoryKind, cells: &[CellRef], paragraph: usize) -> Self {
        Self {
            story,
            cells: cells.to_vec(),
            paragraph,
        }
    }

    /// Check if the paragraph is inside a table cell.
    pub fn in_table(&self) -> bool {
        !self.cells.is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.story {
            StoryKind::Body => write!(f, "body")?,
            StoryKind::Header { section } => write!(f, "header of section {}", section + 1)?,
            StoryKind::Footer { section } => write!(f, "footer of section {}", section + 1)?,
        }
        for c in &self.cells {
            write!(
                f,
                ", table {} row {} cell {}",
                c.table + 1,
                c.row + 1,
                c.cell + 1
            )?;
        }
        write!(f, ", paragraph {}", self.paragraph + 1)
    }
}

/// Document core properties (`docProps/core.xml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author (`dc:creator`)
    pub creator: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Description / comments
    pub description: Option<String>,

    /// Last author
    pub last_modified_by: Option<String>,

    /// Revision number
    pub revision: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Check if no property is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
