//! Document model types for template content.
//!
//! This module defines the in-memory representation the placeholder engine
//! works on: stories (body, headers, footers) made of paragraphs and tables,
//! paragraphs made of text runs. The model is independent of the package
//! format, so the engine can be exercised without any file on disk.

mod document;
mod paragraph;
mod story;
mod table;

pub use document::{CellRef, Document, Location, Metadata, StoryKind};
pub use paragraph::{Alignment, Paragraph, ParagraphStyle, TextRun, TextStyle};
pub use story::{Block, HeaderFooter, HeaderFooterKind, Section};
pub use table::{Table, TableCell, TableRow};

/// Narrow access to a document's text-bearing containers.
///
/// The placeholder engine only needs to enumerate paragraphs and read or
/// replace their logical text; anything that can hand out its paragraphs in
/// a stable order can be scanned and filled.
pub trait ParagraphSource {
    /// All paragraphs with their locations, in traversal order.
    fn paragraphs(&self) -> Vec<(Location, &Paragraph)>;

    /// Mutable access in the same order as [`ParagraphSource::paragraphs`].
    fn paragraphs_mut(&mut self) -> Vec<(Location, &mut Paragraph)>;
}

impl ParagraphSource for Document {
    fn paragraphs(&self) -> Vec<(Location, &Paragraph)> {
        Document::paragraphs(self)
    }

    fn paragraphs_mut(&mut self) -> Vec<(Location, &mut Paragraph)> {
        Document::paragraphs_mut(self)
    }
}

/// A bare paragraph list behaves like a body-only document.
impl ParagraphSource for [Paragraph] {
    fn paragraphs(&self) -> Vec<(Location, &Paragraph)> {
        self.iter()
            .enumerate()
            .map(|(i, p)| (body_location(i), p))
            .collect()
    }

    fn paragraphs_mut(&mut self) -> Vec<(Location, &mut Paragraph)> {
        self.iter_mut()
            .enumerate()
            .map(|(i, p)| (body_location(i), p))
            .collect()
    }
}

fn body_location(paragraph: usize) -> Location {
    Location {
        story: StoryKind::Body,
        cells: Vec::new(),
        paragraph,
    }
}
