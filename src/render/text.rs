//! Plain text rendering for template documents.

use crate::error::Result;
use crate::model::Document;
use crate::placeholder::find_placeholders;

/// Options for plain text output.
#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    /// Prefix every line with the paragraph location
    pub locations: bool,

    /// Only emit paragraphs that contain a placeholder
    pub placeholders_only: bool,
}

impl TextOptions {
    /// Create text options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix lines with paragraph locations.
    pub fn with_locations(mut self) -> Self {
        self.locations = true;
        self
    }

    /// Skip paragraphs without placeholders.
    pub fn placeholders_only(mut self) -> Self {
        self.placeholders_only = true;
        self
    }
}

/// Convert a document to plain text, one paragraph per line.
pub fn to_text(doc: &Document, options: &TextOptions) -> Result<String> {
    let mut lines = Vec::new();
    for (location, paragraph) in doc.paragraphs() {
        let text = paragraph.text();
        if options.placeholders_only && find_placeholders(&text).next().is_none() {
            continue;
        }
        if options.locations {
            lines.push(format!("[{}] {}", location, text));
        } else {
            lines.push(text);
        }
    }

    Ok(lines.join("\n").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Paragraph, Section};

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("Hello, world!"));
        doc.add_paragraph(Paragraph::from_runs(["Dear {F", "IO}"]));
        doc.add_section(Section::with_header_footer(
            vec![Block::Paragraph(Paragraph::with_text("{DATE}"))],
            vec![],
        ));
        doc
    }

    #[test]
    fn test_to_text() {
        let result = to_text(&sample(), &TextOptions::default()).unwrap();
        assert_eq!(result, "Hello, world!\nDear {FIO}\n{DATE}");
    }

    #[test]
    fn test_locations_and_filter() {
        let options = TextOptions::new().with_locations().placeholders_only();
        let result = to_text(&sample(), &options).unwrap();
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] Dear {FIO}"));
        assert!(lines[1].starts_with("[header of section 1"));
    }
}
