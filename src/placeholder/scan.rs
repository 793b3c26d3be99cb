//! Placeholder scanning.

use std::collections::BTreeSet;

use serde::Serialize;

use super::pattern::find_placeholders;
use crate::model::{Location, ParagraphSource};

/// One placeholder occurrence and the paragraph it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    /// The token, braces included
    pub token: String,
    /// Paragraph location
    pub location: Location,
}

/// Collect the distinct placeholder tokens of a document.
///
/// Every paragraph's logical text is searched, so a token split across
/// several runs is still found. The document is not modified.
pub fn scan<S: ParagraphSource + ?Sized>(source: &S) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for (_, paragraph) in source.paragraphs() {
        let text = paragraph.text();
        for m in find_placeholders(&text) {
            found.insert(m.token.to_string());
        }
    }
    log::debug!("scan: {} distinct placeholders", found.len());
    found
}

/// Every placeholder occurrence, in traversal order, duplicates included.
pub fn occurrences<S: ParagraphSource + ?Sized>(source: &S) -> Vec<Occurrence> {
    let mut out = Vec::new();
    for (location, paragraph) in source.paragraphs() {
        let text = paragraph.text();
        for m in find_placeholders(&text) {
            out.push(Occurrence {
                token: m.token.to_string(),
                location: location.clone(),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Document, Paragraph, Section, StoryKind, Table, TableRow};

    #[test]
    fn test_split_token() {
        let paragraphs = vec![Paragraph::from_runs(["{F", "IO}"])];
        let found = scan(paragraphs.as_slice());
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["{FIO}"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let paragraphs = vec![
            Paragraph::with_text("{A} and {A}"),
            Paragraph::from_runs(["{", "A", "}"]),
        ];
        assert_eq!(scan(paragraphs.as_slice()).len(), 1);
        assert_eq!(occurrences(paragraphs.as_slice()).len(), 3);
    }

    #[test]
    fn test_all_containers() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("{BODY}"));
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["{CELL}", "plain"]));
        doc.add_table(table);
        doc.add_section(Section::with_header_footer(
            vec![Block::Paragraph(Paragraph::with_text("{HEAD}"))],
            vec![Block::Paragraph(Paragraph::from_runs(["{FO", "OT}"]))],
        ));

        let found: Vec<String> = scan(&doc).into_iter().collect();
        assert_eq!(found, vec!["{BODY}", "{CELL}", "{FOOT}", "{HEAD}"]);

        let occ = occurrences(&doc);
        assert_eq!(occ[0].location.story, StoryKind::Body);
        assert!(occ[1].location.in_table());
        assert_eq!(occ[2].location.story, StoryKind::Header { section: 0 });
        assert_eq!(occ[3].location.story, StoryKind::Footer { section: 0 });
    }

    #[test]
    fn test_empty_containers_contribute_nothing() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::new());
        doc.add_table(Table::new());
        doc.add_section(Section::new());
        assert!(scan(&doc).is_empty());
    }
}
