//! Writing model text back into story parts.
//!
//! Only run text is written back. For each run whose text differs from what
//! was read, its text-bearing children are removed and replaced by freshly
//! built `w:t`/`w:tab`/`w:br` elements at the same spot; run properties
//! and drawings stay where they were. Runs without an anchor are appended
//! to their paragraph as new `w:r` elements.
//!
//! A rewritten paragraph also loses the markup of fields whose cached
//! result it contains, so the result stays as static text.

use std::collections::BTreeMap;

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use super::story::{ParagraphAnchor, RunAnchor, StoryLayout, NON_BREAKING_HYPHEN};
use super::xml::{WordNames, XmlPart};
use crate::error::Result;
use crate::model::{Block, Paragraph};

/// Apply model text to a story part.
///
/// Returns `None` when no run text changed, so the part can be written
/// back untouched.
pub(crate) fn apply(
    part: &XmlPart,
    layout: &StoryLayout,
    blocks: &[Block],
    names: &WordNames,
) -> Result<Option<XmlPart>> {
    let mut paragraphs = Vec::new();
    collect(blocks, &mut paragraphs);

    let mut edits = Edits::new(part.events.len());
    for paragraph in paragraphs {
        let Some(anchor) = paragraph.source.and_then(|i| layout.paragraphs.get(i)) else {
            if paragraph.source.is_some() {
                log::warn!("paragraph anchor out of range, skipping");
            }
            continue;
        };
        edits.paragraph(part, anchor, paragraph, names);
    }

    if edits.is_empty() {
        return Ok(None);
    }
    log::debug!(
        "rewriting part: {} events removed, {} insertion points",
        edits.removed.iter().filter(|r| **r).count(),
        edits.inserts.len()
    );
    Ok(Some(edits.finish(part)))
}

fn collect<'b>(blocks: &'b [Block], out: &mut Vec<&'b Paragraph>) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => out.push(p),
            Block::Table(t) => {
                for row in &t.rows {
                    for cell in &row.cells {
                        collect(&cell.content, out);
                    }
                }
            }
        }
    }
}

struct Edits {
    removed: Vec<bool>,
    inserts: BTreeMap<usize, Vec<Event<'static>>>,
}

impl Edits {
    fn new(len: usize) -> Self {
        Self {
            removed: vec![false; len],
            inserts: BTreeMap::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.inserts.is_empty() && !self.removed.iter().any(|r| *r)
    }

    fn insert(&mut self, at: usize, events: impl IntoIterator<Item = Event<'static>>) {
        self.inserts.entry(at).or_default().extend(events);
    }

    fn paragraph(
        &mut self,
        part: &XmlPart,
        anchor: &ParagraphAnchor,
        paragraph: &Paragraph,
        names: &WordNames,
    ) {
        let mut appended = Vec::new();
        let mut changed = false;

        for run in &paragraph.runs {
            match run.source.and_then(|i| anchor.runs.get(i)) {
                Some(run_anchor) => {
                    if run.text != run_anchor.original {
                        self.run(part, run_anchor, &run.text, names);
                        changed = true;
                    }
                }
                None if !run.text.is_empty() => {
                    appended.push(Event::Start(BytesStart::new(names.qualified("r"))));
                    appended.extend(text_events(&run.text, names));
                    appended.push(Event::End(BytesEnd::new(names.qualified("r"))));
                }
                None => {}
            }
        }

        if changed || !appended.is_empty() {
            // field results now live in the rewritten text
            for markup in anchor.field_markup() {
                for i in markup {
                    self.removed[i] = true;
                }
            }
        }

        if appended.is_empty() {
            return;
        }
        if anchor.is_self_closing() {
            self.expand(part, anchor.start, appended);
        } else {
            self.insert(anchor.end, appended);
        }
    }

    fn run(&mut self, part: &XmlPart, anchor: &RunAnchor, text: &str, names: &WordNames) {
        let content = text_events(text, names);
        if anchor.is_self_closing() {
            self.expand(part, anchor.start, content);
            return;
        }
        for piece in &anchor.pieces {
            for i in piece.clone() {
                self.removed[i] = true;
            }
        }
        let at = anchor
            .pieces
            .first()
            .map(|p| p.start)
            .unwrap_or(anchor.content_at);
        self.insert(at, content);
    }

    /// Turn `<x/>` at `at` into `<x>content</x>`.
    fn expand(&mut self, part: &XmlPart, at: usize, content: Vec<Event<'static>>) {
        let Some(Event::Empty(element)) = part.events.get(at) else {
            return;
        };
        let end = BytesEnd::new(String::from_utf8_lossy(element.name().as_ref()).into_owned());
        self.removed[at] = true;
        self.insert(
            at,
            std::iter::once(Event::Start(element.clone()))
                .chain(content)
                .chain(std::iter::once(Event::End(end))),
        );
    }

    fn finish(mut self, part: &XmlPart) -> XmlPart {
        let extra: usize = self.inserts.values().map(Vec::len).sum();
        let mut events = Vec::with_capacity(part.events.len() + extra);

        for (i, event) in part.events.iter().enumerate() {
            if let Some(inserted) = self.inserts.remove(&i) {
                events.extend(inserted);
            }
            if !self.removed[i] {
                events.push(event.clone());
            }
        }
        if let Some(inserted) = self.inserts.remove(&part.events.len()) {
            events.extend(inserted);
        }
        XmlPart { events }
    }
}

/// Build run content for `text`: `\t` becomes `w:tab`, `\n` becomes `w:br`
/// and U+2011 becomes `w:noBreakHyphen`.
///
/// Characters XML 1.0 cannot carry are dropped.
pub(crate) fn text_events(text: &str, names: &WordNames) -> Vec<Event<'static>> {
    let mut events = Vec::new();
    let mut pending = String::new();

    for c in text.chars() {
        match c {
            '\t' => {
                flush_text(&mut pending, &mut events, names);
                events.push(Event::Empty(BytesStart::new(names.qualified("tab"))));
            }
            '\n' => {
                flush_text(&mut pending, &mut events, names);
                events.push(Event::Empty(BytesStart::new(names.qualified("br"))));
            }
            NON_BREAKING_HYPHEN => {
                flush_text(&mut pending, &mut events, names);
                events.push(Event::Empty(BytesStart::new(names.qualified("noBreakHyphen"))));
            }
            '\r' => {}
            c if is_xml_char(c) => pending.push(c),
            c => log::debug!("dropping character U+{:04X} not allowed in XML", c as u32),
        }
    }
    flush_text(&mut pending, &mut events, names);
    events
}

fn flush_text(pending: &mut String, events: &mut Vec<Event<'static>>, names: &WordNames) {
    if pending.is_empty() {
        return;
    }
    let name = names.qualified("t");
    let start = BytesStart::new(name.clone()).with_attributes([("xml:space", "preserve")]);
    events.push(Event::Start(start));
    events.push(Event::Text(
        BytesText::from_escaped(partial_escape(pending.as_str())).into_owned(),
    ));
    events.push(Event::End(BytesEnd::new(name)));
    pending.clear();
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}
