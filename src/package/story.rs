//! Reading stories (body, header, footer parts) into model blocks.
//!
//! Besides the model blocks, the reader records a [`StoryLayout`]: for every
//! paragraph and run, the event indices it came from. The writer uses these
//! anchors to put edited run text back into the original event stream.

use std::ops::Range;

use quick_xml::events::{BytesStart, Event};

use super::xml::{attr_by_local_name, text_of, WordNames, XmlPart};
use crate::error::{Error, Result};
use crate::model::{
    Alignment, Block, HeaderFooterKind, Paragraph, ParagraphStyle, Table, TableCell, TableRow,
    TextRun, TextStyle,
};

/// Event positions of one paragraph.
#[derive(Debug, Clone)]
pub(crate) struct ParagraphAnchor {
    /// Index of `<w:p>` (or `<w:p/>`)
    pub start: usize,
    /// Index of `</w:p>`; equal to `start` for a self-closing paragraph
    pub end: usize,
    pub runs: Vec<RunAnchor>,
    /// Complex-field characters (`w:fldChar`) inside the paragraph's runs
    pub field_chars: Vec<(Range<usize>, FieldChar)>,
    /// Field instructions (`w:instrText`) inside the paragraph's runs
    pub instructions: Vec<Range<usize>>,
    /// Start and end events of `w:fldSimple` wrappers holding a result
    pub simple_fields: Vec<Range<usize>>,
}

impl ParagraphAnchor {
    pub fn is_self_closing(&self) -> bool {
        self.start == self.end
    }

    /// Field markup to drop when the paragraph text is rewritten.
    ///
    /// Covers simple fields and every complex field that begins, shows a
    /// result and ends inside this paragraph. Its cached result is left
    /// behind as plain text. Fields without a result, or spanning several
    /// paragraphs, are kept.
    pub fn field_markup(&self) -> Vec<Range<usize>> {
        let mut open: Vec<(usize, bool)> = Vec::new();
        let mut closed = Vec::new();
        for (range, kind) in &self.field_chars {
            match kind {
                FieldChar::Begin => open.push((range.start, false)),
                FieldChar::Separate => {
                    if let Some(field) = open.last_mut() {
                        field.1 = true;
                    }
                }
                FieldChar::End => {
                    if let Some((begin, true)) = open.pop() {
                        closed.push(begin..=range.start);
                    }
                }
            }
        }

        let inside = |at: usize| closed.iter().any(|field| field.contains(&at));
        let mut markup = self.simple_fields.clone();
        markup.extend(
            self.field_chars
                .iter()
                .filter(|(range, _)| inside(range.start))
                .map(|(range, _)| range.clone()),
        );
        markup.extend(
            self.instructions
                .iter()
                .filter(|range| inside(range.start))
                .cloned(),
        );
        markup
    }
}

/// `w:fldChar/@w:fldCharType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldChar {
    Begin,
    Separate,
    End,
}

/// Event positions of one run.
#[derive(Debug, Clone)]
pub(crate) struct RunAnchor {
    /// Index of `<w:r>` (or `<w:r/>`)
    pub start: usize,
    /// Index of `</w:r>`; equal to `start` for a self-closing run
    pub end: usize,
    /// Where new text goes when the run had none (after `w:rPr`)
    pub content_at: usize,
    /// Event ranges of the text-bearing children (`w:t`, `w:tab`, `w:br`...)
    pub pieces: Vec<Range<usize>>,
    /// Run text as read
    pub original: String,
}

impl RunAnchor {
    pub fn is_self_closing(&self) -> bool {
        self.start == self.end
    }
}

/// Anchors of every paragraph in a story, indexed by `Paragraph::source`.
#[derive(Debug, Clone, Default)]
pub(crate) struct StoryLayout {
    pub paragraphs: Vec<ParagraphAnchor>,
}

/// Text stand-in for `w:noBreakHyphen`.
pub(crate) const NON_BREAKING_HYPHEN: char = '\u{2011}';

/// Read all blocks of a story part.
pub(crate) fn read_story(part: &XmlPart, names: &WordNames) -> Result<(Vec<Block>, StoryLayout)> {
    let mut reader = StoryReader {
        events: &part.events,
        names,
        pos: 0,
        layout: StoryLayout::default(),
    };
    let blocks = reader.read_blocks()?;
    Ok((blocks, reader.layout))
}

struct StoryReader<'a> {
    events: &'a [Event<'static>],
    names: &'a WordNames,
    pos: usize,
    layout: StoryLayout,
}

impl<'a> StoryReader<'a> {
    /// Read blocks until the end of the enclosing element (or of the part).
    ///
    /// Leaves `pos` on the enclosing element's end event.
    fn read_blocks(&mut self) -> Result<Vec<Block>> {
        let events = self.events;
        let mut blocks = Vec::new();
        let mut depth = 0usize;

        while let Some(event) = events.get(self.pos) {
            match event {
                Event::Start(e) => {
                    let name = e.name();
                    if self.names.is(name.as_ref(), "p") {
                        blocks.push(Block::Paragraph(self.read_paragraph()?));
                    } else if self.names.is(name.as_ref(), "tbl") {
                        blocks.push(Block::Table(self.read_table()?));
                    } else {
                        // sdt, customXml and friends are transparent
                        depth += 1;
                        self.pos += 1;
                    }
                }
                Event::Empty(e) if self.names.is(e.name().as_ref(), "p") => {
                    blocks.push(Block::Paragraph(self.read_paragraph()?));
                }
                Event::End(_) => {
                    if depth == 0 {
                        return Ok(blocks);
                    }
                    depth -= 1;
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
        Ok(blocks)
    }

    fn read_table(&mut self) -> Result<Table> {
        let mut table = Table::new();
        self.pos += 1;
        let mut depth = 0usize;

        loop {
            match self.event("table")? {
                Event::Start(e) if self.names.is(e.name().as_ref(), "tr") => {
                    table.add_row(self.read_row()?);
                }
                Event::Empty(e) if self.names.is(e.name().as_ref(), "tr") => {
                    table.add_row(TableRow::default());
                    self.pos += 1;
                }
                Event::Start(_) => {
                    depth += 1;
                    self.pos += 1;
                }
                Event::End(_) => {
                    self.pos += 1;
                    if depth == 0 {
                        return Ok(table);
                    }
                    depth -= 1;
                }
                _ => self.pos += 1,
            }
        }
    }

    fn read_row(&mut self) -> Result<TableRow> {
        let mut cells = Vec::new();
        self.pos += 1;
        let mut depth = 0usize;

        loop {
            match self.event("table row")? {
                Event::Start(e) if self.names.is(e.name().as_ref(), "tc") => {
                    self.pos += 1;
                    let content = self.read_blocks()?;
                    self.expect_end("table cell")?;
                    cells.push(TableCell::with_content(content));
                }
                Event::Empty(e) if self.names.is(e.name().as_ref(), "tc") => {
                    cells.push(TableCell::default());
                    self.pos += 1;
                }
                Event::Start(_) => {
                    depth += 1;
                    self.pos += 1;
                }
                Event::End(_) => {
                    self.pos += 1;
                    if depth == 0 {
                        return Ok(TableRow::new(cells));
                    }
                    depth -= 1;
                }
                _ => self.pos += 1,
            }
        }
    }

    fn read_paragraph(&mut self) -> Result<Paragraph> {
        let start = self.pos;
        let mut paragraph = Paragraph::new();
        let mut anchor = ParagraphAnchor {
            start,
            end: start,
            runs: Vec::new(),
            field_chars: Vec::new(),
            instructions: Vec::new(),
            simple_fields: Vec::new(),
        };

        let self_closing = matches!(self.events[start], Event::Empty(_));
        self.pos += 1;

        if !self_closing {
            let mut depth = 0usize;
            // (depth, start) of open w:fldSimple elements
            let mut simple_fields: Vec<(usize, usize)> = Vec::new();
            loop {
                match self.event("paragraph")? {
                    Event::Start(e) => {
                        let name = e.name();
                        let name = name.as_ref();
                        if self.names.is(name, "r") {
                            self.read_run(&mut paragraph, &mut anchor)?;
                        } else if depth == 0 && self.names.is(name, "pPr") {
                            paragraph.style = self.read_paragraph_props()?;
                        } else if self.names.is(name, "p")
                            || self.names.is(name, "del")
                            || self.names.is(name, "moveFrom")
                        {
                            // text-box paragraphs and deleted revisions
                            self.skip_element()?;
                        } else {
                            if self.names.is(name, "fldSimple") {
                                simple_fields.push((depth, self.pos));
                            }
                            depth += 1;
                            self.pos += 1;
                        }
                    }
                    Event::Empty(e) if self.names.is(e.name().as_ref(), "r") => {
                        self.read_run(&mut paragraph, &mut anchor)?;
                    }
                    Event::End(_) => {
                        if depth == 0 {
                            anchor.end = self.pos;
                            self.pos += 1;
                            break;
                        }
                        depth -= 1;
                        if simple_fields.last().is_some_and(|&(d, _)| d == depth) {
                            if let Some((_, start)) = simple_fields.pop() {
                                anchor.simple_fields.push(start..start + 1);
                                anchor.simple_fields.push(self.pos..self.pos + 1);
                            }
                        }
                        self.pos += 1;
                    }
                    _ => self.pos += 1,
                }
            }
        }

        paragraph.source = Some(self.layout.paragraphs.len());
        self.layout.paragraphs.push(anchor);
        Ok(paragraph)
    }

    fn read_paragraph_props(&mut self) -> Result<ParagraphStyle> {
        let mut style = ParagraphStyle::default();
        if matches!(self.events[self.pos], Event::Empty(_)) {
            self.pos += 1;
            return Ok(style);
        }
        self.pos += 1;

        let mut depth = 0usize;
        loop {
            match self.event("paragraph properties")? {
                Event::Start(e) | Event::Empty(e) => {
                    if depth == 0 {
                        let name = e.name();
                        if self.names.is(name.as_ref(), "pStyle") {
                            style.style_id = self.names.attr(e, "val")?;
                        } else if self.names.is(name.as_ref(), "jc") {
                            if let Some(val) = self.names.attr(e, "val")? {
                                style.alignment = Alignment::from_ooxml(&val);
                            }
                        }
                    }
                    if matches!(self.events[self.pos], Event::Start(_)) {
                        depth += 1;
                    }
                    self.pos += 1;
                }
                Event::End(_) => {
                    self.pos += 1;
                    if depth == 0 {
                        return Ok(style);
                    }
                    depth -= 1;
                }
                _ => self.pos += 1,
            }
        }
    }

    fn read_run(&mut self, paragraph: &mut Paragraph, anchor: &mut ParagraphAnchor) -> Result<()> {
        let start = self.pos;
        let mut run = TextRun::default();
        let mut run_anchor = RunAnchor {
            start,
            end: start,
            content_at: start,
            pieces: Vec::new(),
            original: String::new(),
        };

        let self_closing = matches!(self.events[start], Event::Empty(_));
        self.pos += 1;

        if !self_closing {
            run_anchor.content_at = self.pos;
            loop {
                let at = self.pos;
                match self.event("run")? {
                    Event::Start(e) => {
                        let name = e.name();
                        let name = name.as_ref();
                        if self.names.is(name, "rPr") {
                            run.style = self.read_run_props()?;
                            run_anchor.content_at = self.pos;
                        } else if self.names.is(name, "t") {
                            run.text.push_str(&self.read_text()?);
                            run_anchor.pieces.push(at..self.pos);
                        } else if let Some(text) = self.special_char(e)? {
                            self.skip_element()?;
                            run.text.push(text);
                            run_anchor.pieces.push(at..self.pos);
                        } else {
                            // drawings, fields, embedded objects
                            let field_char = self.field_char(e)?;
                            let instruction = self.names.is(name, "instrText");
                            self.skip_element()?;
                            if let Some(kind) = field_char {
                                anchor.field_chars.push((at..self.pos, kind));
                            } else if instruction {
                                anchor.instructions.push(at..self.pos);
                            }
                        }
                    }
                    Event::Empty(e) => {
                        if self.names.is(e.name().as_ref(), "rPr") {
                            run_anchor.content_at = at + 1;
                        } else if self.names.is(e.name().as_ref(), "t") {
                            run_anchor.pieces.push(at..at + 1);
                        } else if let Some(text) = self.special_char(e)? {
                            run.text.push(text);
                            run_anchor.pieces.push(at..at + 1);
                        } else if let Some(kind) = self.field_char(e)? {
                            anchor.field_chars.push((at..at + 1, kind));
                        } else if self.names.is(e.name().as_ref(), "instrText") {
                            anchor.instructions.push(at..at + 1);
                        }
                        self.pos += 1;
                    }
                    Event::End(_) => {
                        run_anchor.end = at;
                        self.pos += 1;
                        break;
                    }
                    _ => self.pos += 1,
                }
            }
        }

        run_anchor.original = run.text.clone();
        run.source = Some(anchor.runs.len());
        anchor.runs.push(run_anchor);
        paragraph.add_run(run);
        Ok(())
    }

    /// Character represented by a run child other than `w:t`, if any.
    fn special_char(&self, e: &BytesStart<'_>) -> Result<Option<char>> {
        let name = e.name();
        let name = name.as_ref();
        if self.names.is(name, "tab") {
            return Ok(Some('\t'));
        }
        if self.names.is(name, "cr") {
            return Ok(Some('\n'));
        }
        if self.names.is(name, "noBreakHyphen") {
            return Ok(Some(NON_BREAKING_HYPHEN));
        }
        if self.names.is(name, "br") {
            // page and column breaks carry no text
            let kind = self.names.attr(e, "type")?;
            return Ok(match kind.as_deref() {
                None | Some("textWrapping") => Some('\n'),
                Some(_) => None,
            });
        }
        Ok(None)
    }

    fn field_char(&self, e: &BytesStart<'_>) -> Result<Option<FieldChar>> {
        if !self.names.is(e.name().as_ref(), "fldChar") {
            return Ok(None);
        }
        Ok(match self.names.attr(e, "fldCharType")?.as_deref() {
            Some("begin") => Some(FieldChar::Begin),
            Some("separate") => Some(FieldChar::Separate),
            Some("end") => Some(FieldChar::End),
            _ => None,
        })
    }

    fn read_text(&mut self) -> Result<String> {
        let mut text = String::new();
        self.pos += 1;
        loop {
            match self.event("text")? {
                Event::Text(t) => {
                    text.push_str(&text_of(t)?);
                    self.pos += 1;
                }
                Event::CData(c) => {
                    text.push_str(&String::from_utf8_lossy(c));
                    self.pos += 1;
                }
                Event::End(_) => {
                    self.pos += 1;
                    return Ok(text);
                }
                Event::Start(_) => self.skip_element()?,
                _ => self.pos += 1,
            }
        }
    }

    fn read_run_props(&mut self) -> Result<TextStyle> {
        let mut style = TextStyle::default();
        self.pos += 1;
        let mut depth = 0usize;

        loop {
            match self.event("run properties")? {
                Event::Start(e) | Event::Empty(e) => {
                    if depth == 0 {
                        self.apply_run_prop(&mut style, e)?;
                    }
                    if matches!(self.events[self.pos], Event::Start(_)) {
                        depth += 1;
                    }
                    self.pos += 1;
                }
                Event::End(_) => {
                    self.pos += 1;
                    if depth == 0 {
                        return Ok(style);
                    }
                    depth -= 1;
                }
                _ => self.pos += 1,
            }
        }
    }

    fn apply_run_prop(&self, style: &mut TextStyle, e: &BytesStart<'_>) -> Result<()> {
        let names = self.names;
        let name = e.name();
        let name = name.as_ref();
        if names.is(name, "b") {
            style.bold = toggle(names.attr(e, "val")?);
        } else if names.is(name, "i") {
            style.italic = toggle(names.attr(e, "val")?);
        } else if names.is(name, "strike") {
            style.strikethrough = toggle(names.attr(e, "val")?);
        } else if names.is(name, "u") {
            style.underline = names.attr(e, "val")?.as_deref() != Some("none");
        } else if names.is(name, "rStyle") {
            style.style_id = names.attr(e, "val")?;
        } else if names.is(name, "rFonts") {
            style.font_name = names.attr(e, "ascii")?;
        } else if names.is(name, "sz") {
            style.font_size = names
                .attr(e, "val")?
                .and_then(|v| v.parse::<f32>().ok())
                .map(|half_points| half_points / 2.0);
        } else if names.is(name, "color") {
            style.color = names.attr(e, "val")?.filter(|c| c != "auto");
        }
        Ok(())
    }

    /// Skip the element starting at `pos`, including all descendants.
    fn skip_element(&mut self) -> Result<()> {
        if matches!(self.events[self.pos], Event::Empty(_)) {
            self.pos += 1;
            return Ok(());
        }
        let mut depth = 0usize;
        loop {
            match self.event("element")? {
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
    }

    fn expect_end(&mut self, what: &str) -> Result<()> {
        match self.event(what)? {
            Event::End(_) => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(Error::MalformedDocument(format!("unterminated {}", what))),
        }
    }

    fn event(&self, what: &str) -> Result<&'a Event<'static>> {
        self.events
            .get(self.pos)
            .ok_or_else(|| Error::MalformedDocument(format!("unterminated {}", what)))
    }
}

fn toggle(val: Option<String>) -> bool {
    !matches!(val.as_deref(), Some("0" | "false" | "off"))
}

/// Header and footer references of one section (`w:sectPr`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SectionRefs {
    pub headers: Vec<(HeaderFooterKind, String)>,
    pub footers: Vec<(HeaderFooterKind, String)>,
}

/// Tracked-change history that may carry an earlier `w:sectPr`.
fn is_revision(names: &WordNames, name: &[u8]) -> bool {
    names.is(name, "sectPrChange") || names.is(name, "pPrChange")
}

/// Collect every section's header/footer relationship ids, in document order.
pub(crate) fn read_sections(part: &XmlPart, names: &WordNames) -> Result<Vec<SectionRefs>> {
    let mut sections = Vec::new();
    let mut current = SectionRefs::default();
    let mut in_change = 0usize;

    for event in &part.events {
        match event {
            Event::Start(e) if is_revision(names, e.name().as_ref()) => in_change += 1,
            Event::End(e) if is_revision(names, e.name().as_ref()) => {
                in_change = in_change.saturating_sub(1)
            }
            _ if in_change > 0 => {}
            Event::Start(e) | Event::Empty(e) => {
                let name = e.name();
                let name = name.as_ref();
                let is_header = names.is(name, "headerReference");
                if is_header || names.is(name, "footerReference") {
                    let kind = names
                        .attr(e, "type")?
                        .map(|t| HeaderFooterKind::from_ooxml(&t))
                        .unwrap_or_default();
                    let Some(id) = attr_by_local_name(e, b"id")? else {
                        continue;
                    };
                    if is_header {
                        current.headers.push((kind, id));
                    } else {
                        current.footers.push((kind, id));
                    }
                } else if names.is(name, "sectPr") && matches!(event, Event::Empty(_)) {
                    sections.push(std::mem::take(&mut current));
                }
            }
            Event::End(e) if names.is(e.name().as_ref(), "sectPr") => {
                sections.push(std::mem::take(&mut current));
            }
            _ => {}
        }
    }
    Ok(sections)
}
