//! DOCX template: the package plus its document model.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use super::archive::Archive;
use super::options::LoadOptions;
use super::properties::{parse_core_properties, DEFAULT_CORE_PART};
use super::rels::{self, Relationships};
use super::story::{self, StoryLayout};
use super::writer;
use super::xml::{WordNames, XmlPart};
use crate::detect;
use crate::error::{Error, Result};
use crate::model::{
    Block, Document, HeaderFooter, HeaderFooterKind, Location, Metadata, Paragraph,
    ParagraphSource, Section,
};
use crate::placeholder::{self, MissingValuePolicy, Occurrence, SubstitutionReport, ValueMap};

/// A loaded DOCX template.
///
/// Holds every package entry in memory next to the [`Document`] model read
/// from the body, header and footer parts. Editing run text in the model
/// (directly or through [`DocxTemplate::substitute`]) and calling
/// [`DocxTemplate::to_bytes`] writes the text back into the original parts;
/// every other entry is carried over unchanged.
///
/// Only run text is written back. Structural edits to the model (new
/// paragraphs, tables or sections) are not persisted.
///
/// # Example
///
/// ```no_run
/// use docfill::package::DocxTemplate;
/// use docfill::{MissingValuePolicy, ValueMap};
///
/// let mut template = DocxTemplate::open("contract.docx")?;
/// println!("{:?}", template.scan());
///
/// let values = ValueMap::from_fields([("FIO", "Иванов")])?;
/// template.substitute(&values, MissingValuePolicy::Keep)?;
/// template.save("contract_filled.docx")?;
/// # Ok::<(), docfill::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    archive: Archive,
    document: Document,
    stories: Vec<StoryPart>,
}

#[derive(Debug, Clone)]
struct StoryPart {
    name: String,
    xml: XmlPart,
    names: WordNames,
    layout: StoryLayout,
    target: StoryTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoryTarget {
    Body,
    Header { section: usize, index: usize },
    Footer { section: usize, index: usize },
}

impl DocxTemplate {
    /// Open a template file with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, &LoadOptions::default())
    }

    /// Open a template file.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("opening template {}", path.display());
        let data = std::fs::read(path)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Load a template from a reader.
    pub fn from_reader<R: Read>(mut reader: R, options: &LoadOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Load a template from package bytes with default options.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, &LoadOptions::default())
    }

    /// Load a template from package bytes.
    pub fn from_bytes_with_options(data: &[u8], options: &LoadOptions) -> Result<Self> {
        if !detect::has_zip_magic(data) {
            return Err(Error::UnknownFormat);
        }
        let archive = Archive::read(data, options.part_size_limit())?;
        let format = detect::inspect(&archive)?;
        let main_part = format.main_part;

        let xml = XmlPart::parse(archive.require(&main_part)?)?;
        let names = WordNames::detect(&xml)?;
        let (body, layout) = story::read_story(&xml, &names)?;
        let section_refs = story::read_sections(&xml, &names)?;

        let mut document = Document::new();
        document.body = body;
        let mut stories = vec![StoryPart {
            name: main_part.clone(),
            xml,
            names,
            layout,
            target: StoryTarget::Body,
        }];

        let rels = match Relationships::load(&archive, &main_part) {
            Ok(rels) => rels,
            Err(e) if options.is_lenient() => {
                log::warn!("ignoring relationships of {}: {}", main_part, e);
                Relationships::default()
            }
            Err(e) => return Err(e),
        };

        let mut seen = HashSet::new();
        for (index, refs) in section_refs.iter().enumerate() {
            let mut section = Section::new();
            for (kind, id) in &refs.headers {
                let target = StoryTarget::Header {
                    section: index,
                    index: section.headers.len(),
                };
                if let Some((story, part)) =
                    load_header_footer(&archive, &rels, *kind, id, target, &mut seen, options)?
                {
                    section.headers.push(story);
                    stories.push(part);
                }
            }
            for (kind, id) in &refs.footers {
                let target = StoryTarget::Footer {
                    section: index,
                    index: section.footers.len(),
                };
                if let Some((story, part)) =
                    load_header_footer(&archive, &rels, *kind, id, target, &mut seen, options)?
                {
                    section.footers.push(story);
                    stories.push(part);
                }
            }
            document.add_section(section);
        }

        if options.read_metadata {
            match read_metadata(&archive) {
                Ok(metadata) => document.metadata = metadata,
                Err(e) if options.is_lenient() => log::warn!("ignoring core properties: {}", e),
                Err(e) => return Err(e),
            }
        }

        log::info!(
            "loaded {} ({} sections, {} story parts, {} paragraphs)",
            main_part,
            document.sections.len(),
            stories.len(),
            document.paragraphs().len()
        );
        Ok(Self {
            archive,
            document,
            stories,
        })
    }

    /// The document model.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the document model.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Consume the template, keeping only the model.
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Core properties.
    pub fn metadata(&self) -> &Metadata {
        &self.document.metadata
    }

    /// Name of the main document part.
    pub fn main_part(&self) -> &str {
        &self.stories[0].name
    }

    /// Names of every story part (body, headers, footers), in load order.
    pub fn story_parts(&self) -> Vec<&str> {
        self.stories.iter().map(|s| s.name.as_str()).collect()
    }

    /// Number of entries in the package.
    pub fn part_count(&self) -> usize {
        self.archive.len()
    }

    /// Distinct placeholder tokens in the template.
    pub fn scan(&self) -> BTreeSet<String> {
        placeholder::scan(&self.document)
    }

    /// Every placeholder occurrence with its location.
    pub fn occurrences(&self) -> Vec<Occurrence> {
        placeholder::occurrences(&self.document)
    }

    /// Substitute placeholders in the model.
    pub fn substitute(
        &mut self,
        values: &ValueMap,
        policy: MissingValuePolicy,
    ) -> Result<SubstitutionReport> {
        placeholder::substitute(&mut self.document, values, policy)
    }

    /// Serialize the package with the model's run text written back.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut replaced = HashMap::new();
        for story in &self.stories {
            let Some(blocks) = self.blocks_of(story.target) else {
                log::warn!("{} is no longer in the document model, left unchanged", story.name);
                continue;
            };
            if let Some(updated) = writer::apply(&story.xml, &story.layout, blocks, &story.names)? {
                replaced.insert(story.name.clone(), updated.to_bytes()?);
            }
        }
        log::debug!(
            "{} of {} story parts rewritten",
            replaced.len(),
            self.stories.len()
        );
        self.archive.write(&replaced)
    }

    /// Write the package to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn blocks_of(&self, target: StoryTarget) -> Option<&[Block]> {
        match target {
            StoryTarget::Body => Some(self.document.body.as_slice()),
            StoryTarget::Header { section, index } => self
                .document
                .sections
                .get(section)?
                .headers
                .get(index)
                .map(|h| h.blocks.as_slice()),
            StoryTarget::Footer { section, index } => self
                .document
                .sections
                .get(section)?
                .footers
                .get(index)
                .map(|f| f.blocks.as_slice()),
        }
    }
}

impl ParagraphSource for DocxTemplate {
    fn paragraphs(&self) -> Vec<(Location, &Paragraph)> {
        self.document.paragraphs()
    }

    fn paragraphs_mut(&mut self) -> Vec<(Location, &mut Paragraph)> {
        self.document.paragraphs_mut()
    }
}

fn load_header_footer(
    archive: &Archive,
    rels: &Relationships,
    kind: HeaderFooterKind,
    id: &str,
    target: StoryTarget,
    seen: &mut HashSet<String>,
    options: &LoadOptions,
) -> Result<Option<(HeaderFooter, StoryPart)>> {
    let rel_type = match target {
        StoryTarget::Footer { .. } => rels::FOOTER,
        _ => rels::HEADER,
    };
    let name = match rels.require_part(id, rel_type) {
        Ok(name) => name,
        Err(e) if options.is_lenient() => {
            log::warn!("skipping header/footer: {}", e);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    // linked sections share one part; it belongs to the first section
    if !seen.insert(name.clone()) {
        log::debug!("{} already loaded for an earlier section", name);
        return Ok(None);
    }

    match read_part_story(archive, &name) {
        Ok((xml, names, blocks, layout)) => Ok(Some((
            HeaderFooter {
                kind,
                part: Some(name.clone()),
                blocks,
            },
            StoryPart {
                name,
                xml,
                names,
                layout,
                target,
            },
        ))),
        Err(e) if options.is_lenient() => {
            log::warn!("skipping {}: {}", name, e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn read_part_story(
    archive: &Archive,
    name: &str,
) -> Result<(XmlPart, WordNames, Vec<Block>, StoryLayout)> {
    let xml = XmlPart::parse(archive.require(name)?)?;
    let names = WordNames::detect(&xml)?;
    let (blocks, layout) = story::read_story(&xml, &names)?;
    Ok((xml, names, blocks, layout))
}

fn read_metadata(archive: &Archive) -> Result<Metadata> {
    let root = Relationships::load(archive, "")?;
    let name = root
        .by_type(rels::CORE_PROPERTIES)
        .map(|r| root.resolve(r))
        .unwrap_or_else(|| DEFAULT_CORE_PART.to_string());
    match archive.get(&name) {
        Some(data) => parse_core_properties(data),
        None => Ok(Metadata::default()),
    }
}
