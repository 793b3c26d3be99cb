//! Package relationships (`_rels/*.rels`).

use quick_xml::events::Event;

use super::archive::Archive;
use super::xml::{attr_by_local_name, XmlPart};
use crate::error::{Error, Result};

/// Relationship type suffix of the main document part.
pub const OFFICE_DOCUMENT: &str = "/officeDocument";
/// Relationship type suffix of a header part.
pub const HEADER: &str = "/header";
/// Relationship type suffix of a footer part.
pub const FOOTER: &str = "/footer";
/// Relationship type suffix of the core properties part.
pub const CORE_PROPERTIES: &str = "/core-properties";

/// Main part name used when the package relationships do not name one.
pub const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// A single relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship id (`rId1`)
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target as written in the part
    pub target: String,
    /// Whether the target lies outside the package
    pub external: bool,
}

/// The relationships of one source part.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    source_dir: String,
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Load the relationships of `source` (`""` for the package root).
    ///
    /// A missing relationships part yields an empty set.
    pub fn load(archive: &Archive, source: &str) -> Result<Self> {
        let source_dir = parent_dir(source).to_string();
        let Some(data) = archive.get(&rels_part_name(source)) else {
            return Ok(Self {
                source_dir,
                entries: Vec::new(),
            });
        };
        let mut rels = Self::parse(data)?;
        rels.source_dir = source_dir;
        Ok(rels)
    }

    /// Parse a relationships part.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let part = XmlPart::parse(data)?;
        let mut entries = Vec::new();
        for event in &part.events {
            let (Event::Start(e) | Event::Empty(e)) = event else {
                continue;
            };
            if e.local_name().as_ref() != b"Relationship" {
                continue;
            }
            let (Some(id), Some(rel_type), Some(target)) = (
                attr_by_local_name(e, b"Id")?,
                attr_by_local_name(e, b"Type")?,
                attr_by_local_name(e, b"Target")?,
            ) else {
                continue;
            };
            let external = attr_by_local_name(e, b"TargetMode")?.as_deref() == Some("External");
            entries.push(Relationship {
                id,
                rel_type,
                target,
                external,
            });
        }
        Ok(Self {
            source_dir: String::new(),
            entries,
        })
    }

    /// All relationships.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    /// Find a relationship by id.
    pub fn by_id(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// First internal relationship whose type ends with `suffix`.
    pub fn by_type(&self, suffix: &str) -> Option<&Relationship> {
        self.entries
            .iter()
            .find(|r| !r.external && r.rel_type.ends_with(suffix))
    }

    /// Package part name of a relationship's target.
    pub fn resolve(&self, rel: &Relationship) -> String {
        resolve_target(&self.source_dir, &rel.target)
    }

    /// Resolve the part name behind relationship `id`.
    pub fn target_of(&self, id: &str) -> Option<String> {
        self.by_id(id)
            .filter(|r| !r.external)
            .map(|r| self.resolve(r))
    }

    /// Part name of relationship `id`, which must be internal and of type `suffix`.
    pub fn require_part(&self, id: &str, suffix: &str) -> Result<String> {
        let rel = self
            .by_id(id)
            .ok_or_else(|| Error::MissingPart(format!("relationship {}", id)))?;
        if rel.external || !rel.rel_type.ends_with(suffix) {
            return Err(Error::MalformedDocument(format!(
                "relationship {} is not a {} part",
                id,
                suffix.trim_start_matches('/')
            )));
        }
        Ok(self.resolve(rel))
    }
}

/// Name of the relationships part describing `part`.
pub fn rels_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None if part.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{}.rels", part),
    }
}

/// Name of the main document part.
pub fn main_document_part(archive: &Archive) -> Result<String> {
    let root = Relationships::load(archive, "")?;
    let part = root
        .by_type(OFFICE_DOCUMENT)
        .map(|r| root.resolve(r))
        .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());
    Ok(part)
}

fn parent_dir(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn resolve_target(source_dir: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None if source_dir.is_empty() => target.to_string(),
        None => format!("{}/{}", source_dir, target),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="/word/footer1.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
<Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/customXml" Target="../customXml/item1.xml"/>
</Relationships>"#;

    #[test]
    fn test_rels_part_name() {
        assert_eq!(rels_part_name(""), "_rels/.rels");
        assert_eq!(rels_part_name("word/document.xml"), "word/_rels/document.xml.rels");
    }

    #[test]
    fn test_resolve_targets() {
        let mut rels = Relationships::parse(DOC_RELS.as_bytes()).unwrap();
        rels.source_dir = "word".to_string();

        assert_eq!(rels.target_of("rId1").as_deref(), Some("word/header1.xml"));
        assert_eq!(rels.target_of("rId2").as_deref(), Some("word/footer1.xml"));
        assert_eq!(rels.target_of("rId3"), None);
        assert_eq!(rels.target_of("rId4").as_deref(), Some("customXml/item1.xml"));
        assert_eq!(rels.target_of("rId9"), None);
    }

    #[test]
    fn test_by_type() {
        let rels = Relationships::parse(DOC_RELS.as_bytes()).unwrap();
        assert_eq!(rels.by_type(FOOTER).map(|r| r.id.as_str()), Some("rId2"));
        assert_eq!(rels.iter().count(), 4);
        assert!(rels.by_type("/hyperlink").is_none());
    }

    #[test]
    fn test_require_part_checks_type() {
        let mut rels = Relationships::parse(DOC_RELS.as_bytes()).unwrap();
        rels.source_dir = "word".to_string();

        assert_eq!(rels.require_part("rId1", HEADER).unwrap(), "word/header1.xml");
        assert_eq!(rels.require_part("rId2", FOOTER).unwrap(), "word/footer1.xml");
        assert!(matches!(
            rels.require_part("rId4", HEADER),
            Err(Error::MalformedDocument(_))
        ));
        assert!(matches!(
            rels.require_part("rId3", FOOTER),
            Err(Error::MalformedDocument(_))
        ));
        assert!(matches!(
            rels.require_part("rId9", HEADER),
            Err(Error::MissingPart(_))
        ));
    }
}
