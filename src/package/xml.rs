//! Event-level XML parts.
//!
//! A part is kept as the flat list of `quick-xml` events it was parsed
//! from. Untouched events are written back verbatim, so re-serializing a
//! part only changes what an edit explicitly replaced.

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Error, Result};

/// WordprocessingML main namespace (transitional).
pub const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// WordprocessingML main namespace (strict).
pub const WORDML_STRICT_NS: &str = "http://purl.oclc.org/ooxml/wordprocessingml/main";

/// A parsed XML package part.
#[derive(Debug, Clone)]
pub struct XmlPart {
    pub(crate) events: Vec<Event<'static>>,
}

impl XmlPart {
    /// Parse a part from raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(data);
        let mut buf = Vec::new();
        let mut events = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Eof => break,
                event => events.push(event.into_owned()),
            }
            buf.clear();
        }
        if !events
            .iter()
            .any(|e| matches!(e, Event::Start(_) | Event::Empty(_)))
        {
            return Err(Error::MalformedDocument("XML part has no root element".into()));
        }
        Ok(Self { events })
    }

    /// Serialize the events back to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for event in &self.events {
            writer.write_event(event.borrow())?;
        }
        Ok(writer.into_inner())
    }

    /// Number of events in the part.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the part has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn root(&self) -> Option<&BytesStart<'static>> {
        self.events.iter().find_map(|e| match e {
            Event::Start(s) | Event::Empty(s) => Some(s),
            _ => None,
        })
    }
}

/// Qualified-name matching for WordprocessingML elements and attributes.
///
/// Word writes the `w:` prefix, but the prefix is whatever the root element
/// binds to the main namespace, so it is resolved per part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordNames {
    prefix: String,
}

impl Default for WordNames {
    fn default() -> Self {
        Self {
            prefix: "w".to_string(),
        }
    }
}

impl WordNames {
    /// Resolve the WordprocessingML prefix from a part's root element.
    pub fn detect(part: &XmlPart) -> Result<Self> {
        let Some(root) = part.root() else {
            return Ok(Self::default());
        };
        for attr in root.attributes() {
            let attr = attr?;
            let value = attr.unescape_value()?;
            if value != WORDML_NS && value != WORDML_STRICT_NS {
                continue;
            }
            let key = attr.key.as_ref();
            if key == b"xmlns" {
                return Ok(Self {
                    prefix: String::new(),
                });
            }
            if let Some(prefix) = key.strip_prefix(b"xmlns:") {
                return Ok(Self {
                    prefix: String::from_utf8_lossy(prefix).into_owned(),
                });
            }
        }
        Ok(Self::default())
    }

    /// The resolved prefix (empty for a default namespace).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Check whether a qualified name is `prefix:local`.
    pub fn is(&self, name: &[u8], local: &str) -> bool {
        if self.prefix.is_empty() {
            return name == local.as_bytes();
        }
        let p = self.prefix.len();
        name.len() == p + 1 + local.len()
            && name.starts_with(self.prefix.as_bytes())
            && name[p] == b':'
            && name.ends_with(local.as_bytes())
    }

    /// Build the qualified name for a local name.
    pub fn qualified(&self, local: &str) -> String {
        if self.prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", self.prefix, local)
        }
    }

    /// Value of the `prefix:local` attribute of an element.
    pub fn attr(&self, element: &BytesStart<'_>, local: &str) -> Result<Option<String>> {
        for attr in element.attributes() {
            let attr = attr?;
            if self.is(attr.key.as_ref(), local) {
                return Ok(Some(attr.unescape_value()?.into_owned()));
            }
        }
        Ok(None)
    }
}

/// Value of the first attribute with the given local name, any prefix.
pub(crate) fn attr_by_local_name(element: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == local {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Decode a text event.
pub(crate) fn text_of(text: &BytesText<'_>) -> Result<String> {
    Ok(text.unescape()?.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t xml:space="preserve">A &amp; B </w:t></w:r></w:p></w:body></w:document>"#;

    #[test]
    fn test_roundtrip_is_verbatim() {
        let part = XmlPart::parse(DOC.as_bytes()).unwrap();
        let bytes = part.to_bytes().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), DOC);
    }

    #[test]
    fn test_detect_prefix() {
        let part = XmlPart::parse(DOC.as_bytes()).unwrap();
        let names = WordNames::detect(&part).unwrap();
        assert_eq!(names.prefix(), "w");
        assert!(names.is(b"w:p", "p"));
        assert!(!names.is(b"w:pPr", "p"));
        assert!(!names.is(b"m:r", "r"));
        assert_eq!(names.qualified("t"), "w:t");
    }

    #[test]
    fn test_detect_custom_and_default_prefix() {
        let custom = XmlPart::parse(
            br#"<x:document xmlns:x="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#,
        )
        .unwrap();
        let names = WordNames::detect(&custom).unwrap();
        assert!(names.is(b"x:t", "t"));
        assert!(!names.is(b"w:t", "t"));

        let default = XmlPart::parse(
            br#"<document xmlns="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#,
        )
        .unwrap();
        let names = WordNames::detect(&default).unwrap();
        assert!(names.is(b"t", "t"));
        assert_eq!(names.qualified("t"), "t");
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            XmlPart::parse(b"<w:p><w:r></w:p>"),
            Err(Error::MalformedDocument(_))
        ));
        assert!(XmlPart::parse(b"").is_err());
    }
}
