//! Core properties (`docProps/core.xml`).

use chrono::{DateTime, Utc};
use quick_xml::events::Event;

use super::xml::{text_of, XmlPart};
use crate::error::Result;
use crate::model::Metadata;

/// Core properties part name used when the package relationships do not name one.
pub const DEFAULT_CORE_PART: &str = "docProps/core.xml";

/// Parse a core properties part into [`Metadata`].
///
/// Elements are matched by local name, so the usual `dc:`, `cp:` and
/// `dcterms:` prefixes are not required. Unparseable dates are dropped.
pub fn parse_core_properties(data: &[u8]) -> Result<Metadata> {
    let part = XmlPart::parse(data)?;
    let mut metadata = Metadata::default();
    let mut current: Option<Vec<u8>> = None;
    let mut text = String::new();

    for event in &part.events {
        match event {
            Event::Start(e) => {
                current = Some(e.local_name().as_ref().to_vec());
                text.clear();
            }
            Event::Text(t) => {
                if current.is_some() {
                    text.push_str(&text_of(t)?);
                }
            }
            Event::CData(c) => {
                if current.is_some() {
                    text.push_str(&String::from_utf8_lossy(c));
                }
            }
            Event::End(_) => {
                if let Some(name) = current.take() {
                    assign(&mut metadata, &name, text.trim());
                }
                text.clear();
            }
            _ => {}
        }
    }

    Ok(metadata)
}

fn assign(metadata: &mut Metadata, name: &[u8], value: &str) {
    if value.is_empty() {
        return;
    }
    let value = value.to_string();
    match name {
        b"title" => metadata.title = Some(value),
        b"creator" => metadata.creator = Some(value),
        b"subject" => metadata.subject = Some(value),
        b"keywords" => metadata.keywords = Some(value),
        b"description" => metadata.description = Some(value),
        b"lastModifiedBy" => metadata.last_modified_by = Some(value),
        b"revision" => metadata.revision = Some(value),
        b"created" => metadata.created = parse_date(&value),
        b"modified" => metadata.modified = parse_date(&value),
        _ => {}
    }
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(date) => Some(date.with_timezone(&Utc)),
        Err(e) => {
            log::debug!("ignoring core property date {:?}: {}", value, e);
            None
        }
    }
}
