//! DOCX package adapter.
//!
//! Maps a WordprocessingML package onto the [`crate::model`] types and back:
//!
//! - [`Archive`]: every ZIP entry, held in memory and rewritten in order
//! - [`rels`]: relationship parts, used to locate the main, header, footer
//!   and core-properties parts
//! - story reader/writer: body, header and footer XML to model blocks, and
//!   edited run text back into the same XML events
//! - [`DocxTemplate`]: ties the above together

mod archive;
mod docx;
mod options;
mod properties;
pub mod rels;
mod story;
mod writer;
mod xml;

pub use archive::Archive;
pub use docx::DocxTemplate;
pub use options::{ErrorMode, LoadOptions};
pub use properties::parse_core_properties;
pub use xml::{WordNames, XmlPart, WORDML_NS, WORDML_STRICT_NS};
