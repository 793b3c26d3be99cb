//! DOCX format detection and validation.

use crate::error::{Error, Result};
use crate::package::{rels, Archive};
use std::path::Path;

/// DOCX package information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxFormat {
    /// Name of the main document part (usually "word/document.xml")
    pub main_part: String,
    /// Number of entries in the package
    pub part_count: usize,
    /// Whether the package carries a VBA project (`.docm`)
    pub macro_enabled: bool,
}

impl std::fmt::Display for DocxFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.macro_enabled { "DOCM" } else { "DOCX" };
        write!(f, "{} ({}, {} parts)", kind, self.main_part, self.part_count)
    }
}

/// ZIP local file header signature.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Check for the ZIP signature without reading the archive.
pub(crate) fn has_zip_magic(data: &[u8]) -> bool {
    data.starts_with(ZIP_MAGIC)
}

/// Detect DOCX format from a file path.
///
/// # Arguments
/// * `path` - Path to the DOCX file
///
/// # Returns
/// * `Ok(DocxFormat)` if the file is a readable DOCX package
/// * `Err(Error::UnknownFormat)` if the file is not a ZIP package
/// * `Err(Error::MissingPart)` if the package has no main document part
///
/// # Example
/// ```no_run
/// use docfill::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("template.docx").unwrap();
/// println!("Main part: {}", format.main_part);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocxFormat> {
    let data = std::fs::read(path)?;
    detect_format_from_bytes(&data)
}

/// Detect DOCX format from the complete package bytes.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocxFormat> {
    if !has_zip_magic(data) {
        return Err(Error::UnknownFormat);
    }
    let archive = Archive::read(data, None).map_err(|e| match e {
        Error::Io(_) | Error::MalformedDocument(_) => Error::UnknownFormat,
        other => other,
    })?;
    inspect(&archive)
}

pub(crate) fn inspect(archive: &Archive) -> Result<DocxFormat> {
    let main_part = rels::main_document_part(archive)?;
    if !archive.contains(&main_part) {
        return Err(Error::MissingPart(main_part));
    }
    Ok(DocxFormat {
        macro_enabled: archive.contains("word/vbaProject.bin"),
        part_count: archive.len(),
        main_part,
    })
}

/// Check if a file is a readable DOCX package.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes hold a readable DOCX package.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
