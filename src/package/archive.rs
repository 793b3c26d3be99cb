//! In-memory ZIP package.

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    modified: Option<DateTime>,
    is_dir: bool,
}

/// Every entry of a ZIP package, in original order.
///
/// Entries are held uncompressed; writing re-compresses each entry with the
/// method it was stored with, so parts that were not replaced come out
/// byte-identical once decompressed.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    entries: Vec<Entry>,
}

impl Archive {
    /// Read all entries from package bytes.
    pub fn read(data: &[u8], size_limit: Option<u64>) -> Result<Self> {
        let mut zip = ZipArchive::new(Cursor::new(data))?;
        let mut entries = Vec::with_capacity(zip.len());

        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            let name = file.name().to_string();
            if let Some(limit) = size_limit {
                if file.size() > limit {
                    return Err(Error::MalformedDocument(format!(
                        "part {} is {} bytes, over the {} byte limit",
                        name,
                        file.size(),
                        limit
                    )));
                }
            }

            let mut buf = Vec::with_capacity(file.size().min(1 << 24) as usize);
            file.read_to_end(&mut buf)?;

            let compression = match file.compression() {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            entries.push(Entry {
                is_dir: file.is_dir(),
                modified: file.last_modified(),
                name,
                data: buf,
                compression,
            });
        }

        log::debug!("read package with {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Get the contents of a part.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// Get a part that must exist.
    pub fn require(&self, name: &str) -> Result<&[u8]> {
        self.get(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))
    }

    /// Check if a part exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Part names in package order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the package has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the package, substituting the contents of `replaced` parts.
    ///
    /// Entry order, names, compression methods and timestamps are preserved.
    pub fn write(&self, replaced: &HashMap<String, Vec<u8>>) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            let mut options = SimpleFileOptions::default().compression_method(entry.compression);
            if let Some(modified) = entry.modified {
                options = options.last_modified_time(modified);
            }

            if entry.is_dir {
                writer.add_directory(entry.name.clone(), options)?;
                continue;
            }

            writer.start_file(entry.name.clone(), options)?;
            let data = replaced.get(&entry.name).unwrap_or(&entry.data);
            writer.write_all(data)?;
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}
