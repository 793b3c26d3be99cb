//! # docfill
//!
//! Placeholder scanning and substitution for DOCX templates.
//!
//! Templates mark fields with `{UPPER_SNAKE}` tokens such as `{FIO}` or
//! `{CONTRACT_DATE}`. This library lists the tokens a template contains and
//! produces filled copies, treating each paragraph as its logical text so
//! that tokens split across formatting runs are found and replaced like any
//! other.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docfill::{scan_file, fill_file, FillOptions, MissingValuePolicy, ValueMap};
//!
//! fn main() -> docfill::Result<()> {
//!     // List the placeholders of a template
//!     for token in scan_file("contract.docx")? {
//!         println!("{}", token);
//!     }
//!
//!     // Fill it
//!     let values = ValueMap::from_fields([("FIO", "Иванов"), ("CITY", "Moscow")])?;
//!     let options = FillOptions::new().on_missing(MissingValuePolicy::Error);
//!     fill_file("contract.docx", "contract_ivanov.docx", &values, &options)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Run-agnostic matching**: tokens split across runs are found and replaced
//! - **Every story**: body, nested tables, headers and footers of all sections
//! - **Missing-value policy**: keep unmapped tokens or fail before touching anything
//! - **Faithful output**: untouched package parts are carried over as-is
//! - **Batch generation**: one document per recipient, in parallel with Rayon

pub mod detect;
pub mod error;
pub mod generate;
pub mod model;
pub mod package;
pub mod placeholder;
pub mod render;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx, DocxFormat};
pub use error::{Error, Result};
pub use generate::{
    fill_batch, fill_batch_with_progress, fill_bytes, fill_bytes_with_report, fill_file,
    BatchProgress, FillOptions, GeneratedDocument, Recipient,
};
pub use model::{
    Alignment, Block, Document, HeaderFooter, HeaderFooterKind, Location, Metadata, Paragraph,
    ParagraphSource, ParagraphStyle, Section, StoryKind, Table, TableCell, TableRow, TextRun,
    TextStyle,
};
pub use package::{DocxTemplate, ErrorMode, LoadOptions};
pub use placeholder::{MissingValuePolicy, Occurrence, SubstitutionReport, ValueMap};
pub use render::{JsonFormat, TextOptions};

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

/// Open a DOCX template file.
///
/// # Example
///
/// ```no_run
/// use docfill::open;
///
/// let template = open("contract.docx").unwrap();
/// println!("Sections: {}", template.document().sections.len());
/// ```
pub fn open<P: AsRef<Path>>(path: P) -> Result<DocxTemplate> {
    DocxTemplate::open(path)
}

/// Open a DOCX template file with custom options.
///
/// # Example
///
/// ```no_run
/// use docfill::{open_with_options, LoadOptions};
///
/// let options = LoadOptions::new().lenient();
/// let template = open_with_options("damaged.docx", &options).unwrap();
/// ```
pub fn open_with_options<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<DocxTemplate> {
    DocxTemplate::open_with_options(path, options)
}

/// List the distinct placeholders of a template file, sorted.
///
/// # Arguments
///
/// * `path` - Path to the DOCX file
///
/// # Example
///
/// ```no_run
/// use docfill::scan_file;
///
/// let tokens = scan_file("contract.docx").unwrap();
/// assert!(tokens.iter().all(|t| t.starts_with('{')));
/// ```
pub fn scan_file<P: AsRef<Path>>(path: P) -> Result<BTreeSet<String>> {
    Ok(DocxTemplate::open(path)?.scan())
}

/// List the distinct placeholders of a template held in memory.
pub fn scan_bytes(data: &[u8]) -> Result<BTreeSet<String>> {
    Ok(DocxTemplate::from_bytes(data)?.scan())
}

/// List the distinct placeholders of a template read from `reader`.
pub fn scan_reader<R: Read>(reader: R) -> Result<BTreeSet<String>> {
    Ok(DocxTemplate::from_reader(reader, &LoadOptions::default())?.scan())
}

/// Extract the logical text of every paragraph of a template file.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let template = DocxTemplate::open(path)?;
    Ok(template.document().plain_text())
}

/// Convert a template file's document model to JSON.
///
/// # Example
///
/// ```no_run
/// use docfill::{to_json, JsonFormat};
///
/// let json = to_json("contract.docx", JsonFormat::Pretty).unwrap();
/// std::fs::write("contract.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let template = DocxTemplate::open(path)?;
    render::to_json(template.document(), format)
}

/// List the placeholders of a template file without blocking the runtime.
#[cfg(feature = "async")]
pub async fn scan_file_async<P: AsRef<Path>>(path: P) -> Result<BTreeSet<String>> {
    let data = tokio::fs::read(path.as_ref()).await?;
    spawn_blocking(move || scan_bytes(&data)).await
}

/// Fill a template file without blocking the runtime.
///
/// Parsing and substitution run on the blocking thread pool.
#[cfg(feature = "async")]
pub async fn fill_file_async<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    values: ValueMap,
    options: FillOptions,
) -> Result<SubstitutionReport> {
    let data = tokio::fs::read(input.as_ref()).await?;
    let (bytes, report) =
        spawn_blocking(move || fill_bytes_with_report(&data, &values, &options)).await?;
    tokio::fs::write(output.as_ref(), bytes).await?;
    Ok(report)
}

#[cfg(feature = "async")]
async fn spawn_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Other(format!("blocking task failed: {}", e)))?
}

/// Builder for scanning and filling DOCX templates.
///
/// # Example
///
/// ```no_run
/// use docfill::{Docfill, ValueMap};
///
/// let values = ValueMap::from_fields([("FIO", "Иванов")])?;
/// let report = Docfill::new()
///     .strict_values()
///     .lenient()
///     .fill_file("contract.docx", "contract_ivanov.docx", &values)?;
/// println!("{} placeholders replaced", report.replaced);
/// # Ok::<(), docfill::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Docfill {
    options: FillOptions,
}

impl Docfill {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the missing-value policy.
    pub fn on_missing(mut self, policy: MissingValuePolicy) -> Self {
        self.options = self.options.on_missing(policy);
        self
    }

    /// Fail on the first placeholder without a value.
    pub fn strict_values(mut self) -> Self {
        self.options = self.options.strict_values();
        self
    }

    /// Skip unreadable header, footer and core-properties parts.
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Render batch recipients one after another.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// The accumulated fill options.
    pub fn options(&self) -> &FillOptions {
        &self.options
    }

    /// Open a template file.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<DocxTemplate> {
        DocxTemplate::open_with_options(path, &self.options.load)
    }

    /// Load a template from bytes.
    pub fn open_bytes(&self, data: &[u8]) -> Result<DocxTemplate> {
        DocxTemplate::from_bytes_with_options(data, &self.options.load)
    }

    /// List the placeholders of a template file.
    pub fn scan_file<P: AsRef<Path>>(&self, path: P) -> Result<BTreeSet<String>> {
        Ok(self.open(path)?.scan())
    }

    /// Fill a template held in memory.
    pub fn fill_bytes(&self, data: &[u8], values: &ValueMap) -> Result<Vec<u8>> {
        fill_bytes(data, values, &self.options)
    }

    /// Fill a template file into `output`.
    pub fn fill_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
        values: &ValueMap,
    ) -> Result<SubstitutionReport> {
        fill_file(input, output, values, &self.options)
    }

    /// Fill one copy per recipient.
    pub fn fill_batch(&self, data: &[u8], recipients: &[Recipient]) -> Result<Vec<GeneratedDocument>> {
        fill_batch(data, recipients, &self.options)
    }
}
