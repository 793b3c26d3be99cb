//! Batch generation: one filled document per recipient.

use std::collections::HashSet;

use crossbeam_channel::Sender;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::FillOptions;
use crate::error::{Error, Result};
use crate::package::DocxTemplate;
use crate::placeholder::{SubstitutionReport, ValueMap};

/// A recipient: an identifier plus the values for its copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Identifier used in error messages and output names
    pub id: String,

    /// Placeholder values for this recipient
    #[serde(default)]
    pub values: ValueMap,
}

impl Recipient {
    /// Create a recipient.
    pub fn new(id: impl Into<String>, values: ValueMap) -> Self {
        Self {
            id: id.into(),
            values,
        }
    }
}

/// A filled document for one recipient.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    /// Recipient identifier
    pub recipient: String,

    /// DOCX package bytes
    pub bytes: Vec<u8>,

    /// What the substitution did
    pub report: SubstitutionReport,
}

impl GeneratedDocument {
    /// Output file name for a template stem: `generated_{stem}_{recipient}.docx`.
    pub fn file_name(&self, template_stem: &str) -> String {
        output_file_name(template_stem, &self.recipient)
    }
}

/// Progress events published while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchProgress {
    /// The template was loaded; `total` recipients will be rendered
    Started {
        /// Number of recipients
        total: usize,
    },
    /// One recipient finished (in completion order, not input order)
    Rendered {
        /// Recipient identifier
        recipient: String,
    },
    /// One recipient failed
    Failed {
        /// Recipient identifier
        recipient: String,
        /// Error message
        message: String,
    },
}

/// Output file name: `generated_{stem}_{recipient}.docx`.
///
/// Path separators in the recipient id are replaced so the name stays a
/// single path component.
pub fn output_file_name(template_stem: &str, recipient: &str) -> String {
    let recipient: String = recipient
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    format!("generated_{}_{}.docx", template_stem, recipient)
}

/// Fill one copy of `template` per recipient.
///
/// The template is parsed once; each recipient works on its own clone, so
/// recipients never observe each other's values. Results come back in input
/// order. Any failure abandons the whole batch with an
/// [`Error::Recipient`] naming the first failing recipient in input order.
pub fn fill_batch(
    template: &[u8],
    recipients: &[Recipient],
    options: &FillOptions,
) -> Result<Vec<GeneratedDocument>> {
    fill_batch_with_progress(template, recipients, options, None)
}

/// [`fill_batch`] with progress events sent to `progress`.
///
/// A disconnected receiver is ignored.
pub fn fill_batch_with_progress(
    template: &[u8],
    recipients: &[Recipient],
    options: &FillOptions,
    progress: Option<&Sender<BatchProgress>>,
) -> Result<Vec<GeneratedDocument>> {
    check_unique_ids(recipients)?;
    let template = DocxTemplate::from_bytes_with_options(template, &options.load)?;
    let notify = |event: BatchProgress| {
        if let Some(tx) = progress {
            let _ = tx.send(event);
        }
    };
    notify(BatchProgress::Started {
        total: recipients.len(),
    });
    log::info!(
        "generating {} documents ({})",
        recipients.len(),
        if options.parallel { "parallel" } else { "sequential" }
    );

    let render = |recipient: &Recipient| -> Result<GeneratedDocument> {
        match render_one(&template, recipient, options) {
            Ok(doc) => {
                notify(BatchProgress::Rendered {
                    recipient: recipient.id.clone(),
                });
                Ok(doc)
            }
            Err(e) => {
                notify(BatchProgress::Failed {
                    recipient: recipient.id.clone(),
                    message: e.to_string(),
                });
                Err(Error::Recipient {
                    recipient: recipient.id.clone(),
                    source: Box::new(e),
                })
            }
        }
    };

    let results: Vec<Result<GeneratedDocument>> = if options.parallel {
        recipients.par_iter().map(render).collect()
    } else {
        recipients.iter().map(render).collect()
    };
    results.into_iter().collect()
}

fn render_one(
    template: &DocxTemplate,
    recipient: &Recipient,
    options: &FillOptions,
) -> Result<GeneratedDocument> {
    let mut doc = template.clone();
    let report = doc.substitute(&recipient.values, options.on_missing)?;
    let bytes = doc.to_bytes()?;
    log::debug!(
        "recipient {}: {} replaced, {} bytes",
        recipient.id,
        report.replaced,
        bytes.len()
    );
    Ok(GeneratedDocument {
        recipient: recipient.id.clone(),
        bytes,
        report,
    })
}

fn check_unique_ids(recipients: &[Recipient]) -> Result<()> {
    let mut seen = HashSet::new();
    for recipient in recipients {
        if !seen.insert(recipient.id.as_str()) {
            return Err(Error::Other(format!(
                "duplicate recipient id: {}",
                recipient.id
            )));
        }
    }
    Ok(())
}
