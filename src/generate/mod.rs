//! Document generation: filling templates with values.

mod batch;
mod options;

pub use batch::{
    fill_batch, fill_batch_with_progress, output_file_name, BatchProgress, GeneratedDocument,
    Recipient,
};
pub use options::FillOptions;

use std::path::Path;

use crate::error::Result;
use crate::package::DocxTemplate;
use crate::placeholder::{SubstitutionReport, ValueMap};

/// Fill a template held in memory and return the new package bytes.
pub fn fill_bytes(template: &[u8], values: &ValueMap, options: &FillOptions) -> Result<Vec<u8>> {
    fill_bytes_with_report(template, values, options).map(|(bytes, _)| bytes)
}

/// [`fill_bytes`], also returning the substitution report.
pub fn fill_bytes_with_report(
    template: &[u8],
    values: &ValueMap,
    options: &FillOptions,
) -> Result<(Vec<u8>, SubstitutionReport)> {
    let mut doc = DocxTemplate::from_bytes_with_options(template, &options.load)?;
    let report = doc.substitute(values, options.on_missing)?;
    let bytes = doc.to_bytes()?;
    Ok((bytes, report))
}

/// Fill a template file and write the result to `output`.
///
/// Nothing is written when substitution fails.
pub fn fill_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    values: &ValueMap,
    options: &FillOptions,
) -> Result<SubstitutionReport> {
    let data = std::fs::read(input.as_ref())?;
    let (bytes, report) = fill_bytes_with_report(&data, values, options)?;
    std::fs::write(output.as_ref(), bytes)?;
    log::info!(
        "wrote {} ({} placeholders replaced)",
        output.as_ref().display(),
        report.replaced
    );
    Ok(report)
}
