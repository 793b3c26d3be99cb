//! Placeholder substitution.

use std::collections::BTreeSet;

use serde::Serialize;

use super::pattern::find_placeholders;
use super::policy::MissingValuePolicy;
use super::scan::occurrences;
use super::values::ValueMap;
use crate::error::{Error, Result};
use crate::model::ParagraphSource;

/// Result of substituting placeholders in one piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSubstitution {
    /// The rewritten text
    pub text: String,
    /// Number of tokens replaced by a value
    pub replaced: usize,
    /// Unmapped tokens left verbatim (`keep` policy), in order
    pub kept: Vec<String>,
}

/// Summary of a document substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubstitutionReport {
    /// Paragraphs whose runs were collapsed and rewritten
    pub paragraphs_rewritten: usize,
    /// Token occurrences replaced by a value
    pub replaced: usize,
    /// Distinct unmapped tokens left verbatim
    pub kept: BTreeSet<String>,
}

impl SubstitutionReport {
    /// Check if every placeholder occurrence received a value.
    pub fn is_complete(&self) -> bool {
        self.kept.is_empty()
    }
}

/// Substitute placeholders in a single string.
///
/// Returns `Ok(None)` when the text contains no placeholder at all.
/// Text between tokens is copied unchanged.
///
/// ```
/// use docfill::placeholder::{substitute_text, MissingValuePolicy};
/// use docfill::ValueMap;
///
/// let values: ValueMap = [("{FIO}", "Иванов")].into_iter().collect();
/// let out = substitute_text("Dear {FIO} from {CITY}", &values, MissingValuePolicy::Keep)
///     .unwrap()
///     .unwrap();
/// assert_eq!(out.text, "Dear Иванов from {CITY}");
/// assert_eq!(out.kept, ["{CITY}"]);
/// ```
pub fn substitute_text(
    text: &str,
    values: &ValueMap,
    policy: MissingValuePolicy,
) -> Result<Option<TextSubstitution>> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut matched = false;
    let mut replaced = 0;
    let mut kept = Vec::new();

    for m in find_placeholders(text) {
        matched = true;
        out.push_str(&text[last..m.start]);
        match values.get(m.token) {
            Some(value) => {
                out.push_str(value);
                replaced += 1;
            }
            None => match policy {
                MissingValuePolicy::Keep => {
                    out.push_str(m.token);
                    kept.push(m.token.to_string());
                }
                MissingValuePolicy::Error => {
                    return Err(Error::MissingPlaceholder {
                        token: m.token.to_string(),
                    });
                }
            },
        }
        last = m.end;
    }

    if !matched {
        return Ok(None);
    }
    out.push_str(&text[last..]);
    Ok(Some(TextSubstitution {
        text: out,
        replaced,
        kept,
    }))
}

/// Replace every placeholder of a document with its mapped value.
///
/// Paragraphs containing at least one token get their runs collapsed: the
/// first run carries the new logical text and the remaining runs are
/// emptied, so per-character formatting inside such a paragraph is lost.
/// Paragraphs without tokens are left as they are.
///
/// Under [`MissingValuePolicy::Error`] the whole document is checked first;
/// the first unmapped token in traversal order is reported and the document
/// is left untouched.
pub fn substitute<S: ParagraphSource + ?Sized>(
    source: &mut S,
    values: &ValueMap,
    policy: MissingValuePolicy,
) -> Result<SubstitutionReport> {
    if policy == MissingValuePolicy::Error {
        if let Some(missing) = occurrences(&*source)
            .into_iter()
            .find(|o| !values.contains(&o.token))
        {
            log::debug!("no value for {} at {}", missing.token, missing.location);
            return Err(Error::MissingPlaceholder {
                token: missing.token,
            });
        }
    }

    let mut report = SubstitutionReport::default();
    for (location, paragraph) in source.paragraphs_mut() {
        let text = paragraph.text();
        let Some(result) = substitute_text(&text, values, policy)? else {
            continue;
        };
        log::debug!(
            "{}: {} replaced, {} kept across {} runs",
            location,
            result.replaced,
            result.kept.len(),
            paragraph.runs.len()
        );
        paragraph.set_text(result.text);
        report.paragraphs_rewritten += 1;
        report.replaced += result.replaced;
        report.kept.extend(result.kept);
    }

    if !report.kept.is_empty() {
        log::warn!(
            "{} placeholder(s) left without value: {}",
            report.kept.len(),
            report.kept.iter().cloned().collect::<Vec<_>>().join(", ")
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Paragraph, TextRun};
    use crate::placeholder::scan;

    fn values(pairs: &[(&str, &str)]) -> ValueMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_split_token_substitution() {
        let mut paragraphs = vec![Paragraph::from_runs(["{F", "IO}"])];
        let report = substitute(
            paragraphs.as_mut_slice(),
            &values(&[("{FIO}", "Иванов")]),
            MissingValuePolicy::Keep,
        )
        .unwrap();

        assert_eq!(paragraphs[0].text(), "Иванов");
        assert_eq!(paragraphs[0].runs[0].text, "Иванов");
        assert!(paragraphs[0].runs[1].is_empty());
        assert_eq!(report.replaced, 1);
        assert!(report.is_complete());
    }

    #[test]
    fn test_keep_policy_leaves_token() {
        let mut paragraphs = vec![Paragraph::with_text("Address: {ADDRESS}.")];
        let report =
            substitute(paragraphs.as_mut_slice(), &ValueMap::new(), MissingValuePolicy::Keep)
                .unwrap();
        assert_eq!(paragraphs[0].text(), "Address: {ADDRESS}.");
        assert!(report.kept.contains("{ADDRESS}"));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_error_policy_names_token_and_leaves_document() {
        let mut paragraphs = vec![
            Paragraph::from_runs(["Name: ", "{FIO}"]),
            Paragraph::with_text("Address: {ADDRESS}"),
        ];
        let before = paragraphs.clone();

        let err = substitute(
            paragraphs.as_mut_slice(),
            &values(&[("{FIO}", "Иванов")]),
            MissingValuePolicy::Error,
        )
        .unwrap_err();

        assert!(matches!(err, Error::MissingPlaceholder { ref token } if token == "{ADDRESS}"));
        assert_eq!(paragraphs, before);
    }

    #[test]
    fn test_untouched_paragraph_keeps_runs() {
        let mut p = Paragraph::new();
        p.add_run(TextRun::bold("no "));
        p.add_text("tokens");
        let mut paragraphs = vec![p.clone()];

        let report = substitute(paragraphs.as_mut_slice(), &ValueMap::new(), MissingValuePolicy::Error)
            .unwrap();
        assert_eq!(paragraphs[0], p);
        assert_eq!(report.paragraphs_rewritten, 0);
    }

    #[test]
    fn test_formatting_collapses_to_first_run() {
        let mut p = Paragraph::new();
        p.add_run(TextRun::bold("Client: "));
        p.add_run(TextRun::italic("{FIO}"));
        let mut paragraphs = vec![p];

        substitute(
            paragraphs.as_mut_slice(),
            &values(&[("{FIO}", "Petrov")]),
            MissingValuePolicy::Keep,
        )
        .unwrap();

        let runs = &paragraphs[0].runs;
        assert_eq!(runs[0].text, "Client: Petrov");
        assert!(runs[0].style.bold);
        assert!(runs[1].is_empty());
    }

    #[test]
    fn test_value_that_looks_like_token_is_not_rescanned() {
        let mut paragraphs = vec![Paragraph::with_text("{A}{B}")];
        substitute(
            paragraphs.as_mut_slice(),
            &values(&[("{A}", "{B}"), ("{B}", "b")]),
            MissingValuePolicy::Keep,
        )
        .unwrap();
        assert_eq!(paragraphs[0].text(), "{B}b");
    }

    #[test]
    fn test_noop_substitution_preserves_scan() {
        let mut paragraphs = vec![
            Paragraph::from_runs(["x {O", "NE} y"]),
            Paragraph::with_text("{TWO} {two}"),
        ];
        let before = scan(paragraphs.as_slice());
        substitute(paragraphs.as_mut_slice(), &ValueMap::new(), MissingValuePolicy::Keep).unwrap();
        assert_eq!(scan(paragraphs.as_slice()), before);
        assert_eq!(paragraphs[1].text(), "{TWO} {two}");
    }

    #[test]
    fn test_substitute_text_without_tokens() {
        assert_eq!(
            substitute_text("plain {lower}", &ValueMap::new(), MissingValuePolicy::Error).unwrap(),
            None
        );
    }
}
