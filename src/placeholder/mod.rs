//! Placeholder engine: scanning and substitution of `{UPPER_SNAKE}` tokens.
//!
//! Both operations work on paragraph *logical text* (the concatenation of a
//! paragraph's runs), never on individual runs, so tokens that the editor
//! split across formatting runs are handled like any other.
//!
//! # Example
//!
//! ```
//! use docfill::model::{Document, Paragraph};
//! use docfill::placeholder::{scan, substitute, MissingValuePolicy};
//! use docfill::ValueMap;
//!
//! let mut doc = Document::new();
//! doc.add_paragraph(Paragraph::from_runs(["Dear {F", "IO},"]));
//!
//! assert!(scan(&doc).contains("{FIO}"));
//!
//! let values: ValueMap = [("{FIO}", "Иванов")].into_iter().collect();
//! substitute(&mut doc, &values, MissingValuePolicy::Error)?;
//! assert_eq!(doc.plain_text(), "Dear Иванов,");
//! # Ok::<(), docfill::Error>(())
//! ```

mod pattern;
mod policy;
mod scan;
mod substitute;
mod values;

pub use pattern::{
    find_placeholders, is_placeholder, normalize_token, PlaceholderMatch, PLACEHOLDER_PATTERN,
};
pub use policy::MissingValuePolicy;
pub use scan::{occurrences, scan, Occurrence};
pub use substitute::{substitute, substitute_text, SubstitutionReport, TextSubstitution};
pub use values::ValueMap;
