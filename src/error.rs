//! Error types for docfill library.

use std::io;
use thiserror::Error;

/// Result type alias for docfill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while scanning or filling templates.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a ZIP-based Office package.
    #[error("Unknown file format: not a valid DOCX package")]
    UnknownFormat,

    /// The package or one of its XML parts cannot be parsed.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// A required package part is absent.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// A placeholder has no value and the policy is `error`.
    #[error("Missing value for placeholder {token}")]
    MissingPlaceholder {
        /// The unmapped token, braces included
        token: String,
    },

    /// Unrecognized missing-value policy name.
    #[error("Invalid missing-value policy: {0:?} (expected \"keep\" or \"error\")")]
    InvalidPolicy(String),

    /// A value-map key or entity code is not a valid placeholder.
    #[error("Invalid placeholder: {0:?} (expected {{UPPER_SNAKE_ID}})")]
    InvalidPlaceholder(String),

    /// A batch recipient failed; the whole batch is abandoned.
    #[error("recipient {recipient}: {source}")]
    Recipient {
        /// Recipient identifier
        recipient: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Error during rendering (text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// The unmapped token if this is (or wraps) a missing-placeholder failure.
    pub fn missing_placeholder(&self) -> Option<&str> {
        match self {
            Error::MissingPlaceholder { token } => Some(token),
            Error::Recipient { source, .. } => source.missing_placeholder(),
            _ => None,
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => Error::MissingPart(err.to_string()),
            _ => Error::MalformedDocument(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::MalformedDocument(format!("XML error: {}", err))
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::MalformedDocument(format!("XML attribute error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingPlaceholder {
            token: "{ADDRESS}".to_string(),
        };
        assert_eq!(err.to_string(), "Missing value for placeholder {ADDRESS}");

        let err = Error::InvalidPolicy("skip".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid missing-value policy: \"skip\" (expected \"keep\" or \"error\")"
        );
    }

    #[test]
    fn test_recipient_error_display() {
        let err = Error::Recipient {
            recipient: "42".to_string(),
            source: Box::new(Error::MissingPlaceholder {
                token: "{FIO}".to_string(),
            }),
        };
        assert_eq!(err.to_string(), "recipient 42: Missing value for placeholder {FIO}");
        assert_eq!(err.missing_placeholder(), Some("{FIO}"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.missing_placeholder().is_none());
    }

    #[test]
    fn test_zip_error_conversion() {
        let err: Error = zip::result::ZipError::InvalidArchive("bad header".into()).into();
        assert!(matches!(err, Error::MalformedDocument(_)));
    }
}
