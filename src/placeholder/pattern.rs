//! Placeholder token syntax.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Regular expression for a placeholder token: `{` + `[A-Z0-9_]+` + `}`.
pub const PLACEHOLDER_PATTERN: &str = r"\{[A-Z0-9_]+\}";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid"))
}

/// A placeholder occurrence inside a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderMatch<'t> {
    /// The token, braces included
    pub token: &'t str,
    /// Byte offset of the opening brace
    pub start: usize,
    /// Byte offset just past the closing brace
    pub end: usize,
}

/// Find placeholder tokens left to right, without overlaps.
///
/// ```
/// use docfill::placeholder::find_placeholders;
///
/// let tokens: Vec<&str> = find_placeholders("{A}, {b}, {{C}}")
///     .map(|m| m.token)
///     .collect();
/// assert_eq!(tokens, ["{A}", "{C}"]);
/// ```
pub fn find_placeholders(text: &str) -> impl Iterator<Item = PlaceholderMatch<'_>> {
    placeholder_regex().find_iter(text).map(|m| PlaceholderMatch {
        token: m.as_str(),
        start: m.start(),
        end: m.end(),
    })
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'
}

/// Check whether `s` is exactly one placeholder token.
pub fn is_placeholder(s: &str) -> bool {
    s.strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .is_some_and(|inner| !inner.is_empty() && inner.chars().all(is_token_char))
}

/// Normalize an entity code or bare field name into a token.
///
/// Accepts `{FIO}` or `FIO` (surrounding whitespace ignored) and returns
/// `{FIO}`. Anything else is rejected, since it could never match.
pub fn normalize_token(code: &str) -> Result<String> {
    let code = code.trim();
    if is_placeholder(code) {
        return Ok(code.to_string());
    }
    let wrapped = format!("{{{}}}", code);
    if is_placeholder(&wrapped) {
        Ok(wrapped)
    } else {
        Err(Error::InvalidPlaceholder(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_positions() {
        let text = "Dear {FIO}, your id is {ID_2}.";
        let found: Vec<_> = find_placeholders(text).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].token, "{FIO}");
        assert_eq!(&text[found[0].start..found[0].end], "{FIO}");
        assert_eq!(found[1].token, "{ID_2}");
    }

    #[test]
    fn test_syntax_boundary() {
        for text in ["{fio}", "{fio-1}", "{Fio}", "{}", "{ FIO }", "{FIO-1}", "FIO"] {
            assert_eq!(find_placeholders(text).count(), 0, "{text:?} must not match");
        }
    }

    #[test]
    fn test_unicode_letters_do_not_match() {
        assert_eq!(find_placeholders("{ФИО}").count(), 0);
        let found: Vec<_> = find_placeholders("Иванов {FIO} Иван").collect();
        assert_eq!(found[0].token, "{FIO}");
    }

    #[test]
    fn test_is_placeholder() {
        assert!(is_placeholder("{FIO}"));
        assert!(is_placeholder("{A_1}"));
        assert!(!is_placeholder("{fio}"));
        assert!(!is_placeholder("{FIO}x"));
        assert!(!is_placeholder("{}"));
        assert!(!is_placeholder("{{FIO}}"));
    }

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("FIO").unwrap(), "{FIO}");
        assert_eq!(normalize_token(" {ADDRESS} ").unwrap(), "{ADDRESS}");
        assert!(matches!(
            normalize_token("fio"),
            Err(Error::InvalidPlaceholder(_))
        ));
        assert!(normalize_token("{FIO").is_err());
    }
}
