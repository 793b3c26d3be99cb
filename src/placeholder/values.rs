//! Value mapping from placeholder tokens to replacement text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::pattern::normalize_token;
use crate::error::Result;

/// Replacement values keyed by token, braces included (`"{FIO}"`).
///
/// Serializes as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueMap {
    values: BTreeMap<String, String>,
}

impl ValueMap {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from entity codes or bare field names.
    ///
    /// ```
    /// use docfill::ValueMap;
    ///
    /// let values = ValueMap::from_fields([("FIO", "Иванов"), ("{CITY}", "Moscow")]).unwrap();
    /// assert_eq!(values.get("{FIO}"), Some("Иванов"));
    /// assert_eq!(values.get("{CITY}"), Some("Moscow"));
    /// ```
    pub fn from_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (code, value) in fields {
            map.insert_field(code.as_ref(), value)?;
        }
        Ok(map)
    }

    /// Insert a value under an exact token. Returns the previous value.
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(token.into(), value.into())
    }

    /// Insert a value under a normalized entity code (`FIO` or `{FIO}`).
    pub fn insert_field(&mut self, code: &str, value: impl Into<String>) -> Result<Option<String>> {
        let token = normalize_token(code)?;
        Ok(self.values.insert(token, value.into()))
    }

    /// Get the value for a token.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    /// Check if a token has a value.
    pub fn contains(&self, token: &str) -> bool {
        self.values.contains_key(token)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over (token, value) pairs in token order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Tokens from `tokens` that have no value, in input order.
    pub fn missing<'a>(&self, tokens: impl IntoIterator<Item = &'a String>) -> Vec<&'a str> {
        tokens
            .into_iter()
            .filter(|t| !self.contains(t))
            .map(String::as_str)
            .collect()
    }

    /// Overlay `other` on top of this mapping.
    pub fn merge(&mut self, other: &ValueMap) {
        for (k, v) in other.iter() {
            self.values.insert(k.to_string(), v.to_string());
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
