//! Missing-value policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// What to do with a placeholder that has no value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingValuePolicy {
    /// Leave the token in the text verbatim
    #[default]
    Keep,
    /// Fail with [`Error::MissingPlaceholder`]
    Error,
}

impl MissingValuePolicy {
    /// Policy name as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingValuePolicy::Keep => "keep",
            MissingValuePolicy::Error => "error",
        }
    }
}

impl fmt::Display for MissingValuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingValuePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep" => Ok(MissingValuePolicy::Keep),
            "error" => Ok(MissingValuePolicy::Error),
            other => Err(Error::InvalidPolicy(other.to_string())),
        }
    }
}
