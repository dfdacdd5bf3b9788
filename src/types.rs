#![forbid(unsafe_code)]

//! Core domain types for named validations
//!
//! Parameters are plain JSON values so that the final mapping can be handed to
//! any consumer that understands a keyed container of validation options.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

pub use serde_json::Value;

/// A keyed container of validation parameters
pub type Params = serde_json::Map<String, Value>;

/// A validated validation or alias name
///
/// Names must be non-empty and contain only ASCII alphanumeric characters and
/// underscores, optionally ending in a single `?` or `!`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValidationName(String);

impl ValidationName {
    /// Creates a new ValidationName, validating the input
    ///
    /// Returns None if the input is empty or contains invalid characters
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let body = name
            .strip_suffix('?')
            .or_else(|| name.strip_suffix('!'))
            .unwrap_or(&name);
        if body.is_empty() {
            return None;
        }
        if !body.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        Some(ValidationName(name))
    }

    /// Wraps a name known to be valid at compile time
    pub(crate) fn from_static(name: &'static str) -> Self {
        ValidationName(name.to_string())
    }

    /// Returns the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ValidationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ValidationName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ValidationName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ValidationName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl TryFrom<String> for ValidationName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ValidationName::new(value).ok_or_else(|| "Invalid validation name".to_string())
    }
}

impl From<ValidationName> for String {
    fn from(name: ValidationName) -> Self {
        name.0
    }
}
