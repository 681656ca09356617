//! Fetched parameter records
//!
//! The fetch step hands the core a list of [`Parameter`]s. Values are kept in
//! `secrecy::SecretString` so that `Debug` output never shows them, whatever
//! their type tag says.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of a parameter-store value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterType {
    /// Plain text
    String,
    /// Comma separated list of plain text values
    StringList,
    /// Encrypted at rest; eligible for redaction
    SecureString,
}

impl ParameterType {
    /// Parse the type tag used by the parameter store.
    ///
    /// Returns `None` for tags this crate does not know about.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "String" => Some(Self::String),
            "StringList" => Some(Self::StringList),
            "SecureString" => Some(Self::SecureString),
            _ => None,
        }
    }

    /// The tag as used by the parameter store
    #[must_use]
    pub const fn as_tag(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::StringList => "StringList",
            Self::SecureString => "SecureString",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A single parameter returned by the parameter store.
#[derive(Clone)]
pub struct Parameter {
    name: String,
    value: SecretString,
    kind: ParameterType,
}

impl Parameter {
    /// Create a parameter record
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, kind: ParameterType) -> Self {
        Self {
            name: name.into(),
            value: SecretString::from(value.into()),
            kind,
        }
    }

    /// Full hierarchical name, e.g. `/app/prod/db/password`
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type tag
    #[must_use]
    pub const fn kind(&self) -> ParameterType {
        self.kind
    }

    /// Whether the value must be kept out of job output
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.kind == ParameterType::SecureString
    }

    /// Expose the value.
    ///
    /// Callers use this to set environment variables or register the value
    /// for redaction; it must not be logged.
    #[must_use]
    pub fn expose_value(&self) -> &str {
        self.value.expose_secret()
    }

    /// Split into name and value
    #[must_use]
    pub fn into_parts(self) -> (String, SecretString) {
        (self.name, self.value)
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("kind", &self.kind)
            .finish()
    }
}
