//! Shift name newtype.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The name of a work shift (e.g. `"Night"`, `"Morning"`, `"Evening"`).
///
/// The set of valid shifts is site-defined through the shift schedule
/// configuration rather than a closed enum, so sites with non-standard
/// rosters can add their own shifts without code changes. Comparison is
/// case-sensitive; session keys use the lowercased form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftName(String);

impl ShiftName {
    /// Create a shift name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Return the shift name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the lowercased form used in session keys.
    pub fn key_segment(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for ShiftName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ShiftName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ShiftName {
    fn from(value: String) -> Self {
        Self(value)
    }
}
