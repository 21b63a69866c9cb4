//! Session key newtype.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::shift::ShiftName;

/// The derived identifier addressing one Session document in the store.
///
/// Format: `"<shift-lowercase>_<YYYY-MM-DD>"`, e.g. `"night_2024-03-09"`.
/// The key stays constant for the entire physical duration of one shift
/// occurrence even when the wall-clock date changes partway through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Build a session key from a shift name and its resolved session date.
    pub fn for_shift(shift: &ShiftName, session_date: NaiveDate) -> Self {
        Self(format!(
            "{}_{}",
            shift.key_segment(),
            session_date.format("%Y-%m-%d")
        ))
    }

    /// Return the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let key = SessionKey::for_shift(&ShiftName::from("Night"), date);
        assert_eq!(key.as_str(), "night_2024-03-09");
    }
}
