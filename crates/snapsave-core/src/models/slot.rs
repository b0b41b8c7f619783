//! Save slot naming and listing metadata

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Maximum accepted slot name length in characters
const MAX_NAME_LEN: usize = 128;

/// A unique name identifying a logical save slot within an account's
/// save namespace
///
/// Names are created by the client when starting a new game and used to
/// address the slot from then on. [`SlotName::generate`] produces a
/// fresh name with a time-sortable UUID v7 suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotName(String);

impl SlotName {
    /// Validate and wrap a slot name
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidSlotName("name must not be empty".to_string()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(Error::InvalidSlotName(format!(
                "name exceeds {MAX_NAME_LEN} characters"
            )));
        }
        if name.contains(['/', '\\']) {
            return Err(Error::InvalidSlotName(
                "name must not contain path separators".to_string(),
            ));
        }
        if name.chars().any(char::is_control) {
            return Err(Error::InvalidSlotName(
                "name must not contain control characters".to_string(),
            ));
        }
        if name.starts_with('.') {
            return Err(Error::InvalidSlotName(
                "name must not start with '.'".to_string(),
            ));
        }
        Ok(Self(name))
    }

    /// Generate a unique slot name with the given prefix
    pub fn generate(prefix: &str) -> Result<Self> {
        Self::new(format!("{prefix}-{}", Uuid::now_v7().simple()))
    }

    /// Get the name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SlotName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for SlotName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SlotName> for String {
    fn from(name: SlotName) -> Self {
        name.0
    }
}

/// Listing metadata for a save slot, as shown by a save picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSlot {
    /// Slot name
    pub name: SlotName,
    /// Description of the current committed revision
    pub description: Option<String>,
    /// Last modification timestamp of the current revision (Unix ms)
    pub last_modified_ms: i64,
    /// Size of the current revision's blob in bytes
    pub content_length: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_name_accepts_plain_names() {
        let name = SlotName::new("campaign-1").unwrap();
        assert_eq!(name.as_str(), "campaign-1");
    }

    #[test]
    fn test_slot_name_rejects_empty() {
        assert!(SlotName::new("").is_err());
        assert!(SlotName::new("   ").is_err());
    }

    #[test]
    fn test_slot_name_rejects_separators() {
        assert!(SlotName::new("saves/slot1").is_err());
        assert!(SlotName::new("saves\\slot1").is_err());
    }

    #[test]
    fn test_slot_name_rejects_leading_dot() {
        assert!(SlotName::new(".hidden").is_err());
    }

    #[test]
    fn test_slot_name_rejects_overlong() {
        let name = "a".repeat(MAX_NAME_LEN + 1);
        assert!(SlotName::new(name).is_err());
    }

    #[test]
    fn test_generate_unique() {
        let a = SlotName::generate("snapshotTemp").unwrap();
        let b = SlotName::generate("snapshotTemp").unwrap();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("snapshotTemp-"));
    }

    #[test]
    fn test_slot_name_parse() {
        let name: SlotName = "quick-save".parse().unwrap();
        assert_eq!(name.to_string(), "quick-save");
    }
}
