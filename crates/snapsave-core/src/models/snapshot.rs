//! Snapshot handle and commit types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SlotName;

/// A unique identifier for one stored revision, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevisionId(Uuid);

impl RevisionId {
    /// Create a new unique revision ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RevisionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RevisionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// An opaque reference to one stored revision of a save slot
///
/// The blob bytes stay in the store; the handle carries only the metadata
/// needed to compare revisions and address the content. A handle stops
/// being valid once its revision is committed-and-closed or superseded by
/// conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHandle {
    /// Slot this revision belongs to
    pub slot: SlotName,
    /// Revision identifier, assigned by the store
    pub revision: RevisionId,
    /// Store-assigned modification timestamp (Unix ms, monotonic per slot)
    pub last_modified_ms: i64,
    /// Size of the revision's blob in bytes
    pub content_length: u64,
    /// Description attached at commit time
    pub description: Option<String>,
}

/// Metadata applied to a snapshot when it is committed
///
/// Fields left as `None` keep the previous revision's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotMetadataChange {
    /// New description for the save, shown in slot listings
    pub description: Option<String>,
    /// Cover image bytes; carried opaquely, never decoded
    pub cover_image: Option<Vec<u8>>,
}

impl SnapshotMetadataChange {
    /// An empty change that keeps all previous metadata
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the cover image bytes
    #[must_use]
    pub fn with_cover_image(mut self, cover_image: Vec<u8>) -> Self {
        self.cover_image = Some(cover_image);
        self
    }
}

/// Confirmation of a committed-and-closed snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitConfirmation {
    /// Slot the revision was committed to
    pub slot: SlotName,
    /// Revision id of the committed content
    pub revision: RevisionId,
    /// Store-assigned commit timestamp (Unix ms)
    pub committed_at_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_id_unique() {
        let a = RevisionId::new();
        let b = RevisionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_revision_id_parse() {
        let id = RevisionId::new();
        let parsed: RevisionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_metadata_change_builder() {
        let change = SnapshotMetadataChange::new()
            .with_description("Level 12, 3 lives")
            .with_cover_image(vec![0xff, 0xd8]);
        assert_eq!(change.description.as_deref(), Some("Level 12, 3 lives"));
        assert_eq!(change.cover_image, Some(vec![0xff, 0xd8]));
    }

    #[test]
    fn test_metadata_change_default_keeps_everything() {
        let change = SnapshotMetadataChange::new();
        assert!(change.description.is_none());
        assert!(change.cover_image.is_none());
    }
}
