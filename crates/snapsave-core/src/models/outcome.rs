//! Open outcome and conflict token types

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SnapshotHandle;

/// Opaque token identifying a pending conflict at the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictId(Uuid);

impl ConflictId {
    /// Create a fresh conflict token
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConflictId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConflictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of asking the store to open a slot or resolve a conflict
///
/// A slot has at most one current committed revision; `Conflict` means two
/// committed revisions exist concurrently and the store is asking the
/// caller to pick one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The slot opened cleanly on a single current revision
    Success(SnapshotHandle),
    /// Two committed revisions exist; the caller must choose a winner
    Conflict {
        /// The revision the store considers current
        base: SnapshotHandle,
        /// The divergent committed revision
        other: SnapshotHandle,
        /// Token to hand back when resolving
        conflict_id: ConflictId,
    },
    /// The store reported a hard, non-conflict error
    Failure(String),
}

impl OpenOutcome {
    /// Whether this outcome still needs conflict resolution
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
