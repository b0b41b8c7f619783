//! Snapshot store contract and local implementations

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::models::{
    CommitConfirmation, ConflictId, OpenOutcome, SaveSlot, SlotName, SnapshotHandle,
    SnapshotMetadataChange,
};
use crate::Result;

/// Blocking client contract for a remote snapshot store
///
/// Every call suspends the calling thread until the store replies. Callers
/// that own UI responsiveness should go through
/// [`SnapshotService`](crate::service::SnapshotService), which moves store
/// work onto a background worker.
pub trait SnapshotStore: Send + Sync {
    /// Open the current revision of a slot
    ///
    /// May return [`OpenOutcome::Conflict`] when two committed revisions
    /// exist concurrently.
    fn open(&self, name: &SlotName, create_if_missing: bool) -> Result<OpenOutcome>;

    /// Resolve a pending conflict in favor of `winner`
    ///
    /// May itself return a fresh conflict if another writer raced in
    /// between.
    fn resolve_conflict(
        &self,
        conflict_id: &ConflictId,
        winner: &SnapshotHandle,
    ) -> Result<OpenOutcome>;

    /// Write new bytes and metadata, commit them as the slot's current
    /// revision, and close the handle
    ///
    /// The handle is consumed; it is invalid after a successful commit.
    fn commit_and_close(
        &self,
        handle: SnapshotHandle,
        bytes: &[u8],
        change: SnapshotMetadataChange,
    ) -> Result<CommitConfirmation>;

    /// Read the full blob content of an open revision
    fn read_all(&self, handle: &SnapshotHandle) -> Result<Vec<u8>>;

    /// List slots for a save picker, newest first, at most `limit` entries
    fn list_slots(&self, limit: usize) -> Result<Vec<SaveSlot>>;

    /// Delete a slot and all of its revisions
    fn delete_slot(&self, name: &SlotName) -> Result<()>;
}
