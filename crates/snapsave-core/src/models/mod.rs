//! Shared data model for snapshot stores and the conflict resolver

mod outcome;
mod slot;
mod snapshot;

pub use outcome::{ConflictId, OpenOutcome};
pub use slot::{SaveSlot, SlotName};
pub use snapshot::{CommitConfirmation, RevisionId, SnapshotHandle, SnapshotMetadataChange};
