//! Async service wrapper over a blocking snapshot store
//!
//! Store calls block the calling thread, so they must never run on a
//! context that owns UI responsiveness. `SnapshotService` runs each
//! open/resolve/read/commit sequence on `tokio::task::spawn_blocking` and
//! hands the result back as a future.

use std::sync::Arc;

use crate::models::{
    CommitConfirmation, SaveSlot, SlotName, SnapshotHandle, SnapshotMetadataChange,
};
use crate::resolver::ConflictResolver;
use crate::store::SnapshotStore;
use crate::{Error, Result};

/// A resolved snapshot together with its blob content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSnapshot {
    /// Handle of the revision the bytes were read from
    pub handle: SnapshotHandle,
    /// Full save blob
    pub bytes: Vec<u8>,
}

/// Thread-safe service for snapshot store operations
///
/// Holds the store as an injected dependency; cheap to clone and share
/// across tasks.
#[derive(Clone)]
pub struct SnapshotService {
    store: Arc<dyn SnapshotStore>,
}

impl SnapshotService {
    /// Create a service over the given store
    #[must_use]
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Open a slot, resolve any conflict, and read its full content
    pub async fn load_slot(&self, name: &SlotName) -> Result<LoadedSnapshot> {
        let store = Arc::clone(&self.store);
        let name = name.clone();
        run_blocking(move || {
            let outcome = store.open(&name, false)?;
            let handle = ConflictResolver::new(store.as_ref()).resolve(outcome)?;
            let bytes = store.read_all(&handle)?;
            tracing::info!(slot = %name, bytes = bytes.len(), "loaded snapshot");
            Ok(LoadedSnapshot { handle, bytes })
        })
        .await
    }

    /// Open (or create) a slot, resolve any conflict, and commit new bytes
    /// and metadata as its current revision
    pub async fn save_slot(
        &self,
        name: &SlotName,
        bytes: Vec<u8>,
        change: SnapshotMetadataChange,
    ) -> Result<CommitConfirmation> {
        let store = Arc::clone(&self.store);
        let name = name.clone();
        run_blocking(move || {
            let outcome = store.open(&name, true)?;
            let handle = ConflictResolver::new(store.as_ref()).resolve(outcome)?;
            store.commit_and_close(handle, &bytes, change)
        })
        .await
    }

    /// List slots for a save picker, newest first
    pub async fn list_slots(&self, limit: usize) -> Result<Vec<SaveSlot>> {
        let store = Arc::clone(&self.store);
        run_blocking(move || store.list_slots(limit)).await
    }

    /// Delete a slot and all of its revisions
    pub async fn delete_slot(&self, name: &SlotName) -> Result<()> {
        let store = Arc::clone(&self.store);
        let name = name.clone();
        run_blocking(move || store.delete_slot(&name)).await
    }
}

async fn run_blocking<T, F>(job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|error| Error::Background(error.to_string()))?
}
