//! In-memory snapshot store for tests and scripted conflict scenarios

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use crate::models::{
    CommitConfirmation, ConflictId, OpenOutcome, RevisionId, SaveSlot, SlotName, SnapshotHandle,
    SnapshotMetadataChange,
};
use crate::store::SnapshotStore;
use crate::{Error, Result};

/// One committed revision held in memory
#[derive(Debug, Clone)]
struct Revision {
    revision: RevisionId,
    last_modified_ms: i64,
    description: Option<String>,
    cover_image: Option<Vec<u8>>,
    bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct Inner {
    slots: HashMap<SlotName, Revision>,
    queued: VecDeque<OpenOutcome>,
    open_calls: usize,
    resolve_calls: usize,
    resolved_winners: Vec<SnapshotHandle>,
    // Store-assigned timestamps are monotonic across the whole store so
    // listing order stays stable within a single millisecond.
    clock_ms: i64,
}

impl Inner {
    fn tick(&mut self) -> i64 {
        self.clock_ms = Utc::now().timestamp_millis().max(self.clock_ms + 1);
        self.clock_ms
    }
}

/// In-process snapshot store
///
/// Behaves as a plain single-writer store, so conflicts never arise on
/// their own. Tests drive the conflict path by queueing outcomes with
/// [`MemoryStore::queue_outcome`]: while the queue is non-empty, `open`
/// and `resolve_conflict` pop from it instead of consulting slot state.
/// Call counters expose how many store round-trips a flow issued.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty in-memory store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome to be returned by the next `open` or
    /// `resolve_conflict` call
    pub fn queue_outcome(&self, outcome: OpenOutcome) {
        self.lock().queued.push_back(outcome);
    }

    /// Number of `open` calls issued so far
    pub fn open_calls(&self) -> usize {
        self.lock().open_calls
    }

    /// Number of `resolve_conflict` calls issued so far
    pub fn resolve_calls(&self) -> usize {
        self.lock().resolve_calls
    }

    /// The winner handle passed to the most recent `resolve_conflict` call
    pub fn last_resolved_winner(&self) -> Option<SnapshotHandle> {
        self.lock().resolved_winners.last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle_for(name: &SlotName, revision: &Revision) -> SnapshotHandle {
        SnapshotHandle {
            slot: name.clone(),
            revision: revision.revision,
            last_modified_ms: revision.last_modified_ms,
            content_length: revision.bytes.len() as u64,
            description: revision.description.clone(),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn open(&self, name: &SlotName, create_if_missing: bool) -> Result<OpenOutcome> {
        let mut inner = self.lock();
        inner.open_calls += 1;

        if let Some(outcome) = inner.queued.pop_front() {
            return Ok(outcome);
        }

        if let Some(revision) = inner.slots.get(name) {
            return Ok(OpenOutcome::Success(Self::handle_for(name, revision)));
        }

        if !create_if_missing {
            return Err(Error::SlotNotFound(name.to_string()));
        }

        let revision = Revision {
            revision: RevisionId::new(),
            last_modified_ms: inner.tick(),
            description: None,
            cover_image: None,
            bytes: Vec::new(),
        };
        let handle = Self::handle_for(name, &revision);
        inner.slots.insert(name.clone(), revision);
        Ok(OpenOutcome::Success(handle))
    }

    fn resolve_conflict(
        &self,
        _conflict_id: &ConflictId,
        winner: &SnapshotHandle,
    ) -> Result<OpenOutcome> {
        let mut inner = self.lock();
        inner.resolve_calls += 1;
        inner.resolved_winners.push(winner.clone());

        if let Some(outcome) = inner.queued.pop_front() {
            return Ok(outcome);
        }

        // Install the winner as the slot's current revision, keeping any
        // bytes already held for the slot.
        let bytes = inner
            .slots
            .get(&winner.slot)
            .map(|revision| revision.bytes.clone())
            .unwrap_or_default();
        inner.slots.insert(
            winner.slot.clone(),
            Revision {
                revision: winner.revision,
                last_modified_ms: winner.last_modified_ms,
                description: winner.description.clone(),
                cover_image: None,
                bytes,
            },
        );
        Ok(OpenOutcome::Success(winner.clone()))
    }

    fn commit_and_close(
        &self,
        handle: SnapshotHandle,
        bytes: &[u8],
        change: SnapshotMetadataChange,
    ) -> Result<CommitConfirmation> {
        let mut inner = self.lock();
        if !inner
            .slots
            .get(&handle.slot)
            .is_some_and(|current| current.revision == handle.revision)
        {
            return Err(Error::HandleInvalidated(handle.slot.to_string()));
        }

        let committed_at_ms = inner.tick();
        let current = inner
            .slots
            .get_mut(&handle.slot)
            .ok_or_else(|| Error::HandleInvalidated(handle.slot.to_string()))?;
        let revision = RevisionId::new();
        current.revision = revision;
        current.last_modified_ms = committed_at_ms;
        current.bytes = bytes.to_vec();
        if let Some(description) = change.description {
            current.description = Some(description);
        }
        if let Some(cover_image) = change.cover_image {
            current.cover_image = Some(cover_image);
        }

        Ok(CommitConfirmation {
            slot: handle.slot,
            revision,
            committed_at_ms,
        })
    }

    fn read_all(&self, handle: &SnapshotHandle) -> Result<Vec<u8>> {
        let inner = self.lock();
        let Some(current) = inner.slots.get(&handle.slot) else {
            return Err(Error::HandleInvalidated(handle.slot.to_string()));
        };
        if current.revision != handle.revision {
            return Err(Error::HandleInvalidated(handle.slot.to_string()));
        }
        Ok(current.bytes.clone())
    }

    fn list_slots(&self, limit: usize) -> Result<Vec<SaveSlot>> {
        let inner = self.lock();
        let mut slots = inner
            .slots
            .iter()
            .map(|(name, revision)| SaveSlot {
                name: name.clone(),
                description: revision.description.clone(),
                last_modified_ms: revision.last_modified_ms,
                content_length: revision.bytes.len() as u64,
            })
            .collect::<Vec<_>>();
        slots.sort_by(|a, b| {
            b.last_modified_ms
                .cmp(&a.last_modified_ms)
                .then_with(|| a.name.as_str().cmp(b.name.as_str()))
        });
        slots.truncate(limit);
        Ok(slots)
    }

    fn delete_slot(&self, name: &SlotName) -> Result<()> {
        let mut inner = self.lock();
        if inner.slots.remove(name).is_none() {
            return Err(Error::SlotNotFound(name.to_string()));
        }
        Ok(())
    }
}
