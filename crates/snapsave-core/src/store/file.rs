//! Directory-backed snapshot store
//!
//! One subdirectory per slot, holding a JSON manifest for the current
//! committed revision plus one blob file per revision. A second manifest
//! (`conflict.json`) marks a divergent committed revision; while it
//! exists, `open` reports a conflict exactly like a remote store would.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::{
    CommitConfirmation, ConflictId, OpenOutcome, RevisionId, SaveSlot, SlotName, SnapshotHandle,
    SnapshotMetadataChange,
};
use crate::store::SnapshotStore;
use crate::{Error, Result};

const CURRENT_MANIFEST: &str = "current.json";
const CONFLICT_MANIFEST: &str = "conflict.json";

/// Manifest describing one committed revision
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RevisionManifest {
    revision: RevisionId,
    last_modified_ms: i64,
    content_length: u64,
    description: Option<String>,
}

/// Manifest describing a pending conflict and its divergent revision
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConflictManifest {
    conflict_id: ConflictId,
    revision: RevisionManifest,
}

/// Local directory-backed snapshot store used by the CLI harness
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at the given directory, creating it if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory of the store
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record a divergent committed revision for a slot
    ///
    /// The next `open` on the slot reports a conflict between the current
    /// revision and the injected one. Intended for demos and tests; a real
    /// remote store produces conflicts from concurrent writers instead.
    pub fn inject_conflict(
        &self,
        name: &SlotName,
        bytes: &[u8],
        description: Option<String>,
    ) -> Result<SnapshotHandle> {
        let dir = self.slot_dir(name);
        let Some(current) = read_json_opt::<RevisionManifest>(&dir.join(CURRENT_MANIFEST))? else {
            return Err(Error::SlotNotFound(name.to_string()));
        };
        if dir.join(CONFLICT_MANIFEST).exists() {
            return Err(Error::Store(format!(
                "slot {name} already has a pending conflict"
            )));
        }

        let manifest = RevisionManifest {
            revision: RevisionId::new(),
            last_modified_ms: next_timestamp(current.last_modified_ms),
            content_length: bytes.len() as u64,
            description,
        };
        fs::write(blob_path(&dir, manifest.revision), bytes)?;
        let conflict = ConflictManifest {
            conflict_id: ConflictId::new(),
            revision: manifest,
        };
        write_json(&dir.join(CONFLICT_MANIFEST), &conflict)?;

        tracing::info!(slot = %name, revision = %conflict.revision.revision, "injected conflicting revision");
        Ok(handle_from(name, &conflict.revision))
    }

    fn slot_dir(&self, name: &SlotName) -> PathBuf {
        self.root.join(name.as_str())
    }
}

impl SnapshotStore for FileStore {
    fn open(&self, name: &SlotName, create_if_missing: bool) -> Result<OpenOutcome> {
        let dir = self.slot_dir(name);
        let Some(current) = read_json_opt::<RevisionManifest>(&dir.join(CURRENT_MANIFEST))? else {
            if !create_if_missing {
                return Err(Error::SlotNotFound(name.to_string()));
            }
            fs::create_dir_all(&dir)?;
            let manifest = RevisionManifest {
                revision: RevisionId::new(),
                last_modified_ms: Utc::now().timestamp_millis(),
                content_length: 0,
                description: None,
            };
            fs::write(blob_path(&dir, manifest.revision), [])?;
            write_json(&dir.join(CURRENT_MANIFEST), &manifest)?;
            tracing::info!(slot = %name, "created save slot");
            return Ok(OpenOutcome::Success(handle_from(name, &manifest)));
        };

        if let Some(conflict) = read_json_opt::<ConflictManifest>(&dir.join(CONFLICT_MANIFEST))? {
            return Ok(OpenOutcome::Conflict {
                base: handle_from(name, &current),
                other: handle_from(name, &conflict.revision),
                conflict_id: conflict.conflict_id,
            });
        }

        Ok(OpenOutcome::Success(handle_from(name, &current)))
    }

    fn resolve_conflict(
        &self,
        conflict_id: &ConflictId,
        winner: &SnapshotHandle,
    ) -> Result<OpenOutcome> {
        let dir = self.slot_dir(&winner.slot);
        let Some(conflict) = read_json_opt::<ConflictManifest>(&dir.join(CONFLICT_MANIFEST))? else {
            return Ok(OpenOutcome::Failure(format!(
                "no pending conflict for slot {}",
                winner.slot
            )));
        };
        if conflict.conflict_id != *conflict_id {
            return Ok(OpenOutcome::Failure(format!(
                "unknown conflict id {conflict_id} for slot {}",
                winner.slot
            )));
        }
        let Some(current) = read_json_opt::<RevisionManifest>(&dir.join(CURRENT_MANIFEST))? else {
            return Ok(OpenOutcome::Failure(format!(
                "slot {} has no current revision",
                winner.slot
            )));
        };

        let (winning, losing) = if winner.revision == current.revision {
            (current, conflict.revision)
        } else if winner.revision == conflict.revision.revision {
            (conflict.revision, current)
        } else {
            return Ok(OpenOutcome::Failure(
                "winner matches neither conflicting revision".to_string(),
            ));
        };

        write_json(&dir.join(CURRENT_MANIFEST), &winning)?;
        fs::remove_file(dir.join(CONFLICT_MANIFEST))?;
        remove_revision_files(&dir, losing.revision)?;

        tracing::info!(
            slot = %winner.slot,
            winner = %winning.revision,
            discarded = %losing.revision,
            "resolved snapshot conflict"
        );
        Ok(OpenOutcome::Success(handle_from(&winner.slot, &winning)))
    }

    fn commit_and_close(
        &self,
        handle: SnapshotHandle,
        bytes: &[u8],
        change: SnapshotMetadataChange,
    ) -> Result<CommitConfirmation> {
        let dir = self.slot_dir(&handle.slot);
        let Some(current) = read_json_opt::<RevisionManifest>(&dir.join(CURRENT_MANIFEST))? else {
            return Err(Error::SlotNotFound(handle.slot.to_string()));
        };
        if current.revision != handle.revision {
            return Err(Error::HandleInvalidated(handle.slot.to_string()));
        }
        if dir.join(CONFLICT_MANIFEST).exists() {
            return Err(Error::Store(format!(
                "slot {} has an unresolved conflict",
                handle.slot
            )));
        }

        let committed_at_ms = next_timestamp(current.last_modified_ms);
        let revision = RevisionId::new();
        fs::write(blob_path(&dir, revision), bytes)?;
        if let Some(cover_image) = change.cover_image {
            fs::write(cover_path(&dir, revision), cover_image)?;
        } else {
            // Carry the previous cover forward when the change omits one.
            let previous = cover_path(&dir, current.revision);
            if previous.exists() {
                fs::rename(previous, cover_path(&dir, revision))?;
            }
        }

        let manifest = RevisionManifest {
            revision,
            last_modified_ms: committed_at_ms,
            content_length: bytes.len() as u64,
            description: change.description.or(current.description),
        };
        write_json(&dir.join(CURRENT_MANIFEST), &manifest)?;
        remove_revision_files(&dir, current.revision)?;

        tracing::info!(
            slot = %handle.slot,
            revision = %revision,
            bytes = bytes.len(),
            "committed snapshot"
        );
        Ok(CommitConfirmation {
            slot: handle.slot,
            revision,
            committed_at_ms,
        })
    }

    fn read_all(&self, handle: &SnapshotHandle) -> Result<Vec<u8>> {
        let path = blob_path(&self.slot_dir(&handle.slot), handle.revision);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                Err(Error::HandleInvalidated(handle.slot.to_string()))
            }
            Err(error) => {
                tracing::error!(slot = %handle.slot, error = %error, "error while reading snapshot");
                Err(error.into())
            }
        }
    }

    fn list_slots(&self, limit: usize) -> Result<Vec<SaveSlot>> {
        let mut slots = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let Ok(name) = SlotName::new(name) else {
                tracing::warn!(path = %entry.path().display(), "skipping directory with invalid slot name");
                continue;
            };
            match read_json_opt::<RevisionManifest>(&entry.path().join(CURRENT_MANIFEST)) {
                Ok(Some(manifest)) => slots.push(SaveSlot {
                    name,
                    description: manifest.description,
                    last_modified_ms: manifest.last_modified_ms,
                    content_length: manifest.content_length,
                }),
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(slot = %name, error = %error, "skipping slot with unreadable manifest");
                }
            }
        }
        slots.sort_by(|a, b| {
            b.last_modified_ms
                .cmp(&a.last_modified_ms)
                .then_with(|| a.name.as_str().cmp(b.name.as_str()))
        });
        slots.truncate(limit);
        Ok(slots)
    }

    fn delete_slot(&self, name: &SlotName) -> Result<()> {
        let dir = self.slot_dir(name);
        if !dir.is_dir() {
            return Err(Error::SlotNotFound(name.to_string()));
        }
        fs::remove_dir_all(dir)?;
        tracing::info!(slot = %name, "deleted save slot");
        Ok(())
    }
}

fn handle_from(name: &SlotName, manifest: &RevisionManifest) -> SnapshotHandle {
    SnapshotHandle {
        slot: name.clone(),
        revision: manifest.revision,
        last_modified_ms: manifest.last_modified_ms,
        content_length: manifest.content_length,
        description: manifest.description.clone(),
    }
}

fn blob_path(dir: &Path, revision: RevisionId) -> PathBuf {
    dir.join(format!("{revision}.bin"))
}

fn cover_path(dir: &Path, revision: RevisionId) -> PathBuf {
    dir.join(format!("{revision}.cover"))
}

fn next_timestamp(previous_ms: i64) -> i64 {
    Utc::now().timestamp_millis().max(previous_ms + 1)
}

fn remove_revision_files(dir: &Path, revision: RevisionId) -> Result<()> {
    for path in [blob_path(dir, revision), cover_path(dir, revision)] {
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => return Err(error.into()),
        }
    }
    Ok(())
}

fn read_json_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(error.into()),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
    fs::rename(tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::resolver::ConflictResolver;

    fn store() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        (dir, store)
    }

    fn slot(name: &str) -> SlotName {
        SlotName::new(name).unwrap()
    }

    fn open_success(store: &FileStore, name: &SlotName, create: bool) -> SnapshotHandle {
        match store.open(name, create).unwrap() {
            OpenOutcome::Success(handle) => handle,
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let (_dir, store) = store();
        let name = slot("campaign");

        let handle = open_success(&store, &name, true);
        let confirmation = store
            .commit_and_close(
                handle,
                b"level 7",
                SnapshotMetadataChange::new().with_description("Level 7"),
            )
            .unwrap();

        let reopened = open_success(&store, &name, false);
        assert_eq!(reopened.revision, confirmation.revision);
        assert_eq!(reopened.description.as_deref(), Some("Level 7"));
        assert_eq!(reopened.content_length, 7);
        assert_eq!(store.read_all(&reopened).unwrap(), b"level 7");
    }

    #[test]
    fn test_open_missing_without_create() {
        let (_dir, store) = store();
        assert!(matches!(
            store.open(&slot("missing"), false),
            Err(Error::SlotNotFound(_))
        ));
    }

    #[test]
    fn test_injected_conflict_is_reported_and_resolved_to_newer() {
        let (_dir, store) = store();
        let name = slot("campaign");

        let handle = open_success(&store, &name, true);
        store
            .commit_and_close(handle, b"old save", SnapshotMetadataChange::new())
            .unwrap();
        let injected = store
            .inject_conflict(&name, b"new save", Some("from other device".to_string()))
            .unwrap();

        let outcome = store.open(&name, false).unwrap();
        assert!(outcome.is_conflict());

        // Injected revision has the newer timestamp, so LWW keeps it.
        let resolved = ConflictResolver::new(&store).resolve(outcome).unwrap();
        assert_eq!(resolved.revision, injected.revision);
        assert_eq!(store.read_all(&resolved).unwrap(), b"new save");

        // The conflict is gone and the loser's blob was discarded.
        let reopened = open_success(&store, &name, false);
        assert_eq!(reopened.revision, injected.revision);
    }

    #[test]
    fn test_inject_conflict_twice_rejected() {
        let (_dir, store) = store();
        let name = slot("campaign");
        open_success(&store, &name, true);

        store.inject_conflict(&name, b"a", None).unwrap();
        assert!(matches!(
            store.inject_conflict(&name, b"b", None),
            Err(Error::Store(_))
        ));
    }

    #[test]
    fn test_commit_rejected_while_conflict_pending() {
        let (_dir, store) = store();
        let name = slot("campaign");
        let handle = open_success(&store, &name, true);
        store.inject_conflict(&name, b"divergent", None).unwrap();

        assert!(matches!(
            store.commit_and_close(handle, b"bytes", SnapshotMetadataChange::new()),
            Err(Error::Store(_))
        ));
    }

    #[test]
    fn test_resolve_with_unknown_conflict_id_fails_in_band() {
        let (_dir, store) = store();
        let name = slot("campaign");
        let handle = open_success(&store, &name, true);
        store.inject_conflict(&name, b"divergent", None).unwrap();

        let outcome = store
            .resolve_conflict(&ConflictId::new(), &handle)
            .unwrap();
        assert!(matches!(outcome, OpenOutcome::Failure(_)));
    }

    #[test]
    fn test_stale_handle_rejected_after_commit() {
        let (_dir, store) = store();
        let name = slot("campaign");
        let handle = open_success(&store, &name, true);

        store
            .commit_and_close(handle.clone(), b"v1", SnapshotMetadataChange::new())
            .unwrap();

        assert!(matches!(
            store.read_all(&handle),
            Err(Error::HandleInvalidated(_))
        ));
        assert!(matches!(
            store.commit_and_close(handle, b"v2", SnapshotMetadataChange::new()),
            Err(Error::HandleInvalidated(_))
        ));
    }

    #[test]
    fn test_cover_image_carries_forward_across_commits() {
        let (_dir, store) = store();
        let name = slot("campaign");
        let slot_dir = store.root().join(name.as_str());

        let handle = open_success(&store, &name, true);
        let first = store
            .commit_and_close(
                handle,
                b"v1",
                SnapshotMetadataChange::new().with_cover_image(vec![0xff, 0xd8]),
            )
            .unwrap();
        assert_eq!(
            fs::read(cover_path(&slot_dir, first.revision)).unwrap(),
            vec![0xff, 0xd8]
        );

        let handle = open_success(&store, &name, false);
        let second = store
            .commit_and_close(handle, b"v2", SnapshotMetadataChange::new())
            .unwrap();

        // The cover moved to the new revision and the old revision's
        // files are gone.
        assert_eq!(
            fs::read(cover_path(&slot_dir, second.revision)).unwrap(),
            vec![0xff, 0xd8]
        );
        assert!(!cover_path(&slot_dir, first.revision).exists());
        assert!(!blob_path(&slot_dir, first.revision).exists());
    }

    #[test]
    fn test_cover_image_replaced_when_change_supplies_one() {
        let (_dir, store) = store();
        let name = slot("campaign");
        let slot_dir = store.root().join(name.as_str());

        let handle = open_success(&store, &name, true);
        let first = store
            .commit_and_close(
                handle,
                b"v1",
                SnapshotMetadataChange::new().with_cover_image(vec![1]),
            )
            .unwrap();

        let handle = open_success(&store, &name, false);
        let second = store
            .commit_and_close(
                handle,
                b"v2",
                SnapshotMetadataChange::new().with_cover_image(vec![2]),
            )
            .unwrap();

        assert_eq!(fs::read(cover_path(&slot_dir, second.revision)).unwrap(), vec![2]);
        assert!(!cover_path(&slot_dir, first.revision).exists());
    }

    #[test]
    fn test_description_carries_forward_when_change_omits_it() {
        let (_dir, store) = store();
        let name = slot("campaign");

        let handle = open_success(&store, &name, true);
        store
            .commit_and_close(
                handle,
                b"v1",
                SnapshotMetadataChange::new().with_description("keep me"),
            )
            .unwrap();

        let handle = open_success(&store, &name, false);
        store
            .commit_and_close(handle, b"v2", SnapshotMetadataChange::new())
            .unwrap();

        let reopened = open_success(&store, &name, false);
        assert_eq!(reopened.description.as_deref(), Some("keep me"));
    }

    #[test]
    fn test_list_and_delete() {
        let (_dir, store) = store();
        for name in ["one", "two"] {
            let name = slot(name);
            let handle = open_success(&store, &name, true);
            store
                .commit_and_close(handle, name.as_str().as_bytes(), SnapshotMetadataChange::new())
                .unwrap();
        }

        assert_eq!(store.list_slots(10).unwrap().len(), 2);
        assert_eq!(store.list_slots(1).unwrap().len(), 1);

        store.delete_slot(&slot("one")).unwrap();
        let remaining = store.list_slots(10).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name.as_str(), "two");
    }
}
