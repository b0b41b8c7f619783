//! Bounded-retry last-writer-wins conflict resolution
//!
//! Turns a possibly-conflicting open result into a single resolved
//! [`SnapshotHandle`] or a definitive error. The policy is
//! last-writer-wins: the revision with the newer store-assigned
//! modification timestamp survives, the other is discarded. Resolution
//! itself can race with other writers, so the store may answer a resolve
//! call with a fresh conflict; the loop retries up to
//! [`MAX_RESOLVE_RETRIES`] times and then gives up explicitly rather than
//! recursing forever.

use crate::models::{OpenOutcome, SnapshotHandle};
use crate::store::SnapshotStore;
use crate::{Error, Result};

/// Maximum number of resolve round-trips per open before giving up
pub const MAX_RESOLVE_RETRIES: u32 = 3;

/// Resolves snapshot open conflicts against an injected store
///
/// Calls block until the store replies; run resolution on a background
/// worker when the caller owns UI responsiveness (see
/// [`SnapshotService`](crate::service::SnapshotService)).
pub struct ConflictResolver<'a> {
    store: &'a dyn SnapshotStore,
}

impl<'a> ConflictResolver<'a> {
    /// Create a resolver over the given store
    #[must_use]
    pub fn new(store: &'a dyn SnapshotStore) -> Self {
        Self { store }
    }

    /// Drive an open outcome to a resolved handle or a definitive error
    ///
    /// - `Success` returns the handle as-is, with no further store calls.
    /// - `Failure` maps to [`Error::Store`] immediately and is never
    ///   retried; the store reported a hard error, not a resolvable
    ///   conflict.
    /// - `Conflict` picks a winner, asks the store to resolve, and loops
    ///   on the new outcome. Each step issues exactly one store call;
    ///   after [`MAX_RESOLVE_RETRIES`] resolve calls the loop returns
    ///   [`Error::RetriesExhausted`].
    pub fn resolve(&self, outcome: OpenOutcome) -> Result<SnapshotHandle> {
        let mut outcome = outcome;
        let mut attempt: u32 = 0;

        loop {
            match outcome {
                OpenOutcome::Success(handle) => return Ok(handle),
                OpenOutcome::Failure(reason) => {
                    tracing::error!(reason = %reason, "snapshot open failed");
                    return Err(Error::Store(reason));
                }
                OpenOutcome::Conflict {
                    base,
                    other,
                    conflict_id,
                } => {
                    let winner = pick_winner(base, other);
                    tracing::info!(
                        slot = %winner.slot,
                        attempt,
                        winner_modified_ms = winner.last_modified_ms,
                        "resolving snapshot conflict"
                    );

                    let next = self.store.resolve_conflict(&conflict_id, &winner)?;

                    if attempt + 1 < MAX_RESOLVE_RETRIES {
                        attempt += 1;
                        outcome = next;
                    } else {
                        tracing::error!(slot = %winner.slot, "could not resolve snapshot conflicts");
                        return Err(Error::RetriesExhausted);
                    }
                }
            }
        }
    }
}

/// Pick the surviving revision between two conflicting handles
///
/// The strictly newer `last_modified_ms` wins; on an exact tie, `base`
/// wins. The tie-break is a deliberate, stable policy choice.
fn pick_winner(base: SnapshotHandle, other: SnapshotHandle) -> SnapshotHandle {
    if other.last_modified_ms > base.last_modified_ms {
        other
    } else {
        base
    }
}
