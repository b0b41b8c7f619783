//! snapsave-core - Core library for snapsave
//!
//! This crate contains the save-slot data model, the snapshot store
//! contract with its local implementations, and the bounded-retry
//! last-writer-wins conflict resolver shared by all snapsave interfaces.

pub mod error;
pub mod models;
pub mod resolver;
pub mod service;
pub mod store;

pub use error::{Error, Result};
pub use models::{OpenOutcome, SaveSlot, SlotName, SnapshotHandle, SnapshotMetadataChange};
pub use resolver::{ConflictResolver, MAX_RESOLVE_RETRIES};
pub use service::{LoadedSnapshot, SnapshotService};
