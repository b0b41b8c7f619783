//! Shared helpers for CLI commands

use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use snapsave_core::store::FileStore;
use snapsave_core::SnapshotService;

use crate::error::CliError;

/// Open the directory-backed store at the data dir
pub fn open_store(data_dir: &Path) -> Result<FileStore, CliError> {
    FileStore::new(data_dir).map_err(CliError::Core)
}

/// Build a snapshot service over the local store
pub fn open_service(data_dir: &Path) -> Result<SnapshotService, CliError> {
    let store = open_store(data_dir)?;
    Ok(SnapshotService::new(Arc::new(store)))
}

/// Render a Unix-ms timestamp for listings
pub fn format_timestamp(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms).map_or_else(
        || ms.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Read save bytes from a file, or stdin when no path is given
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>, CliError> {
    match path {
        Some(path) => Ok(std::fs::read(path)?),
        None => {
            let mut bytes = Vec::new();
            io::stdin().read_to_end(&mut bytes)?;
            Ok(bytes)
        }
    }
}

/// Write save bytes to a file, or stdout when no path is given
pub fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(path, bytes)?,
        None => io::stdout().write_all(bytes)?,
    }
    Ok(())
}
