//! JSON snapshot adapter.
//!
//! Loads a store export into an [`InMemoryStore`] and writes the mutated
//! collections back out. This is the operational backend for the CLI: runs
//! happen against an exported snapshot of the two collections, so no live
//! store client is required.
//!
//! File layout:
//!
//! ```json
//! {
//!   "tables": { "<docId>": { "code": "...", "ownerId": "...", ... } },
//!   "codes":  { "<CODE>":  { "tableId": "...", ... } }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::storage::memory::{InMemoryStore, JsonDoc};
use crate::storage::traits::StorageError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    tables: BTreeMap<String, JsonDoc>,
    #[serde(default)]
    codes: BTreeMap<String, JsonDoc>,
}

/// Loads a snapshot file into an in-memory store.
///
/// # Errors
/// Returns [`StorageError::Io`] when the file cannot be read and
/// [`StorageError::Serialization`] when it is not a valid snapshot.
pub fn load(path: &Path) -> Result<InMemoryStore, StorageError> {
    let raw = fs::read_to_string(path)?;
    let snapshot: SnapshotFile = serde_json::from_str(&raw)?;
    Ok(InMemoryStore::from_collections(
        snapshot.tables,
        snapshot.codes,
    ))
}

/// Writes the store's collections back to a snapshot file.
///
/// # Errors
/// Returns [`StorageError::Io`] when the file cannot be written.
pub fn save(store: &InMemoryStore, path: &Path) -> Result<(), StorageError> {
    let (tables, codes) = store.export()?;
    let snapshot = SnapshotFile { tables, codes };
    let rendered = serde_json::to_string_pretty(&snapshot)?;
    fs::write(path, rendered)?;
    Ok(())
}
