//! Abstract storage traits for the backfill engine.
//!
//! These traits are the seam between the engine and the document store.
//! By using traits, we enable:
//! - In-memory backends for testing and embedded use
//! - Snapshot-file backends for operating on store exports
//! - A thin adapter over a real store client in deployments

use thiserror::Error;

use crate::document::{DocId, TableDoc};
use crate::mapping::{CodeKey, CodeMapping};
use crate::patch::WriteIntent;

/// Errors that can occur during storage operations.
///
/// All of these are transient-or-fatal I/O faults in the taxonomy of the
/// engine: they abort the run at the current page boundary. Expected
/// branching (missing fields, conflicting mappings) never surfaces here.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend error.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Connection/transport failure while talking to the store.
    #[error("connection error: {0}")]
    Connection(String),

    /// A stored document could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// File I/O failure in a file-backed adapter.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Ordered, cursor-paginated reads over the table collection.
///
/// # Correctness precondition
/// Documents must come back in one global strict total order by identifier,
/// stable across fetches. If identifiers mutate (or their sort position
/// changes) while a run is in flight, documents can be missed or visited
/// twice; the engine does not detect this.
pub trait DocumentSource: Send + Sync {
    /// Fetches up to `limit` documents ordered by id, strictly after
    /// `cursor` (or from the start of the collection when `None`).
    fn fetch_after(
        &self,
        cursor: Option<&DocId>,
        limit: usize,
    ) -> Result<Vec<TableDoc>, StorageError>;
}

/// Point lookups into the code-mapping collection.
pub trait MappingStore: Send + Sync {
    /// Returns the mapping stored under a normalized code, if any.
    fn get(&self, code: &CodeKey) -> Result<Option<CodeMapping>, StorageError>;
}

/// Batched, page-atomic writes.
pub trait BatchSink: Send + Sync {
    /// Applies all staged intents as one atomic unit: either every patch
    /// in the batch lands, or none do. Server-time sentinels are resolved
    /// here, against the store's clock.
    fn commit(&self, batch: &[WriteIntent]) -> Result<(), StorageError>;
}
