//! In-memory storage backend.
//!
//! Thread-safe in-memory implementation of the storage traits, holding both
//! collections as ordered maps of JSON documents — the same shape the real
//! store exposes. Intended for tests, embedded use, and as the reference
//! implementation; the snapshot adapter loads store exports into it.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::document::{DocId, DocRef, TableDoc};
use crate::mapping::{CodeKey, CodeMapping};
use crate::patch::WriteIntent;
use crate::storage::traits::{BatchSink, DocumentSource, MappingStore, StorageError};

/// A stored document: field name → JSON value.
pub type JsonDoc = serde_json::Map<String, Value>;

fn lock_err(context: &'static str) -> StorageError {
    StorageError::Backend(format!("poisoned lock: {context}"))
}

/// In-memory store over both collections.
///
/// Documents are keyed by their identifier (tables) or normalized code
/// (mappings); `BTreeMap` keeps each collection in the strict identifier
/// order the pager depends on. An optional fixed clock pins server-time
/// resolution for deterministic tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<BTreeMap<String, JsonDoc>>,
    codes: RwLock<BTreeMap<String, JsonDoc>>,
    fixed_now: RwLock<Option<DateTime<Utc>>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from raw collections (e.g. a parsed snapshot file).
    #[must_use]
    pub fn from_collections(
        tables: BTreeMap<String, JsonDoc>,
        codes: BTreeMap<String, JsonDoc>,
    ) -> Self {
        Self {
            tables: RwLock::new(tables),
            codes: RwLock::new(codes),
            fixed_now: RwLock::new(None),
        }
    }

    /// Pins the store clock so server timestamps resolve to a known
    /// instant. Pass `None` to return to the system clock.
    pub fn set_fixed_now(&self, now: Option<DateTime<Utc>>) -> Result<(), StorageError> {
        *self
            .fixed_now
            .write()
            .map_err(|_| lock_err("fixed_now.write"))? = now;
        Ok(())
    }

    fn store_now(&self) -> Result<DateTime<Utc>, StorageError> {
        let fixed = self
            .fixed_now
            .read()
            .map_err(|_| lock_err("fixed_now.read"))?;
        Ok(fixed.unwrap_or_else(Utc::now))
    }

    /// Inserts or replaces a table document.
    pub fn insert_table(&self, doc: &TableDoc) -> Result<(), StorageError> {
        let Value::Object(fields) = serde_json::to_value(doc)? else {
            return Err(StorageError::Serialization(
                "table document did not serialize to an object".to_string(),
            ));
        };
        self.tables
            .write()
            .map_err(|_| lock_err("tables.write"))?
            .insert(doc.id.as_str().to_string(), fields);
        Ok(())
    }

    /// Inserts or replaces a mapping document.
    pub fn insert_mapping(&self, code: &CodeKey, mapping: &CodeMapping) -> Result<(), StorageError> {
        let Value::Object(fields) = serde_json::to_value(mapping)? else {
            return Err(StorageError::Serialization(
                "mapping document did not serialize to an object".to_string(),
            ));
        };
        self.codes
            .write()
            .map_err(|_| lock_err("codes.write"))?
            .insert(code.as_str().to_string(), fields);
        Ok(())
    }

    /// Reads one table document back, if present.
    pub fn table(&self, id: &DocId) -> Result<Option<TableDoc>, StorageError> {
        let tables = self.tables.read().map_err(|_| lock_err("tables.read"))?;
        let Some(fields) = tables.get(id.as_str()) else {
            return Ok(None);
        };
        let mut doc: TableDoc = serde_json::from_value(Value::Object(fields.clone()))?;
        doc.id = id.clone();
        Ok(Some(doc))
    }

    /// Number of table documents.
    pub fn table_count(&self) -> Result<usize, StorageError> {
        Ok(self.tables.read().map_err(|_| lock_err("tables.read"))?.len())
    }

    /// Number of mapping documents.
    pub fn mapping_count(&self) -> Result<usize, StorageError> {
        Ok(self.codes.read().map_err(|_| lock_err("codes.read"))?.len())
    }

    /// Clones out both collections (e.g. for writing a snapshot file).
    pub fn export(
        &self,
    ) -> Result<(BTreeMap<String, JsonDoc>, BTreeMap<String, JsonDoc>), StorageError> {
        let tables = self.tables.read().map_err(|_| lock_err("tables.read"))?;
        let codes = self.codes.read().map_err(|_| lock_err("codes.read"))?;
        Ok((tables.clone(), codes.clone()))
    }
}

impl DocumentSource for InMemoryStore {
    fn fetch_after(
        &self,
        cursor: Option<&DocId>,
        limit: usize,
    ) -> Result<Vec<TableDoc>, StorageError> {
        let tables = self.tables.read().map_err(|_| lock_err("tables.read"))?;
        let lower = match cursor {
            Some(id) => Bound::Excluded(id.as_str().to_string()),
            None => Bound::Unbounded,
        };

        let mut out = Vec::new();
        for (id, fields) in tables.range((lower, Bound::Unbounded)).take(limit) {
            let mut doc: TableDoc = serde_json::from_value(Value::Object(fields.clone()))?;
            doc.id = DocId::from(id.as_str());
            out.push(doc);
        }
        Ok(out)
    }
}

impl MappingStore for InMemoryStore {
    fn get(&self, code: &CodeKey) -> Result<Option<CodeMapping>, StorageError> {
        let codes = self.codes.read().map_err(|_| lock_err("codes.read"))?;
        let Some(fields) = codes.get(code.as_str()) else {
            return Ok(None);
        };
        let mapping: CodeMapping = serde_json::from_value(Value::Object(fields.clone()))?;
        Ok(Some(mapping))
    }
}

impl BatchSink for InMemoryStore {
    fn commit(&self, batch: &[WriteIntent]) -> Result<(), StorageError> {
        // One clock reading per batch, mirroring a single server-side
        // commit time for the whole page.
        let now = self.store_now()?;

        let mut tables = self.tables.write().map_err(|_| lock_err("tables.write"))?;
        let mut codes = self.codes.write().map_err(|_| lock_err("codes.write"))?;

        // Both maps stay locked for the whole loop and every merge below is
        // infallible, so the batch lands as a unit.
        for intent in batch {
            let resolved = intent.patch.to_resolved_json(now);
            let doc = match &intent.target {
                DocRef::Table(id) => tables.entry(id.as_str().to_string()).or_default(),
                DocRef::Mapping(code) => codes.entry(code.as_str().to_string()).or_default(),
            };
            for (field, value) in resolved {
                doc.insert(field, value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::Patch;
    use crate::time::Timestamp;
    use chrono::TimeZone;

    fn doc(id: &str, code: Option<&str>, owner: Option<&str>) -> TableDoc {
        let mut d = TableDoc::new(id);
        d.code = code.map(str::to_string);
        d.owner_id = owner.map(str::to_string);
        d
    }

    #[test]
    fn test_fetch_after_pages_in_id_order() {
        let store = InMemoryStore::new();
        for id in ["c", "a", "b", "d"] {
            store.insert_table(&doc(id, None, None)).unwrap();
        }

        let first = store.fetch_after(None, 3).unwrap();
        let ids: Vec<&str> = first.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let cursor = first.last().map(|d| d.id.clone()).unwrap();
        let second = store.fetch_after(Some(&cursor), 3).unwrap();
        let ids: Vec<&str> = second.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d"]);

        let cursor = second.last().map(|d| d.id.clone()).unwrap();
        assert!(store.fetch_after(Some(&cursor), 3).unwrap().is_empty());
    }

    #[test]
    fn test_commit_merges_without_touching_other_fields() {
        let store = InMemoryStore::new();
        store
            .insert_table(&doc("t1", Some("ab12"), Some("u1")))
            .unwrap();

        let intent = WriteIntent::new(
            DocRef::Table(DocId::from("t1")),
            Patch::new().set("ownerId", "u2"),
        );
        store.commit(&[intent]).unwrap();

        let after = store.table(&DocId::from("t1")).unwrap().unwrap();
        assert_eq!(after.owner_id.as_deref(), Some("u2"));
        // Merge semantics: the untouched code survives.
        assert_eq!(after.code.as_deref(), Some("ab12"));
    }

    #[test]
    fn test_commit_resolves_server_time_with_fixed_clock() {
        let store = InMemoryStore::new();
        let pinned = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        store.set_fixed_now(Some(pinned)).unwrap();

        let code = CodeKey::normalize("ab12").unwrap();
        let intent = WriteIntent::new(
            DocRef::Mapping(code.clone()),
            Patch::new()
                .set("tableId", "t1")
                .set("createdAt", Timestamp::Now)
                .set("updatedAt", Timestamp::Now),
        );
        store.commit(&[intent]).unwrap();

        let mapping = store.get(&code).unwrap().unwrap();
        assert_eq!(mapping.created_at, Some(Timestamp::Fixed(pinned)));
        assert_eq!(mapping.updated_at, Some(Timestamp::Fixed(pinned)));
    }

    #[test]
    fn test_mapping_lookup_missing() {
        let store = InMemoryStore::new();
        let code = CodeKey::normalize("zz99").unwrap();
        assert!(store.get(&code).unwrap().is_none());
    }
}
