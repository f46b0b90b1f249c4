//! Source-record types for the scanned collection.
//!
//! A table document is owned by the upstream store; the engine only reads
//! it and conditionally patches individual fields, never deletes or
//! replaces it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mapping::CodeKey;

/// Stable, store-assigned document identifier.
///
/// Identifiers sort lexicographically; the cursor pager relies on this
/// order being a strict total order over the collection.
///
/// # Examples
///
/// ```
/// use tablefix::DocId;
///
/// let a = DocId::from("table-001");
/// let b = DocId::from("table-002");
/// assert!(a < b);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    /// Creates a document ID from a raw string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DocId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One document from the scanned table collection.
///
/// All payload fields are optional: legacy documents may lack any of them,
/// and the decision rules treat absence explicitly (spelled out per rule)
/// rather than defaulting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDoc {
    /// Store-assigned identifier (the sort key for pagination).
    #[serde(skip)]
    pub id: DocId,

    /// Human-assigned share code, if any. Stored un-normalized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Owning user reference, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    /// Soft-delete flag. `None` means the field was never written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trashed: Option<bool>,
}

impl TableDoc {
    /// Creates a document with only an identifier; fields start absent.
    #[must_use]
    pub fn new(id: impl Into<DocId>) -> Self {
        Self {
            id: id.into(),
            code: None,
            owner_id: None,
            trashed: None,
        }
    }

    /// Returns the trimmed owner reference, or `None` when the field is
    /// absent or blank.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        match self.owner_id.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(o) => Some(o),
        }
    }
}

/// Typed write target: either a table document or a code-mapping document.
///
/// Write intents address the mapping collection by normalized code, so a
/// target is never an unchecked string path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocRef {
    /// A document in the table collection.
    Table(DocId),
    /// A document in the code-mapping collection, keyed by normalized code.
    Mapping(CodeKey),
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(id) => write!(f, "tables/{id}"),
            Self::Mapping(code) => write!(f, "codes/{code}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_ordering_is_lexicographic() {
        let mut ids = vec![DocId::from("t10"), DocId::from("t1"), DocId::from("t2")];
        ids.sort();
        assert_eq!(
            ids,
            vec![DocId::from("t1"), DocId::from("t10"), DocId::from("t2")]
        );
    }

    #[test]
    fn test_owner_blank_and_absent() {
        let mut doc = TableDoc::new("t1");
        assert_eq!(doc.owner(), None);

        doc.owner_id = Some("   ".to_string());
        assert_eq!(doc.owner(), None);

        doc.owner_id = Some(" u1 ".to_string());
        assert_eq!(doc.owner(), Some("u1"));
    }

    #[test]
    fn test_table_doc_deserialize_partial() {
        let doc: TableDoc = serde_json::from_str(r#"{"code": "ab12"}"#).unwrap();
        assert_eq!(doc.code.as_deref(), Some("ab12"));
        assert_eq!(doc.owner_id, None);
        assert_eq!(doc.trashed, None);
    }

    #[test]
    fn test_doc_ref_display() {
        let table = DocRef::Table(DocId::from("t1"));
        assert_eq!(table.to_string(), "tables/t1");
    }
}
