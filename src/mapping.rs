//! Code-mapping records.
//!
//! A mapping document resolves a normalized share code to the table it
//! opens. At most one mapping exists per normalized code, and once created
//! its target is immutable except by operator intervention — the engine
//! never silently repoints it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::DocId;
use crate::time::Timestamp;

/// A normalized share code: trimmed, ASCII-uppercased, never blank.
///
/// Normalization happens exactly once, at construction; everything
/// downstream (lookups, write targets, conflict reports) carries the
/// normalized form.
///
/// # Examples
///
/// ```
/// use tablefix::CodeKey;
///
/// assert_eq!(CodeKey::normalize(" ab12 ").unwrap().as_str(), "AB12");
/// assert!(CodeKey::normalize("   ").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeKey(String);

impl CodeKey {
    /// Normalizes a raw code field. Returns `None` when the input is blank.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_ascii_uppercase()))
    }

    /// Returns the normalized code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted layout of a code-mapping document.
///
/// `owner_id` and `trashed` are denormalized copies of the target table's
/// fields, refreshed on every update pass. `created_at` is written once at
/// creation and never touched again. Every field carries a serde default:
/// legacy mapping documents may lack any of them, and a partial document
/// must still decode so the engine can repair it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeMapping {
    /// Identifier of the table this code opens.
    pub table_id: DocId,

    /// Denormalized owner of the target table.
    pub owner_id: String,

    /// Denormalized soft-delete flag of the target table.
    pub trashed: bool,

    /// Set by the store when the mapping is first created.
    pub created_at: Option<Timestamp>,

    /// Refreshed by the store on every write to the mapping.
    pub updated_at: Option<Timestamp>,
}

impl CodeMapping {
    /// Returns the trimmed target identifier, or `None` when the stored
    /// field is blank. A blank target is treated as repairable rather than
    /// conflicting.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        let t = self.table_id.as_str().trim();
        if t.is_empty() {
            None
        } else {
            Some(t)
        }
    }
}
