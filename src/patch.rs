//! Pending write payloads.
//!
//! A decision produces at most one [`WriteIntent`]: a target document plus
//! a field-level [`Patch`]. Patches always merge — they set exactly the
//! named fields and leave everything else on the target untouched, so a
//! full-document replace cannot be expressed here at all.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::document::DocRef;
use crate::time::Timestamp;

/// A single field value inside a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A string field.
    Str(String),
    /// A boolean field.
    Bool(bool),
    /// A timestamp field, possibly the unresolved server-time sentinel.
    Time(Timestamp),
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(t: Timestamp) -> Self {
        Self::Time(t)
    }
}

/// An ordered field → value map with merge-only semantics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Patch {
    fields: BTreeMap<String, FieldValue>,
}

impl Patch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any earlier value for the same name.
    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Returns the value staged for a field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Returns true when no fields are staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of staged fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates over staged fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Renders the patch as a JSON object, resolving every server-time
    /// sentinel against the given store clock reading. Sink adapters call
    /// this at commit so the sentinel never reaches storage.
    #[must_use]
    pub fn to_resolved_json(&self, store_now: DateTime<Utc>) -> serde_json::Map<String, serde_json::Value> {
        let mut out = serde_json::Map::new();
        for (field, value) in &self.fields {
            let json = match value {
                FieldValue::Str(s) => serde_json::Value::String(s.clone()),
                FieldValue::Bool(b) => serde_json::Value::Bool(*b),
                FieldValue::Time(t) => serde_json::Value::String(
                    t.resolve(store_now)
                        .to_rfc3339_opts(SecondsFormat::Micros, true),
                ),
            };
            out.insert(field.clone(), json);
        }
        out
    }
}

/// One staged write: a target document and the fields to merge into it.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteIntent {
    /// The document the patch applies to.
    pub target: DocRef,
    /// The fields to merge.
    pub patch: Patch,
}

impl WriteIntent {
    /// Creates a write intent for the given target.
    #[must_use]
    pub fn new(target: DocRef, patch: Patch) -> Self {
        Self { target, patch }
    }
}
