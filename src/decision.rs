//! Per-document decision rules.
//!
//! A rule maps one scanned document (plus an optional mapping lookup) to a
//! single [`Outcome`]. Skips and conflicts are first-class outcomes, never
//! errors: only storage faults propagate as `Err`. New correctness rules
//! plug into the engine by implementing [`Rule`].

use std::fmt;

use crate::document::{DocRef, TableDoc};
use crate::mapping::CodeKey;
use crate::patch::{Patch, WriteIntent};
use crate::storage::{MappingStore, StorageError};
use crate::time::Timestamp;

const FIELD_TABLE_ID: &str = "tableId";
const FIELD_OWNER_ID: &str = "ownerId";
const FIELD_TRASHED: &str = "trashed";
const FIELD_CREATED_AT: &str = "createdAt";
const FIELD_UPDATED_AT: &str = "updatedAt";

/// Why a document produced no write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The document has no non-blank code field.
    NoCode,
    /// The document has no non-blank owner reference.
    NoOwner,
    /// The owner reference is already present; nothing to repair.
    AlreadyOwned,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCode => write!(f, "no-code"),
            Self::NoOwner => write!(f, "no-owner"),
            Self::AlreadyOwned => write!(f, "already-owned"),
        }
    }
}

/// The decision for one scanned document.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing to do; the reason is counted and reported.
    Skip(SkipReason),

    /// A new document must be created (merge write against an absent doc).
    Create(WriteIntent),

    /// An existing document gets a field-level refresh.
    Update(WriteIntent),

    /// A mapping already points at a different table. Never written;
    /// logged with both identifiers for operator resolution.
    Conflict {
        /// The contested normalized code.
        code: CodeKey,
        /// The table the stored mapping points at.
        existing: String,
        /// The table that also claims the code.
        candidate: String,
    },
}

impl Outcome {
    /// The staged write, if this outcome produces one.
    #[must_use]
    pub fn intent(&self) -> Option<&WriteIntent> {
        match self {
            Self::Create(intent) | Self::Update(intent) => Some(intent),
            Self::Skip(_) | Self::Conflict { .. } => None,
        }
    }
}

/// A pluggable per-document correctness rule.
pub trait Rule: Send + Sync {
    /// Short name used in logs and the run summary.
    fn name(&self) -> &'static str;

    /// Decides the outcome for one document.
    ///
    /// # Errors
    /// Only storage faults (the mapping lookup) surface here; every
    /// expected branch is an [`Outcome`].
    fn decide(&self, doc: &TableDoc, mappings: &dyn MappingStore)
        -> Result<Outcome, StorageError>;
}

/// Backfills `codes/{CODE}` mapping documents for tables that carry a
/// share code.
///
/// Never repoints an existing mapping: a non-blank stored target that
/// differs from the scanned table is an [`Outcome::Conflict`]. A blank
/// stored target is treated as repairable and refreshed in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackfillCodes;

impl Rule for BackfillCodes {
    fn name(&self) -> &'static str {
        "backfill-codes"
    }

    fn decide(
        &self,
        doc: &TableDoc,
        mappings: &dyn MappingStore,
    ) -> Result<Outcome, StorageError> {
        let Some(code) = doc.code.as_deref().and_then(CodeKey::normalize) else {
            return Ok(Outcome::Skip(SkipReason::NoCode));
        };

        let Some(owner) = doc.owner() else {
            return Ok(Outcome::Skip(SkipReason::NoOwner));
        };

        // The mapping mirrors the table's trashed flag; absent means false.
        let trashed = doc.trashed == Some(true);

        match mappings.get(&code)? {
            None => {
                let patch = Patch::new()
                    .set(FIELD_TABLE_ID, doc.id.as_str())
                    .set(FIELD_OWNER_ID, owner)
                    .set(FIELD_TRASHED, trashed)
                    .set(FIELD_CREATED_AT, Timestamp::Now)
                    .set(FIELD_UPDATED_AT, Timestamp::Now);
                Ok(Outcome::Create(WriteIntent::new(
                    DocRef::Mapping(code),
                    patch,
                )))
            }
            Some(existing) => {
                if let Some(target) = existing.target() {
                    if target != doc.id.as_str() {
                        return Ok(Outcome::Conflict {
                            code,
                            existing: target.to_string(),
                            candidate: doc.id.as_str().to_string(),
                        });
                    }
                }

                // Same target (or a blank one): refresh the denormalized
                // fields. createdAt is never touched on this path.
                let patch = Patch::new()
                    .set(FIELD_TABLE_ID, doc.id.as_str())
                    .set(FIELD_OWNER_ID, owner)
                    .set(FIELD_TRASHED, trashed)
                    .set(FIELD_UPDATED_AT, Timestamp::Now);
                Ok(Outcome::Update(WriteIntent::new(
                    DocRef::Mapping(code),
                    patch,
                )))
            }
        }
    }
}

/// Repairs table documents whose owner reference is missing or blank by
/// assigning an operator-supplied UID.
///
/// `trashed=false` is added only when the field is absent; an explicit
/// stored value, true or false, is never overridden.
#[derive(Debug, Clone)]
pub struct RepairOwner {
    uid: String,
}

impl RepairOwner {
    /// Creates the rule with the UID to assign.
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }

    /// The UID this rule assigns.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }
}

impl Rule for RepairOwner {
    fn name(&self) -> &'static str {
        "repair-owner"
    }

    fn decide(
        &self,
        doc: &TableDoc,
        _mappings: &dyn MappingStore,
    ) -> Result<Outcome, StorageError> {
        if doc.owner().is_some() {
            return Ok(Outcome::Skip(SkipReason::AlreadyOwned));
        }

        let mut patch = Patch::new()
            .set(FIELD_OWNER_ID, self.uid.as_str())
            .set(FIELD_UPDATED_AT, Timestamp::Now);
        if doc.trashed.is_none() {
            patch = patch.set(FIELD_TRASHED, false);
        }

        Ok(Outcome::Update(WriteIntent::new(
            DocRef::Table(doc.id.clone()),
            patch,
        )))
    }
}
