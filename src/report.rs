//! Run counters and the final summary.
//!
//! A [`RunReport`] is an explicit accumulator: born at the start of a run,
//! fed one outcome per scanned document, returned to the caller, and never
//! persisted. The serialized form is the structured summary object the CLI
//! prints when a run finishes.

use serde::Serialize;

use crate::decision::{Outcome, SkipReason};

/// Per-outcome tallies for one engine run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Whether writes were suppressed.
    pub dry_run: bool,

    /// Documents visited.
    pub scanned: u64,

    /// Mapping documents created (or that would be, under dry-run).
    pub created: u64,

    /// Documents patched (or that would be, under dry-run).
    pub updated: u64,

    /// Skipped: no non-blank code.
    pub skipped_no_code: u64,

    /// Skipped: no non-blank owner reference.
    pub skipped_no_owner: u64,

    /// Skipped: owner already present.
    pub skipped_already_owned: u64,

    /// Skipped: mapping points at a different table.
    pub skipped_conflicts: u64,
}

impl RunReport {
    /// Creates an empty report for a run in the given mode.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Records the outcome of one scanned document.
    pub fn record(&mut self, outcome: &Outcome) {
        self.scanned += 1;
        match outcome {
            Outcome::Create(_) => self.created += 1,
            Outcome::Update(_) => self.updated += 1,
            Outcome::Conflict { .. } => self.skipped_conflicts += 1,
            Outcome::Skip(SkipReason::NoCode) => self.skipped_no_code += 1,
            Outcome::Skip(SkipReason::NoOwner) => self.skipped_no_owner += 1,
            Outcome::Skip(SkipReason::AlreadyOwned) => self.skipped_already_owned += 1,
        }
    }

    /// Total writes decided (created + updated), counted identically under
    /// dry-run.
    #[must_use]
    pub const fn writes(&self) -> u64 {
        self.created + self.updated
    }

    /// Counters with the dry-run flag masked out, for comparing a dry run
    /// against the live run over the same snapshot.
    #[must_use]
    pub fn counters(&self) -> Self {
        Self {
            dry_run: false,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocId, DocRef};
    use crate::patch::{Patch, WriteIntent};

    fn update_outcome() -> Outcome {
        Outcome::Update(WriteIntent::new(
            DocRef::Table(DocId::from("t1")),
            Patch::new().set("ownerId", "u1"),
        ))
    }

    #[test]
    fn test_record_counts_each_outcome_once() {
        let mut report = RunReport::new(false);
        report.record(&update_outcome());
        report.record(&Outcome::Skip(SkipReason::NoCode));
        report.record(&Outcome::Skip(SkipReason::NoOwner));
        report.record(&Outcome::Skip(SkipReason::AlreadyOwned));

        assert_eq!(report.scanned, 4);
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped_no_code, 1);
        assert_eq!(report.skipped_no_owner, 1);
        assert_eq!(report.skipped_already_owned, 1);
        assert_eq!(report.writes(), 1);
    }

    #[test]
    fn test_counters_mask_dry_run_flag() {
        let mut dry = RunReport::new(true);
        let mut live = RunReport::new(false);
        dry.record(&update_outcome());
        live.record(&update_outcome());

        assert_ne!(dry, live);
        assert_eq!(dry.counters(), live.counters());
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let report = RunReport::new(true);
        let json = serde_json::to_value(report).unwrap();
        assert!(json.get("dryRun").is_some());
        assert!(json.get("skippedNoCode").is_some());
        assert!(json.get("skippedConflicts").is_some());
    }
}
