//! The run orchestrator.
//!
//! Drives one rule over the whole collection: fetch a page, decide every
//! document, stage the resulting writes, commit them as one unit, advance
//! the cursor. Strictly sequential — no overlapping fetches, lookups, or
//! commits — so cursor advancement and conflict detection never race the
//! engine's own writes.
//!
//! A storage fault aborts at the current page boundary. Pages committed
//! before it stay committed; because every decision is idempotent
//! (re-applying a create/update to an already-correct document is an
//! effective no-op), re-running from the start converges.

use std::sync::Arc;

use crate::cursor::Pager;
use crate::decision::{Outcome, Rule};
use crate::error::FixResult;
use crate::patch::WriteIntent;
use crate::report::RunReport;
use crate::storage::{BatchSink, DocumentSource, MappingStore};

/// Page size of the original backfill scripts.
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Knobs for one run.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Documents per fetched page.
    pub page_size: usize,
    /// Compute and count all outcomes, but discard staged writes.
    pub dry_run: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            dry_run: false,
        }
    }
}

/// The backfill/repair engine.
#[derive(Clone)]
pub struct Engine {
    source: Arc<dyn DocumentSource>,
    mappings: Arc<dyn MappingStore>,
    sink: Arc<dyn BatchSink>,
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine with default configuration.
    #[must_use]
    pub fn new(
        source: Arc<dyn DocumentSource>,
        mappings: Arc<dyn MappingStore>,
        sink: Arc<dyn BatchSink>,
    ) -> Self {
        Self::with_config(source, mappings, sink, EngineConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    #[must_use]
    pub fn with_config(
        source: Arc<dyn DocumentSource>,
        mappings: Arc<dyn MappingStore>,
        sink: Arc<dyn BatchSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            source,
            mappings,
            sink,
            config,
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs one rule over the whole collection and returns the tallies.
    ///
    /// # Errors
    /// Propagates storage faults from page fetch, mapping lookup, or batch
    /// commit. The run stops at that page boundary; nothing from the
    /// failed page is applied.
    pub fn run(&self, rule: &dyn Rule) -> FixResult<RunReport> {
        let mut report = RunReport::new(self.config.dry_run);

        tracing::info!(
            rule = rule.name(),
            dry_run = self.config.dry_run,
            page_size = self.config.page_size,
            "starting scan"
        );

        let mut pager = Pager::new(self.source.as_ref(), self.config.page_size);
        while let Some(page) = pager.next_page()? {
            let mut batch: Vec<WriteIntent> = Vec::new();

            for doc in &page.docs {
                let outcome = rule.decide(doc, self.mappings.as_ref())?;

                if let Outcome::Conflict {
                    code,
                    existing,
                    candidate,
                } = &outcome
                {
                    tracing::warn!(
                        code = %code,
                        existing = %existing,
                        candidate = %candidate,
                        "conflict: code already points at another table, skipping"
                    );
                }

                if let Some(intent) = outcome.intent() {
                    batch.push(intent.clone());
                }
                report.record(&outcome);
            }

            if !batch.is_empty() {
                if self.config.dry_run {
                    tracing::info!(
                        writes = batch.len(),
                        scanned = report.scanned,
                        "dry-run: discarding staged batch"
                    );
                } else {
                    self.sink.commit(&batch)?;
                    tracing::info!(
                        writes = batch.len(),
                        scanned = report.scanned,
                        "committed batch"
                    );
                }
            }

            if page.is_last {
                break;
            }
        }

        tracing::info!(
            scanned = report.scanned,
            created = report.created,
            updated = report.updated,
            conflicts = report.skipped_conflicts,
            "scan complete"
        );
        Ok(report)
    }
}
