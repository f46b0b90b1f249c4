//! # tablefix - idempotent backfill and repair for table documents
//!
//! tablefix walks a document collection in stable-ordered pages, inspects
//! each document against a correctness rule, and applies at-most-the-
//! necessary corrective writes in page-sized batches. Re-running a
//! finished or interrupted run never produces a conflicting or duplicate
//! effect: every decision is idempotent and an existing code mapping is
//! never silently repointed.
//!
//! ## Core Concepts
//!
//! - **Rule**: pure per-document decision logic; ships with
//!   [`BackfillCodes`] and [`RepairOwner`], and new rules plug in via the
//!   same trait
//! - **Outcome**: skip / create / update / conflict — expected branching
//!   as data, never as errors
//! - **Pager**: lazy cursor-paginated scan in strict identifier order
//! - **Engine**: sequential orchestrator with page-level commit atomicity
//!   and a dry-run mode that counts identically while persisting nothing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tablefix::{BackfillCodes, Engine, InMemoryStore};
//!
//! let store = Arc::new(InMemoryStore::new());
//! let engine = Engine::new(store.clone(), store.clone(), store.clone());
//! let report = engine.run(&BackfillCodes)?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod cursor;
pub mod decision;
pub mod document;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod patch;
pub mod report;
pub mod storage;
pub mod time;

// Re-export primary types at crate root for convenience
pub use config::{Config, ConfigError, Mode};
pub use cursor::{Cursor, Page, Pager};
pub use decision::{BackfillCodes, Outcome, RepairOwner, Rule, SkipReason};
pub use document::{DocId, DocRef, TableDoc};
pub use engine::{Engine, EngineConfig, DEFAULT_PAGE_SIZE};
pub use error::{FixError, FixResult};
pub use mapping::{CodeKey, CodeMapping};
pub use patch::{FieldValue, Patch, WriteIntent};
pub use report::RunReport;
pub use storage::{BatchSink, DocumentSource, InMemoryStore, MappingStore, StorageError};
pub use time::Timestamp;
