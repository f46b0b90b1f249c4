//! Error types for tablefix.
//!
//! Expected per-document branching (skips, conflicts) never appears here;
//! those are [`crate::decision::Outcome`] values. Errors are reserved for
//! configuration faults, which abort before any scan, and storage faults,
//! which abort the run at the current page boundary.

use thiserror::Error;

use crate::config::ConfigError;
use crate::storage::StorageError;

/// Top-level error type for engine runs and the CLI around them.
#[derive(Debug, Error)]
pub enum FixError {
    /// Fatal configuration fault; nothing was scanned or mutated.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Transient or fatal I/O fault; committed pages before it remain
    /// applied, and a re-run converges thanks to idempotent decisions.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl FixError {
    /// Returns true when re-running the engine is the expected recovery
    /// path (as opposed to fixing the invocation first).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Config(_) => false,
            Self::Storage(_) => true,
        }
    }
}

/// Result type alias for tablefix operations.
pub type FixResult<T> = Result<T, FixError>;
