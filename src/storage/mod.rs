//! Storage backends and the traits they implement.
//!
//! The engine only ever sees the traits; backends are swappable. The
//! in-memory backend doubles as the loaded form of a snapshot file.

mod memory;
pub mod snapshot;
mod traits;

pub use memory::{InMemoryStore, JsonDoc};
pub use traits::{BatchSink, DocumentSource, MappingStore, StorageError};
