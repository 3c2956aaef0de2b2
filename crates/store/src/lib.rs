//! In-memory backing store for PocketLedger.
//!
//! A single [`MemoryStore`] holds all four record collections and
//! implements every store contract the engine consumes. State survives
//! process restarts through a JSON snapshot file; encryption-at-rest of
//! that file is an external concern and transparent at this layer.

pub mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::SnapshotError;
