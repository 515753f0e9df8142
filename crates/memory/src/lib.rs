//! Session persistence and history compaction for Stepwright.
//!
//! The compactor reduces a raw run log into a small, persistable form; the
//! session stores keep that form across runs; `SessionPersistence` wires the
//! two together as the stock run finalizer.

pub mod compactor;
pub mod file_store;
pub mod in_memory;
pub mod persistence;

pub use compactor::{compact, CompactionPolicy, ELISION_MARKER, FAILED_REQUEST_PLACEHOLDER};
pub use file_store::FileSessionStore;
pub use in_memory::InMemorySessionStore;
pub use persistence::SessionPersistence;
