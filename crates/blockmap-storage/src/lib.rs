//! blockmap-storage: entity stores for blockmap.
//!
//! Backends:
//! - [`memory`]: in-memory (dev/testing, no persistence)
//! - [`sqlite`]: SQLite via `sqlx` (feature `sqlite`, single-file persistence)

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::InMemoryEntityStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteEntityStore;
