//! Append-only per-beacon round store with pluggable backends (spec §4.2).

mod error;
mod traits;

#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use error::StoreError;
pub use traits::{ChainStore, Cursor};

#[cfg(feature = "memory")]
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
