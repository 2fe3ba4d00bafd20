//! Simplification cache stores for FocusFlow.
//!
//! Provides a durable SQLite store and a process-local LRU store, both
//! implementing [`focusflow_protocols::CacheStore`].

mod memory;
mod schema;
mod sqlite;

pub use memory::MemoryCacheStore;
pub use sqlite::SqliteCacheStore;
