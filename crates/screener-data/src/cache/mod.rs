//! Caching layer for fetched resources.

pub mod sqlite;

pub use sqlite::{CacheStats, CachedResponse, SqliteCache};
