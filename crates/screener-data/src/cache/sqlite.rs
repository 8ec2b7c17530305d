//! SQLite caching layer for fetched resource bodies.

use crate::error::{DataError, Result};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// SQLite cache for fetched resource bodies, keyed by locator.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Connection,
}

/// A cached resource body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// Locator the body was fetched from.
    pub location: String,
    /// Body text.
    pub body: String,
    /// When the body was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl CachedResponse {
    /// Whether the body is younger than `max_age` at `now`.
    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.fetched_at) < max_age
    }
}

impl SqliteCache {
    /// Create a new SQLite cache.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS responses (
                location TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                fetched_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Get the cached body for a locator, whatever its age.
    pub fn get(&self, location: &str) -> Result<Option<CachedResponse>> {
        let row = self
            .conn
            .query_row(
                "SELECT body, fetched_at FROM responses WHERE location = ?1",
                params![location],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        row.map(|(body, fetched_at)| {
            let fetched_at = DateTime::parse_from_rfc3339(&fetched_at)
                .map_err(|e| DataError::Cache(format!("Invalid timestamp {fetched_at}: {e}")))?
                .with_timezone(&Utc);
            Ok(CachedResponse {
                location: location.to_string(),
                body,
                fetched_at,
            })
        })
        .transpose()
    }

    /// Get the cached body for a locator if it is younger than `max_age`.
    pub fn get_fresh(&self, location: &str, max_age: Duration) -> Result<Option<CachedResponse>> {
        let now = Utc::now();
        Ok(self
            .get(location)?
            .filter(|cached| cached.is_fresh(max_age, now)))
    }

    /// Store a body fetched now.
    pub fn put(&self, location: &str, body: &str) -> Result<()> {
        self.put_at(location, body, Utc::now())
    }

    /// Store a body with an explicit fetch time.
    pub fn put_at(&self, location: &str, body: &str, fetched_at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO responses (location, body, fetched_at) VALUES (?1, ?2, ?3)",
            params![location, body, fetched_at.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Remove the cached body for a locator.
    pub fn remove(&self, location: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM responses WHERE location = ?1", params![location])?;
        Ok(())
    }

    /// Clear all cached data.
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM responses", [])?;
        Ok(())
    }

    /// Get cache statistics.
    pub fn get_stats(&self) -> Result<CacheStats> {
        let (entries, total_bytes, oldest): (i64, i64, Option<String>) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(LENGTH(CAST(body AS BLOB))), 0), MIN(fetched_at) FROM responses",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let oldest = oldest
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc));

        Ok(CacheStats {
            entries: entries as usize,
            total_bytes: total_bytes as usize,
            oldest,
        })
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cached resources
    pub entries: usize,
    /// Total size of cached bodies in bytes
    pub total_bytes: usize,
    /// Fetch time of the oldest cached body
    pub oldest: Option<DateTime<Utc>>,
}
