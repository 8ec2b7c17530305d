//! Fetcher decorator backed by the SQLite response cache.

use crate::cache::SqliteCache;
use crate::config::FetchConfig;
use crate::error::Result;
use crate::fetch::Fetcher;
use std::sync::Mutex;

/// Serves fresh cached bodies and stores every successful fetch.
///
/// Cache failures are logged and otherwise ignored: the wrapped fetcher's
/// result is always what decides success.
#[derive(Debug)]
pub struct CachingFetcher<F> {
    inner: F,
    cache: Mutex<SqliteCache>,
    config: FetchConfig,
}

impl<F: Fetcher> CachingFetcher<F> {
    /// Wrap `inner` with `cache`.
    pub const fn new(inner: F, cache: SqliteCache, config: FetchConfig) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
            config,
        }
    }

    /// The wrapped fetcher.
    pub const fn inner(&self) -> &F {
        &self.inner
    }

    fn lookup(&self, location: &str) -> Option<String> {
        if !self.config.use_cache || self.config.force_refresh {
            return None;
        }
        let cache = self.cache.lock().ok()?;
        match cache.get_fresh(location, self.config.max_age) {
            Ok(hit) => hit.map(|cached| cached.body),
            Err(e) => {
                tracing::warn!(%location, error = %e, "Cache read failed");
                None
            }
        }
    }

    fn store(&self, location: &str, body: &str) {
        if !self.config.use_cache {
            return;
        }
        let Ok(cache) = self.cache.lock() else {
            tracing::warn!(%location, "Cache lock poisoned, not storing");
            return;
        };
        if let Err(e) = cache.put(location, body) {
            tracing::warn!(%location, error = %e, "Cache write failed");
        }
    }
}

impl<F: Fetcher> Fetcher for CachingFetcher<F> {
    async fn fetch_text(&self, location: &str) -> Result<String> {
        if let Some(body) = self.lookup(location) {
            tracing::debug!(%location, "Serving from cache");
            return Ok(body);
        }

        let body = self.inner.fetch_text(location).await?;
        self.store(location, &body);
        Ok(body)
    }
}
