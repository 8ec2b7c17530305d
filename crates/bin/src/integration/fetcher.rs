//! The fetcher chosen from the command line.

use crate::integration::cache_manager::open_cache;
use screener_data::{CachingFetcher, DirFetcher, FetchConfig, Fetcher, HttpFetcher, Result};
use std::path::PathBuf;

/// One of the concrete fetchers, selected at startup.
#[derive(Debug)]
pub(crate) enum SourceFetcher {
    /// Plain HTTP, no cache.
    Http(HttpFetcher),
    /// HTTP behind the on-disk response cache.
    Cached(CachingFetcher<HttpFetcher>),
    /// Files in a local directory.
    Dir(DirFetcher),
}

impl SourceFetcher {
    /// Pick a fetcher: a local directory when given, otherwise HTTP with the
    /// cache unless it is disabled.
    pub(crate) fn from_options(data_dir: Option<PathBuf>, config: FetchConfig) -> Result<Self> {
        if let Some(dir) = data_dir {
            tracing::info!(dir = %dir.display(), "Reading resources from directory");
            return Ok(Self::Dir(DirFetcher::new(dir)));
        }

        let http = HttpFetcher::new()?;
        if !config.use_cache {
            return Ok(Self::Http(http));
        }

        match open_cache() {
            Ok(cache) => Ok(Self::Cached(CachingFetcher::new(http, cache, config))),
            Err(e) => {
                tracing::warn!(error = %e, "Response cache unavailable, fetching directly");
                Ok(Self::Http(http))
            }
        }
    }
}

impl Fetcher for SourceFetcher {
    async fn fetch_text(&self, location: &str) -> Result<String> {
        match self {
            Self::Http(fetcher) => fetcher.fetch_text(location).await,
            Self::Cached(fetcher) => fetcher.fetch_text(location).await,
            Self::Dir(fetcher) => fetcher.fetch_text(location).await,
        }
    }
}
