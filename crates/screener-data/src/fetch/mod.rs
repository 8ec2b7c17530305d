//! Retrieval of raw resources.
//!
//! A [`Fetcher`] turns a resource locator into its text body, or fails. It
//! makes exactly one attempt; retry and caching policy belong to the caller
//! (see [`CachingFetcher`]).

pub mod caching;
pub mod dir;
pub mod http;
pub mod memory;

pub use caching::CachingFetcher;
pub use dir::DirFetcher;
pub use http::HttpFetcher;
pub use memory::MemoryFetcher;

use crate::error::Result;
use std::future::Future;

/// Source of raw resource bodies.
pub trait Fetcher: Send + Sync {
    /// Fetch the body at `location` as UTF-8 text.
    ///
    /// # Errors
    /// Returns a fetch-kind [`DataError`](crate::DataError) when the resource
    /// cannot be retrieved or the server answers with a non-success status.
    fn fetch_text(&self, location: &str) -> impl Future<Output = Result<String>> + Send;
}
