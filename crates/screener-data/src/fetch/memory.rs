//! In-memory fetcher.

use crate::error::{DataError, Result};
use crate::fetch::Fetcher;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Canned {
    Body(String),
    Status(u16),
}

/// Serves canned bodies or status codes keyed by exact locator.
///
/// Unknown locators fail with [`DataError::NotFound`]. Every call is counted,
/// which makes it easy to check how often a resource was actually requested.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: HashMap<String, Canned>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MemoryFetcher {
    /// Create an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `location`.
    pub fn with_body(mut self, location: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses
            .insert(location.into(), Canned::Body(body.into()));
        self
    }

    /// Answer `location` with a non-success HTTP status.
    pub fn with_status(mut self, location: impl Into<String>, status: u16) -> Self {
        self.responses
            .insert(location.into(), Canned::Status(status));
        self
    }

    /// Number of times `location` was requested.
    pub fn calls(&self, location: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(location).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl Fetcher for MemoryFetcher {
    async fn fetch_text(&self, location: &str) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(location.to_string()).or_insert(0) += 1;
        }

        match self.responses.get(location) {
            Some(Canned::Body(body)) => Ok(body.clone()),
            Some(Canned::Status(status)) => Err(DataError::HttpStatus {
                location: location.to_string(),
                status: *status,
            }),
            None => Err(DataError::NotFound(location.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_responses() {
        let fetcher = MemoryFetcher::new()
            .with_body("a", "body")
            .with_status("b", 500);

        assert_eq!(fetcher.fetch_text("a").await.unwrap(), "body");
        assert!(matches!(
            fetcher.fetch_text("b").await,
            Err(DataError::HttpStatus { status: 500, .. })
        ));
        assert!(matches!(
            fetcher.fetch_text("c").await,
            Err(DataError::NotFound(_))
        ));
        assert_eq!(fetcher.calls("a"), 1);
        assert_eq!(fetcher.calls("c"), 1);
        assert_eq!(fetcher.calls("d"), 0);
    }
}
