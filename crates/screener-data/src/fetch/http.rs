//! HTTP fetcher.

use crate::error::{DataError, Result};
use crate::fetch::Fetcher;
use std::time::Duration;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with every request.
const USER_AGENT: &str = concat!("screener/", env!("CARGO_PKG_VERSION"));

/// Fetches resources over HTTP(S) with a single attempt per call.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default 30 second timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a fetcher with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, location: &str) -> Result<String> {
        tracing::debug!(%location, "GET");
        let response = self.client.get(location).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_failure() {
        let fetcher = HttpFetcher::with_timeout(Duration::from_secs(2)).unwrap();
        let err = fetcher
            .fetch_text("http://127.0.0.1:9/universe.csv")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
    }
}
