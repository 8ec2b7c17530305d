//! Local directory fetcher for offline use.

use crate::error::{DataError, Result};
use crate::fetch::Fetcher;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Serves each locator from `<root>/<last path segment>`.
///
/// `https://host/raw/universe.csv` and `universe.csv` both resolve to
/// `<root>/universe.csv`, so a directory of downloaded resources can stand in
/// for the remote ones.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    /// Create a fetcher rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path a locator resolves to.
    pub fn resolve(&self, location: &str) -> Option<PathBuf> {
        let without_query = location.split(['?', '#']).next().unwrap_or(location);
        without_query
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .filter(|segment| *segment != "." && *segment != "..")
            .map(|segment| self.root.join(segment))
    }
}

impl Fetcher for DirFetcher {
    async fn fetch_text(&self, location: &str) -> Result<String> {
        let path = self
            .resolve(location)
            .ok_or_else(|| DataError::NotFound(location.to_string()))?;

        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(DataError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(DataError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uses_last_segment() {
        let fetcher = DirFetcher::new("/data");
        assert_eq!(
            fetcher.resolve("https://host/raw/universe.csv?x=1"),
            Some(PathBuf::from("/data/universe.csv"))
        );
        assert_eq!(
            fetcher.resolve("setups.json"),
            Some(PathBuf::from("/data/setups.json"))
        );
        assert_eq!(fetcher.resolve("https://host/raw/.."), None);
    }

    #[tokio::test]
    async fn test_reads_file_and_reports_missing() {
        let root = std::env::temp_dir().join(format!("screener-dir-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("a.csv"), "Name\nAcme\n").unwrap();

        let fetcher = DirFetcher::new(&root);
        let body = fetcher.fetch_text("https://host/raw/a.csv").await.unwrap();
        assert_eq!(body, "Name\nAcme\n");

        let err = fetcher.fetch_text("missing.csv").await.unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
