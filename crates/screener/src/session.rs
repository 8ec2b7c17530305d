//! The session-scoped cache.
//!
//! A [`Session`] loads the catalog and the universe once and keeps them
//! immutable for its lifetime. Successful setup results are memoized unless
//! [`SessionConfig::memoize_setup_results`] is off. Refreshing builds a new
//! session rather than mutating this one.

use crate::filter::{FilteredView, apply_filters};
use crate::setups::{SetupMemo, SetupResolution, resolve_setups};
use screener_data::{
    Catalog, DataError, Fetcher, FilterSelection, SourceConfig, Universe, load_catalog,
    load_universe,
};
use thiserror::Error;

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that stop a session from opening.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The universe could not be fetched, parsed or normalized.
    #[error("Universe unavailable: {0}")]
    UniverseUnavailable(#[source] DataError),
}

/// Session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Resource locations.
    pub sources: SourceConfig,
    /// Keep successful setup results for the lifetime of the session.
    pub memoize_setup_results: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sources: SourceConfig::default(),
            memoize_setup_results: true,
        }
    }
}

impl SessionConfig {
    /// Settings with the given sources and memoization on.
    pub fn new(sources: SourceConfig) -> Self {
        Self {
            sources,
            ..Self::default()
        }
    }
}

/// A loaded catalog and universe plus the memo of setup results.
#[derive(Debug)]
pub struct Session<F> {
    fetcher: F,
    config: SessionConfig,
    catalog: Catalog,
    universe: Universe,
    memo: Option<SetupMemo>,
}

impl<F: Fetcher> Session<F> {
    /// Load the catalog and the universe.
    ///
    /// The catalog falls back to the built-in one on any failure; the
    /// universe has no fallback.
    ///
    /// # Errors
    /// Returns [`SessionError::UniverseUnavailable`] when the universe cannot
    /// be loaded or no security survives normalization.
    pub async fn open(fetcher: F, config: SessionConfig) -> Result<Self> {
        let (catalog, universe) = futures::join!(
            load_catalog(&fetcher, &config.sources.catalog_url),
            load_universe(&fetcher, &config.sources.universe_url),
        );

        let universe = universe.map_err(SessionError::UniverseUnavailable)?;
        if universe.is_empty() {
            return Err(SessionError::UniverseUnavailable(DataError::EmptyUniverse));
        }

        let memo = config.memoize_setup_results.then(SetupMemo::new);

        tracing::info!(
            setups = catalog.len(),
            origin = ?catalog.origin(),
            securities = universe.len(),
            "Session opened"
        );

        Ok(Self {
            fetcher,
            config,
            catalog,
            universe,
            memo,
        })
    }

    /// Discard everything loaded and open a fresh session.
    ///
    /// # Errors
    /// Same as [`Session::open`].
    pub async fn refresh(self) -> Result<Self> {
        tracing::info!("Refreshing session");
        Self::open(self.fetcher, self.config).await
    }

    /// The setup catalog in use.
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The security universe.
    pub const fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Session settings.
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The underlying fetcher.
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Number of memoized setup results.
    pub fn memoized(&self) -> usize {
        self.memo.as_ref().map_or(0, SetupMemo::len)
    }

    /// Resolve selected setup names against the catalog.
    pub async fn resolve(&self, selected: &[String]) -> SetupResolution {
        resolve_setups(
            &self.fetcher,
            &self.config.sources,
            &self.catalog,
            selected,
            self.memo.as_ref(),
        )
        .await
    }

    /// Resolve the selection's setups and apply every filter.
    pub async fn screen(&self, selection: &FilterSelection) -> FilteredView<'_> {
        let resolution = self.resolve(&selection.setups).await;
        apply_filters(&self.universe, &resolution, selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_data::{CatalogOrigin, MemoryFetcher};

    const UNIVERSE: &str = "\
Market;Name;Symbol;PEA;Sector;value
Paris;Acme;ACM;True;Technology;X
Xetra;Beta;BTA;False;Energy;
";

    const CATALOG: &str =
        r#"{"setups":{"s1":{"name":"MomUp","output_file":"mom_up.csv","description":"Up"}}}"#;

    fn config() -> SessionConfig {
        SessionConfig::new(SourceConfig {
            catalog_url: "mem://catalog.json".to_string(),
            universe_url: "mem://universe.csv".to_string(),
            results_base_url: "mem://".to_string(),
        })
    }

    #[tokio::test]
    async fn test_open_loads_catalog_and_universe() {
        let fetcher = MemoryFetcher::new()
            .with_body("mem://catalog.json", CATALOG)
            .with_body("mem://universe.csv", UNIVERSE);

        let session = Session::open(fetcher, config()).await.unwrap();
        assert_eq!(session.catalog().origin(), CatalogOrigin::Remote);
        assert_eq!(session.universe().len(), 2);
    }

    #[tokio::test]
    async fn test_catalog_falls_back_but_universe_does_not() {
        let fetcher = MemoryFetcher::new().with_body("mem://universe.csv", UNIVERSE);
        let session = Session::open(fetcher, config()).await.unwrap();
        assert_eq!(session.catalog().origin(), CatalogOrigin::Fallback);

        let fetcher = MemoryFetcher::new().with_body("mem://catalog.json", CATALOG);
        let err = Session::open(fetcher, config()).await.unwrap_err();
        assert!(matches!(err, SessionError::UniverseUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_universe_is_refused() {
        let fetcher = MemoryFetcher::new()
            .with_body("mem://catalog.json", CATALOG)
            .with_body("mem://universe.csv", "Market;Name;Symbol\n;Ghost;GST\n");

        let err = Session::open(fetcher, config()).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::UniverseUnavailable(DataError::EmptyUniverse)
        ));
    }

    #[tokio::test]
    async fn test_screen_memoizes_setup_results() {
        let fetcher = MemoryFetcher::new()
            .with_body("mem://catalog.json", CATALOG)
            .with_body("mem://universe.csv", UNIVERSE)
            .with_body("mem://mom_up.csv", "Name\nBeta\n");
        let session = Session::open(fetcher, config()).await.unwrap();
        let selection = FilterSelection::new().with_setup("MomUp");

        for _ in 0..2 {
            let view = session.screen(&selection).await;
            let names: Vec<&str> = view.iter().map(|s| s.name.as_str()).collect();
            assert_eq!(names, vec!["Beta"]);
        }
        assert_eq!(session.fetcher().calls("mem://mom_up.csv"), 1);
        assert_eq!(session.memoized(), 1);
    }

    #[tokio::test]
    async fn test_refresh_reloads_everything() {
        let fetcher = MemoryFetcher::new()
            .with_body("mem://catalog.json", CATALOG)
            .with_body("mem://universe.csv", UNIVERSE)
            .with_body("mem://mom_up.csv", "Name\nBeta\n");
        let session = Session::open(fetcher, config()).await.unwrap();
        session
            .screen(&FilterSelection::new().with_setup("MomUp"))
            .await;

        let session = session.refresh().await.unwrap();
        assert_eq!(session.memoized(), 0);
        assert_eq!(session.fetcher().calls("mem://universe.csv"), 2);
    }

    #[tokio::test]
    async fn test_memoization_can_be_disabled() {
        let fetcher = MemoryFetcher::new()
            .with_body("mem://catalog.json", CATALOG)
            .with_body("mem://universe.csv", UNIVERSE)
            .with_body("mem://mom_up.csv", "Name\nBeta\n");
        let config = SessionConfig {
            memoize_setup_results: false,
            ..config()
        };
        let session = Session::open(fetcher, config).await.unwrap();
        let selection = FilterSelection::new().with_setup("MomUp");

        session.screen(&selection).await;
        session.screen(&selection).await;
        assert_eq!(session.fetcher().calls("mem://mom_up.csv"), 2);
    }
}
