#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fetch;
pub mod model;
pub mod setup_results;
pub mod table;
pub mod universe;

pub use catalog::{Catalog, CatalogOrigin, load_catalog};
pub use config::{FetchConfig, SourceConfig};
pub use diagnostics::{Diagnostic, Severity};
pub use error::{DataError, ErrorKind, Result};
pub use fetch::{CachingFetcher, DirFetcher, Fetcher, HttpFetcher, MemoryFetcher};
pub use model::{
    ALL_SECTORS, FilterSelection, ScreenerSetup, SectorSelection, Security, StyleTag, StyleTags,
    TaxFilter,
};
pub use setup_results::{SetupOutcome, SetupResults, load_setup_results};
pub use universe::{Universe, UniverseSchema, load_universe};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
