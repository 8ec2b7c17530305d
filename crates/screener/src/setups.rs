//! Resolution of selected setup names into security-name sets.
//!
//! Each distinct selected name is looked up in the catalog by exact display
//! name. Setups with a result file are fetched (concurrently, bounded by
//! [`DEFAULT_CONCURRENCY`]); the resulting name sets are unioned. Results and
//! diagnostics keep selection order regardless of fetch completion order.

use futures::stream::{self, StreamExt};
use screener_data::{
    Catalog, Diagnostic, Fetcher, SetupResults, SourceConfig, load_setup_results,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Default number of result tables fetched at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Request {
    Fetch { name: String, source_file: String },
    Unknown { name: String },
    WithoutSource { name: String },
}

impl Request {
    fn plan(catalog: &Catalog, selected: &[String]) -> Vec<Self> {
        let mut seen = HashSet::new();
        selected
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .map(|name| match catalog.lookup(name) {
                None => Self::Unknown { name: name.clone() },
                Some(setup) => match &setup.source_file {
                    Some(source_file) => Self::Fetch {
                        name: name.clone(),
                        source_file: source_file.clone(),
                    },
                    None => Self::WithoutSource { name: name.clone() },
                },
            })
            .collect()
    }
}

/// Setup results memoized for a session, keyed by `(setup_name, source_file)`.
///
/// Only results that were actually checked are kept; failures are retried on
/// the next resolution.
#[derive(Debug, Default)]
pub struct SetupMemo {
    entries: Mutex<HashMap<(String, String), SetupResults>>,
}

impl SetupMemo {
    /// Create an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Memoized results for a setup.
    pub fn get(&self, setup_name: &str, source_file: &str) -> Option<SetupResults> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(&(setup_name.to_string(), source_file.to_string()))
            .cloned()
    }

    /// Remember results unless they are a failure.
    pub fn insert(&self, results: &SetupResults) {
        if results.is_failure() {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                (
                    results.setup().to_string(),
                    results.source_file().to_string(),
                ),
                results.clone(),
            );
        }
    }

    /// Number of memoized setups.
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    /// Whether nothing is memoized.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The outcome of resolving a setup selection.
///
/// A value: built once per selection and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupResolution {
    selected: Vec<String>,
    results: Vec<SetupResults>,
    union: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl SetupResolution {
    /// Resolution of an empty selection: admits every security.
    pub fn none() -> Self {
        Self::default()
    }

    /// Resolve synchronously, obtaining each setup's results from `load`.
    ///
    /// `load` receives `(setup_name, source_file)` and is called once per
    /// distinct resolvable setup, in selection order.
    pub fn resolve_with<L>(catalog: &Catalog, selected: &[String], mut load: L) -> Self
    where
        L: FnMut(&str, &str) -> SetupResults,
    {
        let requests = Request::plan(catalog, selected);
        let loaded = requests
            .iter()
            .map(|request| match request {
                Request::Fetch { name, source_file } => Some(load(name, source_file)),
                _ => None,
            })
            .collect();
        Self::assemble(requests, loaded)
    }

    fn assemble(requests: Vec<Request>, loaded: Vec<Option<SetupResults>>) -> Self {
        let mut selected = Vec::with_capacity(requests.len());
        let mut results = Vec::new();
        let mut union = HashSet::new();
        let mut diagnostics = Vec::new();

        for (request, loaded) in requests.into_iter().zip(loaded) {
            match (request, loaded) {
                (Request::Fetch { name, .. }, Some(setup_results)) => {
                    diagnostics.extend_from_slice(setup_results.skipped_rows());
                    diagnostics.push(setup_results.diagnostic());
                    union.extend(setup_results.names().iter().cloned());
                    results.push(setup_results);
                    selected.push(name);
                }
                (Request::Unknown { name } | Request::Fetch { name, .. }, _) => {
                    let diagnostic = Diagnostic::UnknownSetup { name: name.clone() };
                    diagnostic.emit();
                    diagnostics.push(diagnostic);
                    selected.push(name);
                }
                (Request::WithoutSource { name }, _) => {
                    let diagnostic = Diagnostic::SetupWithoutSource { name: name.clone() };
                    diagnostic.emit();
                    diagnostics.push(diagnostic);
                    selected.push(name);
                }
            }
        }

        Self {
            selected,
            results,
            union,
            diagnostics,
        }
    }

    /// Whether a setup filter is in force.
    pub fn is_active(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Distinct selected names, in selection order.
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Results of every setup that was fetched, in selection order.
    pub fn results(&self) -> &[SetupResults] {
        &self.results
    }

    /// Union of matched security names across all selected setups.
    pub const fn union(&self) -> &HashSet<String> {
        &self.union
    }

    /// Whether no selected setup could be checked.
    pub fn all_failed(&self) -> bool {
        self.results.iter().all(SetupResults::is_failure)
    }

    /// Whether a security with this name passes the setup filter.
    ///
    /// With no setup selected everything passes. Otherwise the name must be
    /// in the union, so an empty union admits nothing.
    pub fn admits(&self, name: &str) -> bool {
        !self.is_active() || self.union.contains(name)
    }

    /// Diagnostics in selection order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Fetch and resolve the selected setups.
///
/// `memo`, when given, is consulted before fetching and filled afterwards.
pub async fn resolve_setups<F: Fetcher>(
    fetcher: &F,
    sources: &SourceConfig,
    catalog: &Catalog,
    selected: &[String],
    memo: Option<&SetupMemo>,
) -> SetupResolution {
    let requests = Request::plan(catalog, selected);

    let loaded: Vec<Option<SetupResults>> = stream::iter(requests.iter())
        .map(|request| async move {
            let Request::Fetch { name, source_file } = request else {
                return None;
            };
            if let Some(hit) = memo.and_then(|memo| memo.get(name, source_file)) {
                tracing::debug!(setup = %name, "Using memoized setup results");
                return Some(hit);
            }
            let results = load_setup_results(fetcher, sources, name, source_file).await;
            if let Some(memo) = memo {
                memo.insert(&results);
            }
            Some(results)
        })
        .buffered(DEFAULT_CONCURRENCY)
        .collect()
        .await;

    SetupResolution::assemble(requests, loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_data::{CatalogOrigin, MemoryFetcher, ScreenerSetup, SetupOutcome};

    fn catalog() -> Catalog {
        Catalog::from_setups(
            vec![
                ScreenerSetup::new("s1", "MomUp", "mom_up.csv", "Momentum up"),
                ScreenerSetup::new("s2", "NewHigh", "new_high.csv", "New high"),
                ScreenerSetup {
                    id: "s3".to_string(),
                    name: "Draft".to_string(),
                    source_file: None,
                    description: None,
                },
            ],
            CatalogOrigin::Remote,
        )
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn sources() -> SourceConfig {
        SourceConfig {
            results_base_url: "mem://".to_string(),
            ..SourceConfig::default()
        }
    }

    #[test]
    fn test_empty_selection_admits_everything() {
        let resolution = SetupResolution::resolve_with(&catalog(), &[], |_, _| unreachable!());
        assert!(!resolution.is_active());
        assert!(resolution.admits("Anything"));
        assert_eq!(resolution, SetupResolution::none());
    }

    #[test]
    fn test_union_across_setups() {
        let resolution =
            SetupResolution::resolve_with(&catalog(), &names(&["MomUp", "NewHigh"]), |name, file| {
                match name {
                    "MomUp" => SetupResults::parse(name, file, "Name\nAcme\nBeta\n"),
                    _ => SetupResults::parse(name, file, "Name\nBeta\nGamma\n"),
                }
            });
        assert_eq!(resolution.union().len(), 3);
        assert!(resolution.admits("Acme") && resolution.admits("Gamma"));
        assert!(!resolution.admits("Delta"));
        assert!(!resolution.all_failed());
    }

    #[test]
    fn test_unknown_and_sourceless_setups() {
        let resolution = SetupResolution::resolve_with(
            &catalog(),
            &names(&["Nope", "Draft", "Nope"]),
            |_, _| unreachable!("nothing to fetch"),
        );
        assert_eq!(resolution.selected(), names(&["Nope", "Draft"]).as_slice());
        assert!(resolution.is_active());
        assert!(resolution.all_failed());
        assert!(!resolution.admits("Acme"));
        assert_eq!(
            resolution.diagnostics(),
            &[
                Diagnostic::UnknownSetup {
                    name: "Nope".to_string()
                },
                Diagnostic::SetupWithoutSource {
                    name: "Draft".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_fetches_each_distinct_setup_once() {
        let fetcher = MemoryFetcher::new()
            .with_body("mem://mom_up.csv", "Name\nAcme\n")
            .with_status("mem://new_high.csv", 404);

        let resolution = resolve_setups(
            &fetcher,
            &sources(),
            &catalog(),
            &names(&["NewHigh", "MomUp", "NewHigh"]),
            None,
        )
        .await;

        assert_eq!(fetcher.calls("mem://mom_up.csv"), 1);
        assert_eq!(fetcher.calls("mem://new_high.csv"), 1);
        assert_eq!(resolution.results()[0].setup(), "NewHigh");
        assert!(matches!(
            resolution.results()[0].outcome(),
            SetupOutcome::FetchFailed { .. }
        ));
        assert!(resolution.admits("Acme"));
        assert!(!resolution.all_failed());
    }

    #[tokio::test]
    async fn test_memo_skips_refetch_of_successes_only() {
        let fetcher = MemoryFetcher::new()
            .with_body("mem://mom_up.csv", "Name\nAcme\n")
            .with_status("mem://new_high.csv", 503);
        let memo = SetupMemo::new();
        let selected = names(&["MomUp", "NewHigh"]);

        for _ in 0..2 {
            resolve_setups(&fetcher, &sources(), &catalog(), &selected, Some(&memo)).await;
        }

        assert_eq!(fetcher.calls("mem://mom_up.csv"), 1);
        assert_eq!(fetcher.calls("mem://new_high.csv"), 2);
        assert_eq!(memo.len(), 1);
    }
}
