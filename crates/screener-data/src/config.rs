//! Resource locations and fetch behaviour.

use chrono::Duration;

/// Default location of the setup catalog (JSON).
pub const DEFAULT_CATALOG_URL: &str = "https://gist.githubusercontent.com/traderLaval/9eaa7bc9f0aac2b276f59594e00f9207/raw/screener_setups.json";

/// Default location of the security universe (semicolon-delimited).
pub const DEFAULT_UNIVERSE_URL: &str = "https://gist.githubusercontent.com/traderLaval/9eaa7bc9f0aac2b276f59594e00f9207/raw/zb_style_invest_sum.csv";

/// Default base location that setup result files are published under.
pub const DEFAULT_RESULTS_BASE_URL: &str =
    "https://gist.github.com/traderLaval/e4e5eee8d610dcdcaf716a52624334bb/raw/";

/// Where the three kinds of resource live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Setup catalog locator.
    pub catalog_url: String,
    /// Universe table locator.
    pub universe_url: String,
    /// Base locator that a setup's `output_file` is appended to.
    pub results_base_url: String,
}

impl SourceConfig {
    /// Locator of the result table for a setup source file.
    pub fn result_location(&self, source_file: &str) -> String {
        if self.results_base_url.is_empty() || self.results_base_url.ends_with('/') {
            format!("{}{}", self.results_base_url, source_file)
        } else {
            format!("{}/{}", self.results_base_url, source_file)
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            universe_url: DEFAULT_UNIVERSE_URL.to_string(),
            results_base_url: DEFAULT_RESULTS_BASE_URL.to_string(),
        }
    }
}

/// Configuration for the on-disk response cache.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Whether to use the cache.
    pub use_cache: bool,
    /// Whether to force refresh (ignore cached bodies, still store new ones).
    pub force_refresh: bool,
    /// Cached bodies older than this are refetched.
    pub max_age: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            use_cache: true,
            force_refresh: false,
            max_age: Duration::hours(1),
        }
    }
}
