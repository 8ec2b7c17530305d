//! The canonical security record.

use crate::model::style::{StyleTag, StyleTags};
use serde::Serialize;

/// Marker that flags a style column as set.
pub const STYLE_MARKER: &str = "X";

/// One row of the universe.
///
/// `market`, `name` and `symbol` are always non-empty. Eligibility flags and
/// style tags are always resolved booleans, false when the source lacked them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Security {
    /// Listing market.
    pub market: String,
    /// Company name, trimmed. Join key against setup results.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Eligible for the PEA wrapper.
    pub pea_eligible: bool,
    /// Eligible for the PEA-PME wrapper.
    pub pea_pme_eligible: bool,
    /// Investment-style tags.
    pub style_tags: StyleTags,
    /// Sector, when published.
    pub sector: Option<String>,
    /// Industry, when published.
    pub industry: Option<String>,
    /// Link to the external company profile.
    pub detail_url: Option<String>,
}

impl Security {
    /// Create a security with the required fields and every optional field unset.
    pub fn new(
        market: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            market: market.into(),
            name: name.into(),
            symbol: symbol.into(),
            pea_eligible: false,
            pea_pme_eligible: false,
            style_tags: StyleTags::empty(),
            sector: None,
            industry: None,
            detail_url: None,
        }
    }

    /// Whether the security carries `tag`.
    pub const fn has_style(&self, tag: StyleTag) -> bool {
        self.style_tags.contains(tag)
    }

    /// Chart page derived from the profile link.
    pub fn chart_url(&self) -> Option<String> {
        self.detail_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| format!("{}/graphiques/", url.trim_end_matches('/')))
    }
}

/// Parse an eligibility flag: true iff the trimmed value is `true`, any case.
pub fn parse_truthy(raw: Option<&str>) -> bool {
    raw.is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}

/// Parse a style marker: true iff the trimmed value is exactly `X`.
pub fn parse_marker(raw: Option<&str>) -> bool {
    raw.is_some_and(|value| value.trim() == STYLE_MARKER)
}
