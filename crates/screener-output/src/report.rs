//! Screen reports.

use crate::error::Result;
use crate::styles::{StyleCorrelation, StyleCount, style_counts};
use crate::summary::{DEFAULT_TOP_N, Distribution, EligibilitySplit, ScreenSummary};
use chrono::{DateTime, Utc};
use screener_data::{FilterSelection, SectorSelection, Security, TaxFilter, Universe};
use serde::Serialize;

/// One line per active filter axis, in a fixed order: setups, markets,
/// PEA mode, styles, sector. Empty when nothing filters.
pub fn active_filters(selection: &FilterSelection) -> Vec<String> {
    let mut lines = Vec::new();

    if !selection.setups.is_empty() {
        lines.push(format!("Setups: {}", selection.setups.join(", ")));
    }
    if !selection.markets.is_empty() {
        let markets: Vec<&str> = selection.markets.iter().map(String::as_str).collect();
        lines.push(format!("Markets: {}", markets.join(", ")));
    }
    if selection.tax != TaxFilter::Any {
        lines.push(format!("PEA: {}", selection.tax));
    }
    if !selection.styles.is_empty() {
        let styles: Vec<&str> = selection.styles.iter().map(|s| s.column()).collect();
        lines.push(format!("Styles: {}", styles.join(", ")));
    }
    if let SectorSelection::Only(sector) = &selection.sector {
        lines.push(format!("Sector: {sector}"));
    }

    lines
}

/// Every statistic of a screen.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenStats {
    /// Headline metrics.
    pub summary: ScreenSummary,
    /// All markets, largest first.
    pub markets: Distribution,
    /// Top sectors, largest first.
    pub sectors: Distribution,
    /// PEA split, when the universe publishes PEA.
    pub pea: Option<EligibilitySplit>,
    /// PEA-PME split, when the universe publishes PEA-PME.
    pub pea_pme: Option<EligibilitySplit>,
    /// Count per available style.
    pub styles: Vec<StyleCount>,
    /// Correlation between available styles.
    pub correlation: Option<StyleCorrelation>,
}

impl ScreenStats {
    /// Compute statistics for `rows` drawn from `universe`.
    pub fn compute(universe: &Universe, rows: &[&Security]) -> Self {
        let available = universe.available_styles();
        Self {
            summary: ScreenSummary::new(universe.len(), rows),
            markets: Distribution::markets(rows),
            sectors: Distribution::sectors(rows).top(DEFAULT_TOP_N),
            pea: EligibilitySplit::pea(universe, rows),
            pea_pme: EligibilitySplit::pea_pme(universe, rows),
            styles: style_counts(rows, &available),
            correlation: StyleCorrelation::compute(rows, &available),
        }
    }
}

/// A screen's selection, statistics and securities, ready to serialize.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenReport {
    /// Report generation timestamp.
    pub generated_at: DateTime<Utc>,
    /// The selection.
    pub selection: FilterSelection,
    /// Active filters as text.
    pub filters: Vec<String>,
    /// Statistics.
    pub stats: ScreenStats,
    /// Passing securities, in universe order.
    pub securities: Vec<Security>,
}

impl ScreenReport {
    /// Build a report.
    pub fn new(universe: &Universe, selection: &FilterSelection, rows: &[&Security]) -> Self {
        Self {
            generated_at: Utc::now(),
            selection: selection.clone(),
            filters: active_filters(selection),
            stats: ScreenStats::compute(universe, rows),
            securities: rows.iter().map(|&s| s.clone()).collect(),
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
