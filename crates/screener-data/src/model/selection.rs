//! Filter selections gathered from the analyst.
//!
//! Each axis is optional: an empty or default selection passes every
//! security. Axes combine with AND.

use crate::model::security::Security;
use crate::model::style::{StyleTag, StyleTags};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Sector value that means "no sector filter".
pub const ALL_SECTORS: &str = "Tous";

/// Tax-wrapper eligibility filter. Exactly one mode is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxFilter {
    /// No constraint.
    #[default]
    Any,
    /// PEA-eligible only.
    PeaEligible,
    /// PEA-ineligible only.
    PeaIneligible,
    /// PEA-PME-eligible only.
    PeaPmeEligible,
}

impl TaxFilter {
    /// All modes.
    pub const ALL: [Self; 4] = [
        Self::Any,
        Self::PeaEligible,
        Self::PeaIneligible,
        Self::PeaPmeEligible,
    ];

    /// Whether `security` passes this filter.
    pub const fn matches(&self, security: &Security) -> bool {
        match self {
            Self::Any => true,
            Self::PeaEligible => security.pea_eligible,
            Self::PeaIneligible => !security.pea_eligible,
            Self::PeaPmeEligible => security.pea_pme_eligible,
        }
    }

    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::PeaEligible => "PEA eligible",
            Self::PeaIneligible => "Not PEA eligible",
            Self::PeaPmeEligible => "PEA-PME eligible",
        }
    }
}

impl fmt::Display for TaxFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a string names no tax filter mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown PEA filter {0:?} (expected any, eligible, ineligible or pme)")]
pub struct UnknownTaxFilter(pub String);

impl FromStr for TaxFilter {
    type Err = UnknownTaxFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "tous" => Ok(Self::Any),
            "eligible" | "pea" => Ok(Self::PeaEligible),
            "ineligible" | "non-pea" => Ok(Self::PeaIneligible),
            "pme" | "pea-pme" => Ok(Self::PeaPmeEligible),
            _ => Err(UnknownTaxFilter(s.to_string())),
        }
    }
}

/// Sector filter: everything, or one exact sector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SectorSelection {
    /// No constraint.
    #[default]
    All,
    /// Only securities whose sector equals this value.
    Only(String),
}

impl SectorSelection {
    /// Whether `security` passes this filter. A security without a sector
    /// passes only [`All`](Self::All).
    pub fn matches(&self, security: &Security) -> bool {
        match self {
            Self::All => true,
            Self::Only(sector) => security.sector.as_deref() == Some(sector.as_str()),
        }
    }
}

impl From<&str> for SectorSelection {
    fn from(value: &str) -> Self {
        if value == ALL_SECTORS {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }
}

impl fmt::Display for SectorSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_SECTORS),
            Self::Only(sector) => f.write_str(sector),
        }
    }
}

impl Serialize for SectorSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_none(),
            Self::Only(sector) => serializer.serialize_some(sector),
        }
    }
}

/// Everything the analyst selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    /// Setup display names; a security must appear in at least one.
    pub setups: Vec<String>,
    /// Markets; a security must be listed on one of them.
    pub markets: BTreeSet<String>,
    /// Tax-wrapper mode.
    pub tax: TaxFilter,
    /// Style tags; a security must carry at least one.
    pub styles: StyleTags,
    /// Sector.
    pub sector: SectorSelection,
}

impl FilterSelection {
    /// A selection that passes everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a setup.
    #[must_use]
    pub fn with_setup(mut self, name: impl Into<String>) -> Self {
        self.setups.push(name.into());
        self
    }

    /// Add a market.
    #[must_use]
    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.markets.insert(market.into());
        self
    }

    /// Set the tax-wrapper mode.
    #[must_use]
    pub const fn with_tax(mut self, tax: TaxFilter) -> Self {
        self.tax = tax;
        self
    }

    /// Add a style tag.
    #[must_use]
    pub const fn with_style(mut self, tag: StyleTag) -> Self {
        self.styles = self.styles.with(tag);
        self
    }

    /// Set the sector; [`ALL_SECTORS`] clears it.
    #[must_use]
    pub fn with_sector(mut self, sector: &str) -> Self {
        self.sector = SectorSelection::from(sector);
        self
    }

    /// Whether `security` passes the market axis.
    pub fn matches_market(&self, security: &Security) -> bool {
        self.markets.is_empty() || self.markets.contains(&security.market)
    }

    /// Whether `security` passes the style axis.
    pub const fn matches_styles(&self, security: &Security) -> bool {
        self.styles.is_empty() || security.style_tags.intersects(self.styles)
    }

    /// Whether every axis is at its pass-all default.
    pub fn is_unfiltered(&self) -> bool {
        self.setups.is_empty()
            && self.markets.is_empty()
            && self.tax == TaxFilter::Any
            && self.styles.is_empty()
            && self.sector == SectorSelection::All
    }
}
