//! Setup catalog loading.
//!
//! The catalog is a JSON document of the form
//! `{"setups": {"<id>": {"name": ..., "output_file": ..., "description": ...}}}`.
//! Loading never fails: when the remote document cannot be fetched or parsed,
//! the built-in catalog is used instead and a diagnostic records why.

use crate::diagnostics::Diagnostic;
use crate::error::{DataError, Result};
use crate::fetch::Fetcher;
use crate::model::ScreenerSetup;
use serde::Deserialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Where a catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// Parsed from the remote document.
    Remote,
    /// The built-in catalog.
    Fallback,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    setups: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawSetup {
    name: Option<String>,
    output_file: Option<String>,
    description: Option<String>,
}

/// Setups indexed by display name.
///
/// When several entries share a name, lookups resolve to the first in
/// document order; the others stay listed but are unreachable by name.
#[derive(Debug, Clone)]
pub struct Catalog {
    setups: Vec<ScreenerSetup>,
    by_name: HashMap<String, usize>,
    origin: CatalogOrigin,
    diagnostics: Vec<Diagnostic>,
}

impl Catalog {
    /// Build a catalog from setups in iteration order.
    pub fn from_setups(setups: Vec<ScreenerSetup>, origin: CatalogOrigin) -> Self {
        let mut by_name = HashMap::with_capacity(setups.len());
        let mut diagnostics = Vec::new();

        for (index, setup) in setups.iter().enumerate() {
            match by_name.entry(setup.name.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(index);
                }
                Entry::Occupied(slot) => {
                    let diagnostic = Diagnostic::DuplicateSetupName {
                        name: setup.name.clone(),
                        kept_id: setups[*slot.get()].id.clone(),
                        shadowed_id: setup.id.clone(),
                    };
                    diagnostic.emit();
                    diagnostics.push(diagnostic);
                }
            }
        }

        Self {
            setups,
            by_name,
            origin,
            diagnostics,
        }
    }

    /// Parse a catalog document.
    ///
    /// Entries without a usable `name` are skipped with a diagnostic.
    ///
    /// # Errors
    /// Returns [`DataError::Serialization`] when the text is not JSON or has no
    /// `setups` object.
    pub fn parse(text: &str) -> Result<Self> {
        let document: CatalogDocument = serde_json::from_str(text)?;

        let mut setups = Vec::with_capacity(document.setups.len());
        let mut skipped = Vec::new();

        for (id, value) in document.setups {
            let raw = match serde_json::from_value::<RawSetup>(value) {
                Ok(raw) => raw,
                Err(e) => {
                    skipped.push(Diagnostic::CatalogEntrySkipped {
                        id,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            let Some(name) = raw.name.filter(|name| !name.trim().is_empty()) else {
                skipped.push(Diagnostic::CatalogEntrySkipped {
                    id,
                    reason: "missing name".to_string(),
                });
                continue;
            };
            setups.push(ScreenerSetup {
                id,
                name,
                source_file: raw.output_file.filter(|file| !file.trim().is_empty()),
                description: raw.description,
            });
        }

        for diagnostic in &skipped {
            diagnostic.emit();
        }

        let mut catalog = Self::from_setups(setups, CatalogOrigin::Remote);
        skipped.append(&mut catalog.diagnostics);
        catalog.diagnostics = skipped;
        Ok(catalog)
    }

    /// The built-in catalog.
    pub fn fallback() -> Self {
        Self::from_setups(fallback_setups(), CatalogOrigin::Fallback)
    }

    fn fallback_because(error: &DataError) -> Self {
        let diagnostic = Diagnostic::CatalogFallback {
            reason: error.to_string(),
        };
        diagnostic.emit();

        let mut catalog = Self::fallback();
        catalog.diagnostics.insert(0, diagnostic);
        catalog
    }

    /// Resolve a setup by display name.
    pub fn lookup(&self, name: &str) -> Option<&ScreenerSetup> {
        self.by_name.get(name).map(|&index| &self.setups[index])
    }

    /// All setups in document order.
    pub fn setups(&self) -> &[ScreenerSetup] {
        &self.setups
    }

    /// Display names in document order, duplicates included.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.setups.iter().map(|setup| setup.name.as_str())
    }

    /// Where this catalog came from.
    pub const fn origin(&self) -> CatalogOrigin {
        self.origin
    }

    /// Events recorded while building the catalog.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of setups.
    pub fn len(&self) -> usize {
        self.setups.len()
    }

    /// Whether the catalog lists no setup.
    pub fn is_empty(&self) -> bool {
        self.setups.is_empty()
    }
}

/// Load the catalog from `location`, falling back to the built-in one.
///
/// Makes exactly one attempt.
pub async fn load_catalog<F: Fetcher>(fetcher: &F, location: &str) -> Catalog {
    let parsed = match fetcher.fetch_text(location).await {
        Ok(text) => Catalog::parse(&text),
        Err(e) => Err(e),
    };

    match parsed {
        Ok(catalog) if catalog.is_empty() => Catalog::fallback_because(&DataError::Parse(
            format!("{location} lists no usable setup"),
        )),
        Ok(catalog) => {
            tracing::info!(%location, setups = catalog.len(), "Loaded setup catalog");
            catalog
        }
        Err(e) => Catalog::fallback_because(&e),
    }
}

fn fallback_setups() -> Vec<ScreenerSetup> {
    vec![
        ScreenerSetup::new(
            "setup01",
            "MM200_Cross_Up",
            "mm200_cross_up.csv",
            "Close a franchi la MM200 jours à la hausse",
        ),
        ScreenerSetup::new(
            "setup02",
            "MM200_Cross_Up_MACD_Up",
            "mm200_cross_up_macd_up.csv",
            "MM200 + MACD haussier",
        ),
        ScreenerSetup::new(
            "setup03",
            "MM200_Cross_Up_WMA12_Up",
            "mm200_cross_up_wma12_up.csv",
            "MM200 + WMA12 ascendante",
        ),
        ScreenerSetup::new(
            "setup04",
            "Weekly_SuperTrend_Cross",
            "weekly_supertrend_cross.csv",
            "SuperTrend hebdomadaire franchi",
        ),
        ScreenerSetup::new(
            "setup05",
            "Above_Weekly_Below_Daily_SuperTrend",
            "above_weekly_below_daily_supertrend.csv",
            "Entre SuperTrend hebdo et daily",
        ),
        ScreenerSetup::new(
            "setup09",
            "new_high_50_days",
            "new_high_50_days.csv",
            "Nouveau plus haut 50 jours",
        ),
        ScreenerSetup::new(
            "setup10",
            "new_high_100_days",
            "new_high_100_days.csv",
            "Nouveau plus haut 100 jours",
        ),
        ScreenerSetup::new(
            "setup11",
            "new_high_200_days",
            "new_high_200_days.csv",
            "Nouveau plus haut 200 jours",
        ),
    ]
}
