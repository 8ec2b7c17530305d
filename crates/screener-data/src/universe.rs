//! Universe loading and normalization.
//!
//! Normalization is applied once, at load time:
//! 1. rows lacking `Name`, `Symbol` or `Market` are dropped;
//! 2. cells are trimmed (see [`table`](crate::table));
//! 3. `PEA` / `PEA-PME` become booleans, true only for `true` in any case;
//! 4. each style column becomes a boolean, true only for the marker `X`.
//!
//! Optional columns missing from the source are recorded in
//! [`UniverseSchema`] and resolve to their default for every row.

use crate::diagnostics::Diagnostic;
use crate::error::{DataError, Result};
use crate::fetch::Fetcher;
use crate::model::{Security, StyleTag, StyleTags, parse_marker, parse_truthy};
use crate::table::{Row, Table};
use std::collections::BTreeSet;

/// Company name column.
pub const NAME: &str = "Name";
/// Ticker column.
pub const SYMBOL: &str = "Symbol";
/// Listing market column.
pub const MARKET: &str = "Market";
/// PEA eligibility column.
pub const PEA: &str = "PEA";
/// PEA-PME eligibility column.
pub const PEA_PME: &str = "PEA-PME";
/// Sector column.
pub const SECTOR: &str = "Sector";
/// Industry column.
pub const INDUSTRY: &str = "Industry";
/// Profile link column.
pub const DETAIL_URL: &str = "ZB URL";

/// Which optional columns the source published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniverseSchema {
    /// `PEA` column present.
    pub pea: bool,
    /// `PEA-PME` column present.
    pub pea_pme: bool,
    /// `Sector` column present.
    pub sector: bool,
    /// `Industry` column present.
    pub industry: bool,
    /// `ZB URL` column present.
    pub detail_url: bool,
    /// Style columns present.
    pub styles: StyleTags,
}

impl UniverseSchema {
    /// Schema with every optional column present.
    pub fn complete() -> Self {
        Self {
            pea: true,
            pea_pme: true,
            sector: true,
            industry: true,
            detail_url: true,
            styles: StyleTag::ALL.into_iter().collect(),
        }
    }
}

#[derive(Debug)]
struct Columns {
    name: usize,
    symbol: usize,
    market: usize,
    pea: Option<usize>,
    pea_pme: Option<usize>,
    sector: Option<usize>,
    industry: Option<usize>,
    detail_url: Option<usize>,
    styles: Vec<(StyleTag, usize)>,
}

impl Columns {
    fn locate(table: &Table) -> Result<Self> {
        let required = |column: &str| {
            table.column(column).ok_or_else(|| DataError::MissingColumn {
                resource: table.resource().to_string(),
                column: column.to_string(),
            })
        };

        Ok(Self {
            name: required(NAME)?,
            symbol: required(SYMBOL)?,
            market: required(MARKET)?,
            pea: table.column(PEA),
            pea_pme: table.column(PEA_PME),
            sector: table.column(SECTOR),
            industry: table.column(INDUSTRY),
            detail_url: table.column(DETAIL_URL),
            styles: StyleTag::ALL
                .into_iter()
                .filter_map(|tag| table.column(tag.column()).map(|index| (tag, index)))
                .collect(),
        })
    }

    fn schema(&self) -> UniverseSchema {
        UniverseSchema {
            pea: self.pea.is_some(),
            pea_pme: self.pea_pme.is_some(),
            sector: self.sector.is_some(),
            industry: self.industry.is_some(),
            detail_url: self.detail_url.is_some(),
            styles: self.styles.iter().map(|(tag, _)| *tag).collect(),
        }
    }

    fn read(&self, row: &Row) -> std::result::Result<Security, &'static str> {
        let name = row.get(self.name).ok_or(NAME)?;
        let symbol = row.get(self.symbol).ok_or(SYMBOL)?;
        let market = row.get(self.market).ok_or(MARKET)?;

        let optional = |index: Option<usize>| index.and_then(|i| row.get(i));
        let owned = |index: Option<usize>| optional(index).map(str::to_string);

        let mut style_tags = StyleTags::empty();
        for &(tag, index) in &self.styles {
            style_tags.set(tag, parse_marker(row.get(index)));
        }

        Ok(Security {
            market: market.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            pea_eligible: parse_truthy(optional(self.pea)),
            pea_pme_eligible: parse_truthy(optional(self.pea_pme)),
            style_tags,
            sector: owned(self.sector),
            industry: owned(self.industry),
            detail_url: owned(self.detail_url),
        })
    }
}

/// The canonical security set.
#[derive(Debug, Clone)]
pub struct Universe {
    securities: Vec<Security>,
    schema: UniverseSchema,
    diagnostics: Vec<Diagnostic>,
}

impl Universe {
    /// Build a universe from already-normalized securities.
    pub const fn from_securities(securities: Vec<Security>, schema: UniverseSchema) -> Self {
        Self {
            securities,
            schema,
            diagnostics: Vec::new(),
        }
    }

    /// Normalize a parsed table.
    ///
    /// # Errors
    /// Returns [`DataError::MissingColumn`] when `Name`, `Symbol` or `Market`
    /// is absent from the header.
    pub fn from_table(table: Table) -> Result<Self> {
        let columns = Columns::locate(&table)?;

        let mut securities = Vec::with_capacity(table.len());
        let mut dropped = [(NAME, 0usize), (SYMBOL, 0), (MARKET, 0)];

        for row in table.rows() {
            match columns.read(row) {
                Ok(security) => securities.push(security),
                Err(field) => {
                    if let Some(slot) = dropped.iter_mut().find(|(f, _)| *f == field) {
                        slot.1 += 1;
                    }
                }
            }
        }

        let schema = columns.schema();
        let mut diagnostics = table.into_diagnostics();
        for (field, count) in dropped {
            if count > 0 {
                let diagnostic = Diagnostic::DroppedSecurities { field, count };
                diagnostic.emit();
                diagnostics.push(diagnostic);
            }
        }

        Ok(Self {
            securities,
            schema,
            diagnostics,
        })
    }

    /// Parse and normalize a universe table.
    pub fn parse(resource: impl Into<String>, text: &str) -> Result<Self> {
        Self::from_table(Table::parse(resource, text)?)
    }

    /// All securities in source order.
    pub fn securities(&self) -> &[Security] {
        &self.securities
    }

    /// Optional columns the source published.
    pub const fn schema(&self) -> &UniverseSchema {
        &self.schema
    }

    /// Rows skipped or dropped during loading.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of securities.
    pub fn len(&self) -> usize {
        self.securities.len()
    }

    /// Whether no security survived loading.
    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }

    /// Distinct markets, sorted.
    pub fn markets(&self) -> Vec<&str> {
        self.securities
            .iter()
            .map(|s| s.market.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct sectors, sorted. Securities without a sector are not listed.
    pub fn sectors(&self) -> Vec<&str> {
        self.securities
            .iter()
            .filter_map(|s| s.sector.as_deref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Style tags whose column the source published.
    pub fn available_styles(&self) -> Vec<StyleTag> {
        self.schema.styles.iter().collect()
    }

    /// Number of PEA-eligible securities.
    pub fn pea_eligible_count(&self) -> usize {
        self.securities.iter().filter(|s| s.pea_eligible).count()
    }

    /// Number of PEA-PME-eligible securities.
    pub fn pea_pme_eligible_count(&self) -> usize {
        self.securities.iter().filter(|s| s.pea_pme_eligible).count()
    }
}

/// Fetch and normalize the universe at `location`.
///
/// # Errors
/// Fetch and parse failures are returned as is: there is no fallback universe.
pub async fn load_universe<F: Fetcher>(fetcher: &F, location: &str) -> Result<Universe> {
    let text = fetcher.fetch_text(location).await?;
    let universe = Universe::parse(location, &text)?;

    tracing::info!(
        %location,
        securities = universe.len(),
        skipped = universe.diagnostics().len(),
        "Loaded universe"
    );
    Ok(universe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;

    const FULL: &str = "\
Market;Name;Symbol;PEA;PEA-PME;Sector;Industry;ZB URL;MBagger;ROE;grow;growR;mom;qual;qualR;small;trend;value
Paris;  Acme  ;ACM;True;false;Technology;Software;https://zb/acme/;;X;X;;;;;;;
Paris;Beta;BTA;TRUE ;;Energy;Oil;;X;;;;X;;;;;
Xetra;Gamma;GMA;no;true;;;;;;;;;;;;;x
;Delta;DLT;true;;;;;;;;;;;;;;
Paris;;EPS;true;;;;;;;;;;;;;;
";

    #[test]
    fn test_normalizes_full_table() {
        let universe = Universe::parse("universe", FULL).unwrap();
        assert_eq!(universe.len(), 3);
        assert_eq!(universe.schema(), &UniverseSchema::complete());

        let acme = &universe.securities()[0];
        assert_eq!(acme.name, "Acme");
        assert!(acme.pea_eligible);
        assert!(!acme.pea_pme_eligible);
        assert!(acme.has_style(StyleTag::ReturnOnEquity));
        assert!(acme.has_style(StyleTag::Growth));
        assert!(!acme.has_style(StyleTag::Momentum));
        assert_eq!(acme.sector.as_deref(), Some("Technology"));
        assert_eq!(acme.detail_url.as_deref(), Some("https://zb/acme/"));

        let beta = &universe.securities()[1];
        assert!(beta.pea_eligible);
        assert!(beta.has_style(StyleTag::MultiBagger));
        assert!(beta.has_style(StyleTag::Momentum));
        assert_eq!(beta.detail_url, None);

        let gamma = &universe.securities()[2];
        assert!(!gamma.pea_eligible);
        assert!(gamma.pea_pme_eligible);
        assert!(!gamma.has_style(StyleTag::Value));
        assert_eq!(gamma.sector, None);
    }

    #[test]
    fn test_drops_rows_missing_required_fields() {
        let universe = Universe::parse("universe", FULL).unwrap();
        assert!(
            universe
                .securities()
                .iter()
                .all(|s| s.name != "Delta" && s.symbol != "EPS")
        );
        assert!(
            universe
                .diagnostics()
                .contains(&Diagnostic::DroppedSecurities {
                    field: MARKET,
                    count: 1
                })
        );
        assert!(
            universe
                .diagnostics()
                .contains(&Diagnostic::DroppedSecurities {
                    field: NAME,
                    count: 1
                })
        );
    }

    #[test]
    fn test_missing_optional_columns_default() {
        let universe = Universe::parse("u", "Market;Name;Symbol;mom\nParis;Acme;ACM;X\n").unwrap();
        let schema = universe.schema();
        assert!(!schema.pea && !schema.pea_pme && !schema.sector);
        assert_eq!(universe.available_styles(), vec![StyleTag::Momentum]);

        let acme = &universe.securities()[0];
        assert!(!acme.pea_eligible);
        assert_eq!(acme.sector, None);
        assert!(acme.has_style(StyleTag::Momentum));
        assert!(!acme.has_style(StyleTag::Growth));
    }

    #[test]
    fn test_missing_required_column_is_schema_error() {
        let err = Universe::parse("u", "Name;Symbol\nAcme;ACM\n").unwrap_err();
        assert!(matches!(
            err,
            DataError::MissingColumn { ref column, .. } if column == MARKET
        ));
    }

    #[test]
    fn test_option_lists() {
        let universe = Universe::parse("universe", FULL).unwrap();
        assert_eq!(universe.markets(), vec!["Paris", "Xetra"]);
        assert_eq!(universe.sectors(), vec!["Energy", "Technology"]);
        assert_eq!(universe.pea_eligible_count(), 2);
        assert_eq!(universe.pea_pme_eligible_count(), 1);
    }

    #[tokio::test]
    async fn test_load_propagates_fetch_failure() {
        let fetcher = MemoryFetcher::new().with_status("u.csv", 404);
        let err = load_universe(&fetcher, "u.csv").await.unwrap_err();
        assert!(err.is_fetch_failure());
    }
}
