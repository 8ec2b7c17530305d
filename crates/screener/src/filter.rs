//! The filter engine.
//!
//! [`apply_filters`] is a pure function of the universe, the resolved setups
//! and the selection. Setup membership is applied first so that its
//! diagnostics precede everything else; the remaining axes narrow the
//! setup-filtered rows. Since every axis is a conjunct, the order never
//! changes which rows survive.

use crate::setups::SetupResolution;
use screener_data::{Diagnostic, FilterSelection, Security, Universe};

/// The securities passing a selection, in universe order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    rows: Vec<&'a Security>,
    universe_size: usize,
    selection: FilterSelection,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> FilteredView<'a> {
    /// Passing securities.
    pub fn rows(&self) -> &[&'a Security] {
        &self.rows
    }

    /// Iterate over passing securities.
    pub fn iter(&self) -> impl Iterator<Item = &'a Security> + '_ {
        self.rows.iter().copied()
    }

    /// Number of passing securities.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether nothing passed.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Size of the universe the view was taken from.
    pub const fn universe_size(&self) -> usize {
        self.universe_size
    }

    /// The selection that produced this view.
    pub const fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Diagnostics in emission order: setup resolution first.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Owned copies of the passing securities.
    pub fn to_securities(&self) -> Vec<Security> {
        self.rows.iter().map(|s| (*s).clone()).collect()
    }
}

/// Apply every active filter to `universe`.
///
/// The setup filter is active whenever `selection.setups` is non-empty, and
/// membership is decided by `setups`, which should have been resolved from
/// those names. A selected name missing from `setups` rejects every row with
/// [`Diagnostic::UnresolvedSetup`]. When setups were selected but their union
/// is empty, no row passes and [`Diagnostic::EmptySetupUnion`] records whether
/// that is because nothing could be checked.
pub fn apply_filters<'a>(
    universe: &'a Universe,
    setups: &SetupResolution,
    selection: &FilterSelection,
) -> FilteredView<'a> {
    let mut diagnostics = setups.diagnostics().to_vec();
    let mut rows: Vec<&Security> = universe.securities().iter().collect();

    if !selection.setups.is_empty() {
        let mut unresolved: Vec<&String> = Vec::new();
        for name in &selection.setups {
            if !setups.selected().contains(name) && !unresolved.contains(&name) {
                unresolved.push(name);
            }
        }

        if !unresolved.is_empty() {
            for name in unresolved {
                let diagnostic = Diagnostic::UnresolvedSetup { name: name.clone() };
                diagnostic.emit();
                diagnostics.push(diagnostic);
            }
            rows.clear();
        } else if setups.union().is_empty() {
            let diagnostic = Diagnostic::EmptySetupUnion {
                all_failed: setups.all_failed(),
            };
            diagnostic.emit();
            diagnostics.push(diagnostic);
        }
        rows.retain(|s| setups.admits(&s.name));
        tracing::debug!(remaining = rows.len(), "Applied setup filter");
    }

    rows.retain(|s| {
        selection.matches_market(s)
            && selection.tax.matches(s)
            && selection.matches_styles(s)
            && selection.sector.matches(s)
    });

    tracing::debug!(
        universe = universe.len(),
        filtered = rows.len(),
        "Applied filters"
    );

    FilteredView {
        rows,
        universe_size: universe.len(),
        selection: selection.clone(),
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use screener_data::{
        ALL_SECTORS, Catalog, CatalogOrigin, ScreenerSetup, SetupResults, StyleTag, TaxFilter,
        UniverseSchema,
    };

    fn security(name: &str, market: &str, sector: Option<&str>) -> Security {
        let mut security = Security::new(market, name, &name[..3].to_uppercase());
        security.sector = sector.map(str::to_string);
        security
    }

    fn universe() -> Universe {
        let mut acme = security("Acme", "Paris", Some("Technology"));
        acme.pea_eligible = true;
        acme.style_tags = acme.style_tags.with(StyleTag::Growth);

        let mut beta = security("Beta", "Xetra", Some("Energy"));
        beta.style_tags = beta.style_tags.with(StyleTag::Momentum);

        let mut gamma = security("Gamma", "Paris", None);
        gamma.pea_eligible = true;
        gamma.pea_pme_eligible = true;
        gamma.style_tags = gamma
            .style_tags
            .with(StyleTag::Value)
            .with(StyleTag::Growth);

        Universe::from_securities(vec![acme, beta, gamma], UniverseSchema::complete())
    }

    fn catalog() -> Catalog {
        Catalog::from_setups(
            vec![
                ScreenerSetup::new("s1", "MomUp", "mom_up.csv", "Momentum up"),
                ScreenerSetup::new("s2", "NewHigh", "new_high.csv", "New high"),
            ],
            CatalogOrigin::Remote,
        )
    }

    fn resolve(selected: &[&str], tables: &[(&str, &str)]) -> SetupResolution {
        let selected: Vec<String> = selected.iter().map(|s| (*s).to_string()).collect();
        SetupResolution::resolve_with(&catalog(), &selected, |name, file| {
            match tables.iter().find(|(setup, _)| *setup == name) {
                Some((_, body)) => SetupResults::parse(name, file, body),
                None => SetupResults::failed(
                    name,
                    file,
                    &screener_data::DataError::NotFound(file.to_string()),
                ),
            }
        })
    }

    fn names(view: &FilteredView<'_>) -> Vec<String> {
        view.iter().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn test_unfiltered_selection_returns_universe() {
        let universe = universe();
        let selection = FilterSelection::new().with_sector(ALL_SECTORS);
        let view = apply_filters(&universe, &SetupResolution::none(), &selection);
        assert_eq!(names(&view), vec!["Acme", "Beta", "Gamma"]);
        assert_eq!(view.universe_size(), 3);
        assert!(view.diagnostics().is_empty());
    }

    #[test]
    fn test_market_filter() {
        let universe = universe();
        let selection = FilterSelection::new().with_market("Paris");
        let view = apply_filters(&universe, &SetupResolution::none(), &selection);
        assert_eq!(names(&view), vec!["Acme", "Gamma"]);
    }

    #[rstest]
    #[case(TaxFilter::Any, &["Acme", "Beta", "Gamma"])]
    #[case(TaxFilter::PeaEligible, &["Acme", "Gamma"])]
    #[case(TaxFilter::PeaIneligible, &["Beta"])]
    #[case(TaxFilter::PeaPmeEligible, &["Gamma"])]
    fn test_tax_filter(#[case] tax: TaxFilter, #[case] expected: &[&str]) {
        let universe = universe();
        let selection = FilterSelection::new().with_tax(tax);
        let view = apply_filters(&universe, &SetupResolution::none(), &selection);
        assert_eq!(names(&view), expected);
    }

    #[test]
    fn test_style_filter_is_any_of() {
        let universe = universe();

        let momentum = FilterSelection::new().with_style(StyleTag::Momentum);
        let view = apply_filters(&universe, &SetupResolution::none(), &momentum);
        assert_eq!(names(&view), vec!["Beta"]);

        let growth_or_momentum = momentum.with_style(StyleTag::Growth);
        let view = apply_filters(&universe, &SetupResolution::none(), &growth_or_momentum);
        assert_eq!(names(&view), vec!["Acme", "Beta", "Gamma"]);
    }

    #[test]
    fn test_sector_filter_excludes_missing_sector() {
        let universe = universe();
        let selection = FilterSelection::new().with_sector("Technology");
        let view = apply_filters(&universe, &SetupResolution::none(), &selection);
        assert_eq!(names(&view), vec!["Acme"]);
    }

    #[test]
    fn test_setup_membership_unions_setups() {
        let universe = universe();
        let tables = [("MomUp", "Name\nBeta\n"), ("NewHigh", "Name\nGamma\nZeta\n")];

        let one = resolve(&["MomUp"], &tables);
        let view = apply_filters(&universe, &one, &FilterSelection::new().with_setup("MomUp"));
        assert_eq!(names(&view), vec!["Beta"]);

        let both = resolve(&["MomUp", "NewHigh"], &tables);
        let selection = FilterSelection::new()
            .with_setup("MomUp")
            .with_setup("NewHigh");
        let view = apply_filters(&universe, &both, &selection);
        assert_eq!(names(&view), vec!["Beta", "Gamma"]);
        assert!(matches!(
            view.diagnostics(),
            [
                Diagnostic::SetupResult { .. },
                Diagnostic::SetupResult { .. }
            ]
        ));
    }

    #[test]
    fn test_empty_union_fails_closed() {
        let universe = universe();
        let selection = FilterSelection::new().with_setup("MomUp");

        let failed = resolve(&["MomUp"], &[]);
        let view = apply_filters(&universe, &failed, &selection);
        assert!(view.is_empty());
        assert_eq!(
            view.diagnostics().last(),
            Some(&Diagnostic::EmptySetupUnion { all_failed: true })
        );

        let no_matches = resolve(&["MomUp"], &[("MomUp", "Name;Close\n")]);
        let view = apply_filters(&universe, &no_matches, &selection);
        assert!(view.is_empty());
        assert_eq!(
            view.diagnostics().last(),
            Some(&Diagnostic::EmptySetupUnion { all_failed: false })
        );
    }

    #[test]
    fn test_selected_setup_missing_from_resolution_rejects_all() {
        let universe = universe();
        let selection = FilterSelection::new().with_setup("MomUp");

        let view = apply_filters(&universe, &SetupResolution::none(), &selection);
        assert!(view.is_empty());
        assert_eq!(
            view.diagnostics(),
            [Diagnostic::UnresolvedSetup {
                name: "MomUp".to_string()
            }]
        );

        let other = resolve(&["NewHigh"], &[("NewHigh", "Name\nAcme\n")]);
        let selection = selection.with_setup("NewHigh").with_setup("MomUp");
        let view = apply_filters(&universe, &other, &selection);
        assert!(view.is_empty());
        assert_eq!(
            view.diagnostics().last(),
            Some(&Diagnostic::UnresolvedSetup {
                name: "MomUp".to_string()
            })
        );
        let unresolved = view
            .diagnostics()
            .iter()
            .filter(|d| matches!(d, Diagnostic::UnresolvedSetup { .. }))
            .count();
        assert_eq!(unresolved, 1);
    }

    #[test]
    fn test_axes_conjoin() {
        let universe = universe();
        let tables = [("MomUp", "Name\nAcme\nBeta\nGamma\n")];
        let resolution = resolve(&["MomUp"], &tables);
        let selection = FilterSelection::new()
            .with_setup("MomUp")
            .with_market("Paris")
            .with_tax(TaxFilter::PeaEligible)
            .with_style(StyleTag::Value);

        let view = apply_filters(&universe, &resolution, &selection);
        assert_eq!(names(&view), vec!["Gamma"]);
        assert_eq!(view.selection(), &selection);
    }
}
