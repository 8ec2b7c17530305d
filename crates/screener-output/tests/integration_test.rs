//! Integration tests for screen statistics and reports.

use approx::assert_relative_eq;
use screener_data::{FilterSelection, Security, StyleTag, TaxFilter, Universe};
use screener_output::{ScreenReport, ScreenStats, active_filters, security_frame};

const UNIVERSE: &str = "\
Market;Name;Symbol;PEA;Sector;grow;mom;value
Paris;Acme;ACM;true;Technology;X;X;
Paris;Beta;BTA;false;Energy;;;X
Xetra;Gamma;GMA;true;Technology;X;X;
Milan;Delta;DLT;false;;;;X
";

fn universe() -> Universe {
    Universe::parse("universe.csv", UNIVERSE).unwrap()
}

#[test]
fn test_full_stats_workflow() {
    let universe = universe();
    let rows: Vec<&Security> = universe
        .securities()
        .iter()
        .filter(|s| s.market != "Milan")
        .collect();

    let stats = ScreenStats::compute(&universe, &rows);

    assert_eq!(stats.summary.universe_size, 4);
    assert_eq!(stats.summary.filtered, 3);
    assert_eq!(stats.summary.delta, -1);
    assert_eq!(stats.summary.pea_eligible, 2);
    assert_eq!(stats.summary.markets, 2);

    assert_eq!(stats.markets.entries()[0].value, "Paris");
    assert_eq!(stats.sectors.entries()[0].value, "Technology");
    assert_eq!(stats.sectors.entries()[0].count, 2);

    let pea = stats.pea.unwrap();
    assert_eq!((pea.eligible, pea.ineligible), (2, 1));
    assert!(stats.pea_pme.is_none());

    let styles: Vec<StyleTag> = stats.styles.iter().map(|c| c.style).collect();
    assert_eq!(styles, vec![StyleTag::Growth, StyleTag::Momentum, StyleTag::Value]);

    let corr = stats.correlation.unwrap();
    assert_relative_eq!(corr.get(StyleTag::Growth, StyleTag::Momentum).unwrap(), 1.0);
    assert_relative_eq!(corr.get(StyleTag::Growth, StyleTag::Value).unwrap(), -1.0);
}

#[test]
fn test_report_and_frame_agree() {
    let universe = universe();
    let selection = FilterSelection::new()
        .with_tax(TaxFilter::PeaEligible)
        .with_style(StyleTag::Growth);
    let rows: Vec<&Security> = universe
        .securities()
        .iter()
        .filter(|s| selection.tax.matches(s) && selection.matches_styles(s))
        .collect();

    let report = ScreenReport::new(&universe, &selection, &rows);
    assert_eq!(report.filters, active_filters(&selection));
    assert_eq!(report.filters, vec!["PEA: PEA eligible", "Styles: grow"]);

    let df = security_frame(&rows, &universe.available_styles()).unwrap();
    assert_eq!(df.height(), report.securities.len());
    assert!(report.to_json().unwrap().contains("\"Gamma\""));
}
