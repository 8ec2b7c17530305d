//! DataFrame hand-off for presentation layers.

use crate::error::Result;
use polars::prelude::*;
use screener_data::{Security, StyleTag};

/// Column holding the derived chart link.
pub const CHART_URL: &str = "Chart URL";

/// Build a frame of `rows`, one row per security in the given order.
///
/// Columns use the source names (`Market`, `Name`, `Symbol`, `PEA`,
/// `PEA-PME`, `Sector`, `Industry`, `ZB URL`), followed by the derived chart
/// link and one boolean column per entry of `styles`.
pub fn security_frame(rows: &[&Security], styles: &[StyleTag]) -> Result<DataFrame> {
    let markets: Vec<&str> = rows.iter().map(|s| s.market.as_str()).collect();
    let names: Vec<&str> = rows.iter().map(|s| s.name.as_str()).collect();
    let symbols: Vec<&str> = rows.iter().map(|s| s.symbol.as_str()).collect();
    let pea: Vec<bool> = rows.iter().map(|s| s.pea_eligible).collect();
    let pea_pme: Vec<bool> = rows.iter().map(|s| s.pea_pme_eligible).collect();
    let sectors: Vec<Option<&str>> = rows.iter().map(|s| s.sector.as_deref()).collect();
    let industries: Vec<Option<&str>> = rows.iter().map(|s| s.industry.as_deref()).collect();
    let detail_urls: Vec<Option<&str>> = rows.iter().map(|s| s.detail_url.as_deref()).collect();
    let chart_urls: Vec<Option<String>> = rows.iter().map(|s| s.chart_url()).collect();

    let mut columns: Vec<Column> = vec![
        Series::new("Market".into(), markets).into(),
        Series::new("Name".into(), names).into(),
        Series::new("Symbol".into(), symbols).into(),
        Series::new("PEA".into(), pea).into(),
        Series::new("PEA-PME".into(), pea_pme).into(),
        Series::new("Sector".into(), sectors).into(),
        Series::new("Industry".into(), industries).into(),
        Series::new("ZB URL".into(), detail_urls).into(),
        Series::new(CHART_URL.into(), chart_urls).into(),
    ];

    for &style in styles {
        let flags: Vec<bool> = rows.iter().map(|s| s.has_style(style)).collect();
        columns.push(Series::new(style.column().into(), flags).into());
    }

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_shape_and_columns() {
        let mut acme = Security::new("Paris", "Acme", "ACM");
        acme.detail_url = Some("https://zb/acme/".to_string());
        acme.style_tags = acme.style_tags.with(StyleTag::Momentum);
        let beta = Security::new("Xetra", "Beta", "BTA");

        let df = security_frame(&[&acme, &beta], &[StyleTag::Momentum, StyleTag::Value]).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 11);
        assert_eq!(
            df.column("mom").unwrap().bool().unwrap().get(0),
            Some(true)
        );
        assert_eq!(
            df.column(CHART_URL).unwrap().str().unwrap().get(0),
            Some("https://zb/acme/graphiques/")
        );
        assert_eq!(df.column("Sector").unwrap().null_count(), 2);
    }

    #[test]
    fn test_empty_frame() {
        let df = security_frame(&[], &[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 9);
    }
}
