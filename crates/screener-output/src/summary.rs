//! Headline metrics and value-count distributions.
//!
//! Everything here is computed from the securities passing a screen and,
//! where a comparison is needed, the universe they were drawn from.

use screener_data::{Security, Universe};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Number of entries shown in a top-N distribution by default.
pub const DEFAULT_TOP_N: usize = 10;

/// The four headline numbers of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScreenSummary {
    /// Securities in the universe.
    pub universe_size: usize,
    /// Securities passing the screen.
    pub filtered: usize,
    /// `filtered - universe_size`; never positive.
    pub delta: i64,
    /// PEA-eligible securities among those passing.
    pub pea_eligible: usize,
    /// Distinct markets among those passing.
    pub markets: usize,
}

impl ScreenSummary {
    /// Summarize `rows` against a universe of `universe_size` securities.
    pub fn new(universe_size: usize, rows: &[&Security]) -> Self {
        let filtered = rows.len();
        let mut markets: Vec<&str> = rows.iter().map(|s| s.market.as_str()).collect();
        markets.sort_unstable();
        markets.dedup();

        Self {
            universe_size,
            filtered,
            delta: filtered as i64 - universe_size as i64,
            pea_eligible: rows.iter().filter(|s| s.pea_eligible).count(),
            markets: markets.len(),
        }
    }
}

impl fmt::Display for ScreenSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {}  Filtered: {} ({:+})  PEA eligible: {}  Markets: {}",
            self.universe_size, self.filtered, self.delta, self.pea_eligible, self.markets
        )
    }
}

/// A label and how many securities carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    /// Label.
    pub value: String,
    /// Securities carrying it.
    pub count: usize,
}

/// Value counts sorted by descending count, ties broken by label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Distribution {
    entries: Vec<ValueCount>,
}

impl Distribution {
    /// Count the values `key` extracts; securities where it yields `None`
    /// are not counted.
    pub fn of<'a, K>(rows: &[&'a Security], key: K) -> Self
    where
        K: Fn(&'a Security) -> Option<&'a str>,
    {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for &security in rows {
            if let Some(value) = key(security) {
                *counts.entry(value).or_insert(0) += 1;
            }
        }

        let mut entries: Vec<ValueCount> = counts
            .into_iter()
            .map(|(value, count)| ValueCount {
                value: value.to_string(),
                count,
            })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

        Self { entries }
    }

    /// Distribution of markets.
    pub fn markets(rows: &[&Security]) -> Self {
        Self::of(rows, |s| Some(s.market.as_str()))
    }

    /// Distribution of sectors; securities without a sector are left out.
    pub fn sectors(rows: &[&Security]) -> Self {
        Self::of(rows, |s| s.sector.as_deref())
    }

    /// Keep only the `n` largest entries.
    #[must_use]
    pub fn top(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }

    /// Entries, largest first.
    pub fn entries(&self) -> &[ValueCount] {
        &self.entries
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Whether nothing was counted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as an aligned two-column table.
    pub fn to_ascii_table(&self, title: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!("{title}\n"));
        output.push_str(&"-".repeat(40));
        output.push('\n');
        for entry in &self.entries {
            output.push_str(&format!("{:<30} {:>9}\n", entry.value, entry.count));
        }
        output
    }
}

/// How many passing securities are and are not eligible for a tax wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EligibilitySplit {
    /// Eligible securities.
    pub eligible: usize,
    /// Ineligible securities.
    pub ineligible: usize,
}

impl EligibilitySplit {
    fn count(rows: &[&Security], flag: impl Fn(&Security) -> bool) -> Self {
        let eligible = rows.iter().filter(|s| flag(s)).count();
        Self {
            eligible,
            ineligible: rows.len() - eligible,
        }
    }

    /// PEA split, or `None` when the universe has no PEA column.
    pub fn pea(universe: &Universe, rows: &[&Security]) -> Option<Self> {
        universe
            .schema()
            .pea
            .then(|| Self::count(rows, |s| s.pea_eligible))
    }

    /// PEA-PME split, or `None` when the universe has no PEA-PME column.
    pub fn pea_pme(universe: &Universe, rows: &[&Security]) -> Option<Self> {
        universe
            .schema()
            .pea_pme
            .then(|| Self::count(rows, |s| s.pea_pme_eligible))
    }
}
