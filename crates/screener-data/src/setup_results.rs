//! Per-setup result tables.
//!
//! A setup's result table lists the securities it matched in a `Name` (or
//! `name`) column. Loading never fails: every failure becomes an empty name
//! set plus a [`SetupOutcome`] saying what went wrong.

use crate::config::SourceConfig;
use crate::diagnostics::Diagnostic;
use crate::error::DataError;
use crate::fetch::Fetcher;
use crate::table::Table;
use std::collections::HashSet;
use std::fmt;

/// Accepted spellings of the name column, in priority order.
pub const NAME_COLUMNS: [&str; 2] = ["Name", "name"];

/// How loading one setup's results went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    /// The table listed at least one security.
    Matched {
        /// Distinct names listed.
        count: usize,
    },
    /// The table was read and lists no security.
    NoMatches,
    /// The table was read but has no name column.
    MissingNameColumn {
        /// Columns that were present.
        columns: Vec<String>,
    },
    /// The table could not be retrieved.
    FetchFailed {
        /// Underlying failure.
        reason: String,
    },
    /// The table was retrieved but could not be parsed.
    Unreadable {
        /// Underlying failure.
        reason: String,
    },
}

impl SetupOutcome {
    /// Whether the setup could not be checked at all.
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingNameColumn { .. } | Self::FetchFailed { .. } | Self::Unreadable { .. }
        )
    }
}

impl fmt::Display for SetupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched { count } => write!(f, "{count} securities found"),
            Self::NoMatches => f.write_str("no security found"),
            Self::MissingNameColumn { columns } => {
                write!(f, "no Name column (columns: {})", columns.join(", "))
            }
            Self::FetchFailed { reason } => write!(f, "fetch failed: {reason}"),
            Self::Unreadable { reason } => write!(f, "unreadable result table: {reason}"),
        }
    }
}

/// Security names matched by one setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupResults {
    setup: String,
    source_file: String,
    names: HashSet<String>,
    outcome: SetupOutcome,
    skipped_rows: Vec<Diagnostic>,
}

impl SetupResults {
    /// Results that could not be obtained.
    pub fn failed(
        setup: impl Into<String>,
        source_file: impl Into<String>,
        error: &DataError,
    ) -> Self {
        let reason = error.to_string();
        let outcome = if error.is_fetch_failure() {
            SetupOutcome::FetchFailed { reason }
        } else {
            SetupOutcome::Unreadable { reason }
        };
        Self {
            setup: setup.into(),
            source_file: source_file.into(),
            names: HashSet::new(),
            outcome,
            skipped_rows: Vec::new(),
        }
    }

    /// Parse a result table body.
    pub fn parse(setup: impl Into<String>, source_file: impl Into<String>, text: &str) -> Self {
        let setup = setup.into();
        let source_file = source_file.into();

        let table = match Table::parse(source_file.clone(), text) {
            Ok(table) => table,
            Err(e) => return Self::failed(setup, source_file, &e),
        };

        tracing::debug!(%setup, columns = ?table.headers(), "Result table columns");

        let Some(column) = table.column_any(&NAME_COLUMNS) else {
            return Self {
                outcome: SetupOutcome::MissingNameColumn {
                    columns: table.headers().to_vec(),
                },
                setup,
                source_file,
                names: HashSet::new(),
                skipped_rows: table.into_diagnostics(),
            };
        };

        let names: HashSet<String> = table
            .rows()
            .iter()
            .filter_map(|row| row.get(column))
            .map(str::to_string)
            .collect();

        let outcome = if names.is_empty() {
            SetupOutcome::NoMatches
        } else {
            SetupOutcome::Matched { count: names.len() }
        };

        Self {
            setup,
            source_file,
            names,
            outcome,
            skipped_rows: table.into_diagnostics(),
        }
    }

    /// Setup display name.
    pub fn setup(&self) -> &str {
        &self.setup
    }

    /// Result file the names were read from.
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// Matched security names.
    pub const fn names(&self) -> &HashSet<String> {
        &self.names
    }

    /// How loading went.
    pub const fn outcome(&self) -> &SetupOutcome {
        &self.outcome
    }

    /// Whether the outcome counts as "could not check".
    pub const fn is_failure(&self) -> bool {
        self.outcome.is_failure()
    }

    /// The outcome as a diagnostic.
    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::SetupResult {
            setup: self.setup.clone(),
            outcome: self.outcome.clone(),
        }
    }

    /// Rows of the result table that were skipped as malformed.
    pub fn skipped_rows(&self) -> &[Diagnostic] {
        &self.skipped_rows
    }
}

/// Fetch and parse the result table of one setup.
///
/// Never fails; the outcome is logged and recorded on the returned value.
pub async fn load_setup_results<F: Fetcher>(
    fetcher: &F,
    sources: &SourceConfig,
    setup_name: &str,
    source_file: &str,
) -> SetupResults {
    let location = sources.result_location(source_file);
    let results = match fetcher.fetch_text(&location).await {
        Ok(text) => SetupResults::parse(setup_name, source_file, &text),
        Err(e) => SetupResults::failed(setup_name, source_file, &e),
    };

    results.diagnostic().emit();
    results
}
