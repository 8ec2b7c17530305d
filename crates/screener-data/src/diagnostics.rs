//! Non-fatal events reported alongside loaded data.
//!
//! Loaders and the filter engine absorb recoverable failures instead of
//! returning errors. Each absorbed failure becomes a [`Diagnostic`] so callers
//! can tell "zero matches" apart from "could not check". Every diagnostic is
//! also emitted through `tracing` at the point it is recorded.

use crate::setup_results::SetupOutcome;
use std::fmt;

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational, nothing was lost.
    Info,
    /// Something was skipped, dropped or degraded.
    Warning,
}

/// A non-fatal event observed while loading or filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A malformed table row was skipped.
    SkippedRow {
        /// Resource the row belongs to.
        resource: String,
        /// 1-based line number in the source text.
        line: u64,
        /// Why the row was rejected.
        reason: String,
    },

    /// Universe rows dropped because a required field was missing.
    DroppedSecurities {
        /// Source column of the missing field.
        field: &'static str,
        /// Number of rows dropped for this reason.
        count: usize,
    },

    /// The remote catalog was unusable and the built-in one is in use.
    CatalogFallback {
        /// Failure that triggered the fallback.
        reason: String,
    },

    /// A catalog entry could not be used.
    CatalogEntrySkipped {
        /// Catalog key of the entry.
        id: String,
        /// Why it was skipped.
        reason: String,
    },

    /// Two catalog entries share a display name; only the first resolves.
    DuplicateSetupName {
        /// The shared name.
        name: String,
        /// Id of the entry that lookups resolve to.
        kept_id: String,
        /// Id of the shadowed entry.
        shadowed_id: String,
    },

    /// Outcome of loading one setup's result table.
    SetupResult {
        /// Setup display name.
        setup: String,
        /// What happened.
        outcome: SetupOutcome,
    },

    /// A selected setup name is not in the catalog.
    UnknownSetup {
        /// The selected name.
        name: String,
    },

    /// A selected setup has no result file to fetch.
    SetupWithoutSource {
        /// The selected name.
        name: String,
    },

    /// A selected setup was missing from the resolution handed to the filter
    /// engine, so every row is rejected.
    UnresolvedSetup {
        /// The selected name.
        name: String,
    },

    /// Setups were selected but together matched nothing, so every row is rejected.
    EmptySetupUnion {
        /// True when no selected setup could be checked at all.
        all_failed: bool,
    },
}

impl Diagnostic {
    /// Severity of this diagnostic.
    pub const fn severity(&self) -> Severity {
        match self {
            Self::SetupResult { outcome, .. } if !outcome.is_failure() => Severity::Info,
            _ => Severity::Warning,
        }
    }

    /// Whether this diagnostic reports a degradation.
    pub const fn is_warning(&self) -> bool {
        matches!(self.severity(), Severity::Warning)
    }

    /// Emit through `tracing` at a level matching the severity.
    pub fn emit(&self) {
        match self.severity() {
            Severity::Info => tracing::info!(diagnostic = %self),
            Severity::Warning => tracing::warn!(diagnostic = %self),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkippedRow {
                resource,
                line,
                reason,
            } => write!(f, "{resource}: skipped line {line}: {reason}"),
            Self::DroppedSecurities { field, count } => {
                write!(f, "dropped {count} securities without {field}")
            }
            Self::CatalogFallback { reason } => {
                write!(f, "setup catalog unavailable ({reason}), using built-in catalog")
            }
            Self::CatalogEntrySkipped { id, reason } => {
                write!(f, "catalog entry {id} skipped: {reason}")
            }
            Self::DuplicateSetupName {
                name,
                kept_id,
                shadowed_id,
            } => write!(
                f,
                "setup name {name:?} used by {kept_id} and {shadowed_id}; {shadowed_id} is ignored"
            ),
            Self::SetupResult { setup, outcome } => write!(f, "{setup}: {outcome}"),
            Self::UnknownSetup { name } => write!(f, "{name}: not in the setup catalog"),
            Self::SetupWithoutSource { name } => write!(f, "{name}: no result file configured"),
            Self::UnresolvedSetup { name } => {
                write!(f, "{name}: selected but not resolved; no security passes")
            }
            Self::EmptySetupUnion { all_failed: true } => {
                write!(f, "no selected setup could be checked; no security passes")
            }
            Self::EmptySetupUnion { all_failed: false } => {
                write!(f, "selected setups matched no security")
            }
        }
    }
}
