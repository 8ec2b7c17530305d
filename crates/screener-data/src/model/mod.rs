//! Canonical records produced by ingestion, and the selections that filter them.

pub mod security;
pub mod selection;
pub mod setup;
pub mod style;

pub use security::{Security, parse_marker, parse_truthy};
pub use selection::{ALL_SECTORS, FilterSelection, SectorSelection, TaxFilter, UnknownTaxFilter};
pub use setup::ScreenerSetup;
pub use style::{StyleTag, StyleTags, UnknownStyleTag};
