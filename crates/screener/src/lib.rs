#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod filter;
pub mod session;
pub mod setups;

// Re-export main types from sub-crates
pub use screener_data as data;
pub use screener_output as output;

pub use filter::{FilteredView, apply_filters};
pub use screener_data::{FilterSelection, SectorSelection, StyleTag, TaxFilter};
pub use session::{Session, SessionConfig, SessionError};
pub use setups::{SetupMemo, SetupResolution, resolve_setups};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
