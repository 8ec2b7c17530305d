//! Wiring between the command line and the screener crates.

pub(crate) mod cache_manager;
pub(crate) mod fetcher;
pub(crate) mod logging;
