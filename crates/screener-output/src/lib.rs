#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod frame;
pub mod report;
pub mod styles;
pub mod summary;

pub use error::{Result, SummaryError};
pub use frame::security_frame;
pub use report::{ScreenReport, ScreenStats, active_filters};
pub use styles::{StyleCorrelation, StyleCount, style_counts};
pub use summary::{DEFAULT_TOP_N, Distribution, EligibilitySplit, ScreenSummary, ValueCount};
