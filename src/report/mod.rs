//! Report derivation and the chart model built from it.

pub mod chart;
pub mod deriver;

pub use chart::ChartSpec;
pub use deriver::{ReportResult, derive_report};
