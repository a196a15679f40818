//! Report module.
//!
//! Differential per-probe report:
//! - Configurable columns and their layout
//! - Highlight rules for latency and answer differences
//! - Header and row rendering

pub mod columns;
pub mod highlight;
pub mod render;

pub use columns::{Column, ColumnId};
pub use highlight::Highlight;
pub use render::{header_labels, rt_diff, ProbeRow, Report, ReportOptions};
