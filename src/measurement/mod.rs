//! Measurement module.
//!
//! This module provides the aggregation side of the tool:
//! - Date-time normalization for result windows
//! - Ingestion of result files and remote measurements
//! - Probe population reconciliation between two sets
//! - Summary statistics

pub mod ingest;
pub mod reconcile;
pub mod stats;
pub mod timespec;
pub mod types;

pub use ingest::{aggregate, is_measurement_id, IngestOptions, Ingestor};
pub use reconcile::{reconcile, Reconciliation};
pub use stats::{summarize, write_summary, Summary};
pub use timespec::TimeNormalizer;
pub use types::*;
