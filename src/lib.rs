//! ra-dns-check - compare RIPE Atlas DNS measurement results.
//!
//! This crate provides both a library API and a CLI tool for:
//! - Ingesting Atlas DNS results from files or the Atlas API
//! - Reconciling the probe populations of two result sets
//! - Resolving probe metadata through a local cache
//! - Rendering a per-probe differential report with summary statistics
//!
//! # Library Usage
//!
//! ```ignore
//! use ra_dns_check::{AtlasClient, IngestOptions, Ingestor, reconcile};
//!
//! let api = AtlasClient::new(DEFAULT_API_URL, Duration::from_secs(30))?;
//! let options = IngestOptions::default();
//! let ingestor = Ingestor::new(&api, &options);
//! let a = ingestor.ingest("12016241", 0, 0).await?;
//! let b = ingestor.ingest("12016241", 1, 1_614_556_800).await?;
//! let common = reconcile(&[a, b])?;
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Latest results of a measurement against a result file
//! ra-dns-check 12016241 results.json
//!
//! # One measurement at two points in time
//! ra-dns-check 12016241 --dt1 20210101_0000 --dt2 20210301_0000
//!
//! # Summary only
//! ra-dns-check -u -P a.json b.json
//! ```

pub mod atlas;
pub mod cli;
pub mod config;
pub mod dns;
pub mod error;
pub mod measurement;
pub mod probes;
pub mod report;

// Re-export commonly used types
pub use atlas::{AtlasApi, AtlasClient, MeasurementInfo, DEFAULT_API_URL};
pub use cli::{Cli, DataSource};
pub use config::{ConfigLoader, Settings};
pub use dns::{ProbeId, RawProbeResult};
pub use error::{Error, Result};
pub use measurement::{
    reconcile, write_summary, DnsAnswer, IngestOptions, Ingestor, IpVersion, MeasurementSet,
    Reconciliation, TimeNormalizer,
};
pub use probes::{ProbeCache, ProbeProperties, ProbeResolver};
pub use report::{ColumnId, Report, ReportOptions};
