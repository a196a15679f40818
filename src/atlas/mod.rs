//! Remote measurement service.
//!
//! Thin transport to the RIPE Atlas API: measurement metadata, result
//! downloads and per-probe metadata lookups.

pub mod client;

pub use client::{AtlasApi, AtlasClient, MeasurementInfo, DEFAULT_API_URL};
