//! Probe properties module.
//!
//! Static probe metadata (ASN, country, addresses) for the report,
//! resolved from a local JSON cache with per-probe API backfill.

pub mod cache;
pub mod resolver;

pub use cache::ProbeCache;
pub use resolver::{ProbeResolver, ResolveStats};

use crate::measurement::IpVersion;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Marker shown for missing probe metadata.
pub const NO_DATA: &str = "no_data";

/// Missing country code marker, sized to the two-character column.
pub const NO_COUNTRY: &str = "--";

/// Static metadata of one probe.
///
/// Fields beyond the ones the report uses (as found in the bulk archive)
/// are kept in `extra` so rewriting the cache does not lose them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeProperties {
    #[serde(default)]
    pub asn_v4: Option<u32>,
    #[serde(default)]
    pub asn_v6: Option<u32>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub address_v4: Option<String>,
    #[serde(default)]
    pub address_v6: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProbeProperties {
    /// Record used when a probe cannot be resolved anywhere.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// ASN for `version`, or [`NO_DATA`].
    #[must_use]
    pub fn display_asn(&self, version: IpVersion) -> String {
        let asn = match version {
            IpVersion::V4 => self.asn_v4,
            IpVersion::V6 => self.asn_v6,
        };
        asn.map(|asn| asn.to_string())
            .unwrap_or_else(|| NO_DATA.to_string())
    }

    /// Address for `version`, or [`NO_DATA`].
    #[must_use]
    pub fn display_address(&self, version: IpVersion) -> String {
        let address = match version {
            IpVersion::V4 => self.address_v4.as_deref(),
            IpVersion::V6 => self.address_v6.as_deref(),
        };
        address.unwrap_or(NO_DATA).to_string()
    }

    /// Country code, or [`NO_COUNTRY`].
    #[must_use]
    pub fn display_country(&self) -> String {
        self.country_code
            .as_deref()
            .unwrap_or(NO_COUNTRY)
            .to_string()
    }
}
