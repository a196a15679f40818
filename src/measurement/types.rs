//! Measurement set types.

use crate::dns::ProbeId;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// IP address family a measurement ran over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IpVersion {
    /// IPv4 (default)
    #[default]
    V4,
    /// IPv6
    V6,
}

impl IpVersion {
    /// Map an Atlas `af` value; anything but 6 is treated as IPv4.
    #[must_use]
    pub fn from_af(af: u8) -> Self {
        if af == 6 {
            Self::V6
        } else {
            Self::V4
        }
    }

    /// Column width needed for an address of this family.
    #[must_use]
    pub fn address_width(self) -> usize {
        match self {
            Self::V4 => 15,
            Self::V6 => 39,
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => write!(f, "IPv4"),
            Self::V6 => write!(f, "IPv6"),
        }
    }
}

/// DNS answer text of one probe in one result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsAnswer {
    /// Selected substring of the first answer.
    Substring(String),
    /// Probe is not part of the result set.
    Unknown,
    /// The response carried no answer.
    NoReply,
    /// An answer was expected but could not be decoded.
    NoData,
}

impl fmt::Display for DnsAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Substring(s) => f.write_str(s),
            Self::Unknown => f.write_str("unknown"),
            Self::NoReply => f.write_str("no_reply"),
            Self::NoData => f.write_str("no_data"),
        }
    }
}

/// Per-probe metrics within one result set.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeMetric {
    /// Response time of the primary sub-response (ms).
    pub response_time: f64,
    /// Extracted DNS answer.
    pub answer: DnsAnswer,
}

/// Aggregate of one ingested result set.
///
/// Built once by the ingestor and read-only afterwards. `response_times`
/// and `timestamps` are sorted ascending.
#[derive(Debug, Clone, Default)]
pub struct MeasurementSet {
    /// Position in the comparison (0 or 1).
    pub result_set_id: usize,
    /// File path or measurement id the set was loaded from.
    pub source: String,
    /// Measurement id reported by the results or the API.
    pub measurement_id: Option<u64>,
    /// Address family of the measurement.
    pub ip_version: IpVersion,
    /// Response time samples (ms).
    pub response_times: Vec<f64>,
    /// Creation timestamps of the sampled responses (unix seconds).
    pub timestamps: Vec<i64>,
    /// Well-formed, error-free responses.
    pub total_responses: usize,
    /// Malformed results.
    pub malformed: usize,
    /// Malformed answer buffers (primary and secondary counted separately).
    pub abuf_malformed: usize,
    /// Results reporting an error.
    pub errors: usize,
    /// Responses slower than the slow threshold.
    pub slow: usize,
    /// Distinct probes that reported anything.
    pub probe_ids: BTreeSet<ProbeId>,
    /// Metrics per probe; the last result of a probe wins.
    pub metrics: BTreeMap<ProbeId, ProbeMetric>,
}

impl MeasurementSet {
    /// Create an empty set.
    #[must_use]
    pub fn new(result_set_id: usize, source: impl Into<String>) -> Self {
        Self {
            result_set_id,
            source: source.into(),
            ..Self::default()
        }
    }

    /// Metric of `probe_id`, if it responded in this set.
    #[must_use]
    pub fn metric(&self, probe_id: ProbeId) -> Option<&ProbeMetric> {
        self.metrics.get(&probe_id)
    }

    /// Response time of `probe_id`, `None` when it has no response here.
    #[must_use]
    pub fn response_time(&self, probe_id: ProbeId) -> Option<f64> {
        self.metric(probe_id).map(|m| m.response_time)
    }

    /// DNS answer of `probe_id`, [`DnsAnswer::Unknown`] when absent.
    #[must_use]
    pub fn answer(&self, probe_id: ProbeId) -> DnsAnswer {
        self.metric(probe_id)
            .map(|m| m.answer.clone())
            .unwrap_or(DnsAnswer::Unknown)
    }

    /// Label for headers: the measurement id, else the source.
    #[must_use]
    pub fn label(&self) -> String {
        self.measurement_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| self.source.clone())
    }

    /// Whether no response samples were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.response_times.is_empty()
    }
}
