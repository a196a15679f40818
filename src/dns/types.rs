//! Raw Atlas DNS result types.
//!
//! A RIPE Atlas DNS result is a JSON object per probe and measurement
//! round. Depending on the measurement it carries a single `result`
//! object or a `resultset` array (one entry per resolver the probe
//! queried). [`RawProbeResult::from_value`] reduces either shape to one
//! immutable record the ingestor can classify.

use crate::dns::abuf::AnswerBuffer;
use serde::Deserialize;
use serde_json::Value;

/// Probe identifier as issued by RIPE Atlas.
pub type ProbeId = u32;

/// Classification of a raw result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    /// Usable result.
    Ok,
    /// The result object does not have the expected structure.
    Malformed,
    /// The probe reported an error instead of a response.
    Error,
}

/// One DNS sub-response of a result.
#[derive(Debug, Clone, PartialEq)]
pub struct DnsResponse {
    /// Response time in milliseconds.
    pub response_time: Option<f64>,
    /// Decoded answer buffer; `None` when the probe sent no abuf.
    pub abuf: Option<AnswerBuffer>,
}

impl DnsResponse {
    /// Sub-response that produced nothing usable (errored entry).
    pub const EMPTY: Self = Self {
        response_time: None,
        abuf: None,
    };

    /// Whether the answer buffer is present but undecodable.
    #[must_use]
    pub fn abuf_malformed(&self) -> bool {
        self.abuf.as_ref().is_some_and(AnswerBuffer::is_malformed)
    }
}

/// One decoded Atlas DNS result.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProbeResult {
    /// Reporting probe, absent only on malformed results.
    pub probe_id: Option<ProbeId>,
    /// Measurement the result belongs to.
    pub measurement_id: Option<u64>,
    /// Creation time (unix seconds).
    pub created: i64,
    /// Address family of the query (4 or 6).
    pub af: Option<u8>,
    /// Classification.
    pub status: ResultStatus,
    /// Sub-responses in the order reported.
    pub responses: Vec<DnsResponse>,
}

#[derive(Debug, Deserialize)]
struct WireResult {
    prb_id: Option<ProbeId>,
    msm_id: Option<u64>,
    #[serde(default)]
    timestamp: i64,
    af: Option<u8>,
    error: Option<Value>,
    result: Option<WireResponse>,
    resultset: Option<Vec<WireSetEntry>>,
}

#[derive(Debug, Deserialize)]
struct WireSetEntry {
    af: Option<u8>,
    error: Option<Value>,
    result: Option<WireResponse>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    rt: Option<f64>,
    abuf: Option<String>,
}

impl From<WireResponse> for DnsResponse {
    fn from(wire: WireResponse) -> Self {
        Self {
            response_time: wire.rt,
            abuf: wire.abuf.as_deref().map(AnswerBuffer::decode),
        }
    }
}

impl RawProbeResult {
    /// Decode one result object.
    ///
    /// Never fails: anything that does not look like an Atlas DNS result
    /// comes back with [`ResultStatus::Malformed`].
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let wire = match WireResult::deserialize(value) {
            Ok(wire) => wire,
            Err(e) => {
                tracing::debug!("malformed result: {e}");
                return Self::malformed(value);
            }
        };

        let has_payload = wire.result.is_some() || wire.resultset.is_some();
        if wire.prb_id.is_none()
            || wire.msm_id.is_none()
            || (!has_payload && wire.error.is_none())
        {
            return Self::malformed(value);
        }

        let mut af = wire.af;
        let mut responses = Vec::new();
        let mut all_entries_failed = false;

        if let Some(result) = wire.result {
            responses.push(result.into());
        } else if let Some(entries) = wire.resultset {
            all_entries_failed =
                !entries.is_empty() && entries.iter().all(|entry| entry.error.is_some());
            for entry in entries {
                af = af.or(entry.af);
                // one response per entry so index 0 stays the first resolver
                responses.push(entry.result.map_or(DnsResponse::EMPTY, DnsResponse::from));
            }
        }

        let status = if wire.error.is_some() || all_entries_failed {
            ResultStatus::Error
        } else {
            ResultStatus::Ok
        };

        Self {
            probe_id: wire.prb_id,
            measurement_id: wire.msm_id,
            created: wire.timestamp,
            af,
            status,
            responses,
        }
    }

    fn malformed(value: &Value) -> Self {
        Self {
            probe_id: value
                .get("prb_id")
                .and_then(Value::as_u64)
                .and_then(|id| ProbeId::try_from(id).ok()),
            measurement_id: value.get("msm_id").and_then(Value::as_u64),
            created: value.get("timestamp").and_then(Value::as_i64).unwrap_or(0),
            af: None,
            status: ResultStatus::Malformed,
            responses: Vec::new(),
        }
    }

    /// The first sub-response, if it carries a response time.
    #[must_use]
    pub fn primary(&self) -> Option<&DnsResponse> {
        self.responses
            .first()
            .filter(|response| response.response_time.is_some())
    }
}
