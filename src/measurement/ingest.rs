//! Result ingestion.
//!
//! Turns a data source (local result file or 8-digit measurement id) into
//! a [`MeasurementSet`]: results are fetched, filtered through the
//! exclusion list, classified and reduced into counters, sorted samples
//! and per-probe metrics.

use crate::atlas::AtlasApi;
use crate::dns::{DnsResponse, ProbeId, RawProbeResult, ResultStatus};
use crate::error::{Error, Result};
use crate::measurement::types::{DnsAnswer, IpVersion, MeasurementSet, ProbeMetric};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

/// Seconds cut from the end of a measurement interval when requesting a
/// window, so the next round is not picked up.
const WINDOW_MARGIN_SECS: i64 = 300;

/// Delimiter value that disables splitting of the answer text.
pub const NO_SPLIT: &str = "!";

/// Knobs of the ingestion pass.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Responses slower than this (ms) are counted as slow.
    pub slow_threshold: f64,
    /// Delimiter the answer text is split on; [`NO_SPLIT`] keeps it whole.
    pub split_char: String,
    /// Which split item to keep (0-based).
    pub item_index: usize,
    /// Probes to drop before any counting.
    pub exclusions: BTreeSet<ProbeId>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            slow_threshold: 50.0,
            split_char: ".".to_string(),
            item_index: 1,
            exclusions: BTreeSet::new(),
        }
    }
}

impl IngestOptions {
    /// Extract the configured substring from an answer text.
    ///
    /// Falls back to the whole text when the selected item does not exist.
    #[must_use]
    pub fn substring(&self, text: &str) -> String {
        if self.split_char.is_empty() || self.split_char == NO_SPLIT {
            return text.to_string();
        }
        text.split(self.split_char.as_str())
            .nth(self.item_index)
            .unwrap_or(text)
            .to_string()
    }

    fn answer(&self, response: &DnsResponse) -> DnsAnswer {
        match &response.abuf {
            None => DnsAnswer::NoData,
            Some(abuf) if abuf.is_malformed() => DnsAnswer::NoData,
            Some(abuf) => match abuf.answers().first().and_then(|a| a.data.first()) {
                Some(text) => DnsAnswer::Substring(self.substring(text)),
                None => DnsAnswer::NoReply,
            },
        }
    }
}

/// Whether `source` looks like an Atlas measurement id.
#[must_use]
pub fn is_measurement_id(source: &str) -> bool {
    source.len() == 8 && source.bytes().all(|b| b.is_ascii_digit())
}

/// Reduce raw result objects into a measurement set.
///
/// `ip_version` and `measurement_id` are left as found in the results;
/// callers with API metadata override them afterwards.
#[must_use]
pub fn aggregate(
    results: &[Value],
    result_set_id: usize,
    source: &str,
    options: &IngestOptions,
) -> MeasurementSet {
    let mut set = MeasurementSet::new(result_set_id, source);
    let mut af = None;

    for value in results {
        let raw = RawProbeResult::from_value(value);

        if let Some(probe_id) = raw.probe_id {
            if options.exclusions.contains(&probe_id) {
                tracing::debug!("set {result_set_id}: skipping excluded probe {probe_id}");
                continue;
            }
            set.probe_ids.insert(probe_id);
        }

        match raw.status {
            ResultStatus::Malformed => {
                set.malformed += 1;
                continue;
            }
            ResultStatus::Error => {
                set.errors += 1;
                continue;
            }
            ResultStatus::Ok => {}
        }

        set.total_responses += 1;
        set.measurement_id = raw.measurement_id.or(set.measurement_id);
        af = af.or(raw.af);

        set.abuf_malformed += raw
            .responses
            .iter()
            .take(2)
            .filter(|response| response.abuf_malformed())
            .count();

        let (Some(probe_id), Some(primary)) = (raw.probe_id, raw.primary()) else {
            continue;
        };
        let Some(response_time) = primary.response_time else {
            continue;
        };

        set.response_times.push(response_time);
        set.timestamps.push(raw.created);
        if response_time > options.slow_threshold {
            set.slow += 1;
        }

        set.metrics.insert(
            probe_id,
            ProbeMetric {
                response_time,
                answer: options.answer(primary),
            },
        );
    }

    set.response_times.sort_by(f64::total_cmp);
    set.timestamps.sort_unstable();
    set.ip_version = af.map(IpVersion::from_af).unwrap_or_default();
    set
}

/// Loads data sources into measurement sets.
pub struct Ingestor<'a, A> {
    api: &'a A,
    options: &'a IngestOptions,
}

impl<'a, A: AtlasApi> Ingestor<'a, A> {
    /// Create an ingestor fetching remote results through `api`.
    #[must_use]
    pub fn new(api: &'a A, options: &'a IngestOptions) -> Self {
        Self { api, options }
    }

    /// Ingest `source` as result set `result_set_id`.
    ///
    /// A readable JSON result file wins; otherwise an 8-digit `source` is
    /// fetched from the API: the latest results when `start_epoch` is 0,
    /// else one measurement interval starting at `start_epoch`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataSourceUnavailable`] when `source` is neither a
    /// readable result file nor a measurement id, and
    /// [`Error::RemoteRequestFailed`] when the API request fails.
    pub async fn ingest(
        &self,
        source: &str,
        result_set_id: usize,
        start_epoch: i64,
    ) -> Result<MeasurementSet> {
        match read_result_file(source) {
            Ok(results) => {
                if start_epoch != 0 {
                    tracing::warn!(
                        "{source}: time ranges are not applied to local files, using all results"
                    );
                }
                tracing::debug!("{source}: {} results from file", results.len());
                Ok(aggregate(&results, result_set_id, source, self.options))
            }
            Err(e) => {
                tracing::debug!("{source} is not a readable result file: {e}");
                if !is_measurement_id(source) {
                    return Err(Error::DataSourceUnavailable(source.to_string()));
                }
                self.ingest_remote(source, result_set_id, start_epoch).await
            }
        }
    }

    async fn ingest_remote(
        &self,
        source: &str,
        result_set_id: usize,
        start_epoch: i64,
    ) -> Result<MeasurementSet> {
        let msm_id: u64 = source
            .parse()
            .map_err(|_| Error::DataSourceUnavailable(source.to_string()))?;
        let info = self.api.measurement(msm_id).await?;

        let results = if start_epoch == 0 {
            tracing::debug!("fetching latest results of {msm_id}");
            self.api.latest_results(msm_id).await?
        } else {
            let interval = info.interval.unwrap_or(WINDOW_MARGIN_SECS * 2);
            let stop = start_epoch + interval - WINDOW_MARGIN_SECS;
            tracing::debug!("fetching results of {msm_id} for {start_epoch}..{stop}");
            self.api.results(msm_id, start_epoch, stop).await?
        };

        let mut set = aggregate(&results, result_set_id, source, self.options);
        set.measurement_id = Some(info.id);
        if let Some(af) = info.af {
            set.ip_version = IpVersion::from_af(af);
        }
        Ok(set)
    }
}

fn read_result_file(source: &str) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(Path::new(source))?;
    Ok(serde_json::from_str(&content)?)
}
