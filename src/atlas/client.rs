//! RIPE Atlas REST API client.

#![allow(clippy::missing_errors_doc)]

use crate::dns::ProbeId;
use crate::error::{Error, Result};
use crate::probes::ProbeProperties;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Default API endpoint.
pub const DEFAULT_API_URL: &str = "https://atlas.ripe.net/api/v2";

/// Measurement metadata needed by the ingestor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MeasurementInfo {
    /// Measurement id as confirmed by the API.
    pub id: u64,
    /// Seconds between measurement rounds.
    #[serde(default)]
    pub interval: Option<i64>,
    /// Address family (4 or 6).
    #[serde(default)]
    pub af: Option<u8>,
}

/// Remote measurement service.
///
/// Implemented by [`AtlasClient`] over HTTPS; tests provide in-memory
/// fakes. Calls are awaited one at a time, never concurrently.
#[allow(async_fn_in_trait)]
pub trait AtlasApi {
    /// Fetch measurement metadata.
    async fn measurement(&self, msm_id: u64) -> Result<MeasurementInfo>;

    /// Fetch the latest result of every probe.
    async fn latest_results(&self, msm_id: u64) -> Result<Vec<Value>>;

    /// Fetch results created within `[start, stop]` (unix seconds).
    async fn results(&self, msm_id: u64, start: i64, stop: i64) -> Result<Vec<Value>>;

    /// Fetch metadata of a single probe.
    async fn probe(&self, probe_id: ProbeId) -> Result<ProbeProperties>;
}

/// HTTPS client for the Atlas API.
pub struct AtlasClient {
    http: reqwest::Client,
    base_url: String,
}

impl AtlasClient {
    /// Create a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ra-dns-check/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// GET `path` below the base URL and decode the JSON body.
    ///
    /// Transport failures, non-2xx statuses and undecodable bodies are all
    /// reported as [`Error::RemoteRequestFailed`] naming `what`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!("GET {url} {query:?}");

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                tracing::debug!("request to {url} failed: {e}");
                Error::RemoteRequestFailed(what.to_string())
            })?;

        if !response.status().is_success() {
            tracing::debug!("{url} answered {}", response.status());
            return Err(Error::RemoteRequestFailed(what.to_string()));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::debug!("cannot decode body of {url}: {e}");
            Error::RemoteRequestFailed(what.to_string())
        })
    }
}

impl AtlasApi for AtlasClient {
    async fn measurement(&self, msm_id: u64) -> Result<MeasurementInfo> {
        self.get_json(
            &format!("/measurements/{msm_id}/"),
            &[],
            &format!("measurement {msm_id}"),
        )
        .await
    }

    async fn latest_results(&self, msm_id: u64) -> Result<Vec<Value>> {
        self.get_json(
            &format!("/measurements/{msm_id}/latest/"),
            &[("format", "json".to_string())],
            &format!("latest results of {msm_id}"),
        )
        .await
    }

    async fn results(&self, msm_id: u64, start: i64, stop: i64) -> Result<Vec<Value>> {
        self.get_json(
            &format!("/measurements/{msm_id}/results/"),
            &[
                ("start", start.to_string()),
                ("stop", stop.to_string()),
                ("format", "json".to_string()),
            ],
            &format!("results of {msm_id} ({start}-{stop})"),
        )
        .await
    }

    async fn probe(&self, probe_id: ProbeId) -> Result<ProbeProperties> {
        self.get_json(
            &format!("/probes/{probe_id}/"),
            &[],
            &format!("probe {probe_id}"),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = AtlasClient::new("https://example.net/api/v2/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "https://example.net/api/v2");
    }

    #[test]
    fn test_measurement_info_decode() {
        let info: MeasurementInfo = serde_json::from_str(
            r#"{"id": 10001, "interval": 240, "af": 6, "type": "dns", "description": "k-root"}"#,
        )
        .unwrap();
        assert_eq!(
            info,
            MeasurementInfo {
                id: 10001,
                interval: Some(240),
                af: Some(6),
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_remote_failure() {
        let client = AtlasClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let err = client.latest_results(10001).await.unwrap_err();
        assert!(matches!(err, Error::RemoteRequestFailed(_)));
        assert_eq!(err.exit_code(), 11);
    }
}
