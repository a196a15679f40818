//! Probe property resolution.
//!
//! Cache first, then a per-probe API lookup, then a placeholder record.
//! A single probe without metadata never aborts the report.

use crate::atlas::AtlasApi;
use crate::dns::ProbeId;
use crate::error::Result;
use crate::probes::cache::ProbeCache;
use crate::probes::ProbeProperties;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Cache statistics of one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Probes found in the cache.
    pub hits: usize,
    /// Probes fetched from the API.
    pub misses: usize,
    /// Probes found nowhere.
    pub failures: usize,
}

/// Resolves probe metadata for the report.
pub struct ProbeResolver<'a, A> {
    api: &'a A,
    cache_path: PathBuf,
}

impl<'a, A: AtlasApi> ProbeResolver<'a, A> {
    /// Create a resolver backed by the cache file at `cache_path`.
    pub fn new(api: &'a A, cache_path: impl AsRef<Path>) -> Self {
        Self {
            api,
            cache_path: cache_path.as_ref().to_path_buf(),
        }
    }

    /// Resolve properties of every probe in `probe_ids`.
    ///
    /// The returned map has an entry for every requested probe. Probes
    /// fetched from the API are merged into the cache, which is rewritten
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::CacheUnavailable`] if the cache cannot be
    /// read, or an I/O error if it cannot be rewritten.
    pub async fn resolve(
        &self,
        probe_ids: &BTreeSet<ProbeId>,
    ) -> Result<(BTreeMap<ProbeId, ProbeProperties>, ResolveStats)> {
        let mut cache = ProbeCache::load(&self.cache_path)?;
        let mut resolved = BTreeMap::new();
        let mut stats = ResolveStats::default();

        for &probe_id in probe_ids {
            if let Some(properties) = cache.get(probe_id) {
                stats.hits += 1;
                resolved.insert(probe_id, properties.clone());
                continue;
            }

            match self.api.probe(probe_id).await {
                Ok(properties) => {
                    stats.misses += 1;
                    cache.insert(probe_id, properties.clone());
                    resolved.insert(probe_id, properties);
                }
                Err(e) => {
                    tracing::debug!("no metadata for probe {probe_id}: {e}");
                    stats.failures += 1;
                    resolved.insert(probe_id, ProbeProperties::placeholder());
                }
            }
        }

        tracing::info!(
            "probe cache hits: {} misses: {} unresolved: {}",
            stats.hits,
            stats.misses,
            stats.failures
        );
        cache.save()?;
        Ok((resolved, stats))
    }
}
