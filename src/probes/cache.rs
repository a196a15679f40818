//! Probe properties cache file.
//!
//! A flat JSON object mapping probe id strings to property objects. It is
//! read fully, merged with newly resolved probes and rewritten fully.
//! Optionally a decompressed bulk probe archive (`{"objects": [...]}`) is
//! folded in whenever it is newer than the cache.

#![allow(clippy::missing_errors_doc)]

use crate::dns::ProbeId;
use crate::error::{Error, Result};
use crate::probes::ProbeProperties;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Bulk probe archive layout.
#[derive(Debug, Deserialize)]
struct ProbeArchive {
    objects: Vec<Value>,
}

/// In-memory copy of the cache file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeCache {
    path: PathBuf,
    entries: BTreeMap<String, ProbeProperties>,
}

impl ProbeCache {
    /// Create the cache file (empty) if it does not exist and fold in the
    /// bulk archive when it is newer than the cache.
    ///
    /// Archive problems are logged and otherwise ignored; the cache file
    /// is the only required piece.
    pub fn prepare(path: &Path, archive: Option<&Path>, archive_max_age: Duration) -> Result<()> {
        let existed = path.exists();
        if !existed {
            tracing::debug!("creating empty probe cache {}", path.display());
            Self {
                path: path.to_path_buf(),
                entries: BTreeMap::new(),
            }
            .save()?;
        }

        let Some(archive) = archive else {
            return Ok(());
        };
        let Some(archive_mtime) = modified(archive) else {
            tracing::warn!("probe archive {} not found", archive.display());
            return Ok(());
        };

        if archive_mtime
            .elapsed()
            .is_ok_and(|age| age > archive_max_age)
        {
            tracing::warn!(
                "probe archive {} is older than {}s, consider refreshing it",
                archive.display(),
                archive_max_age.as_secs()
            );
        }

        // a freshly created cache is older than any archive
        if existed && modified(path).is_some_and(|cache_mtime| cache_mtime >= archive_mtime) {
            return Ok(());
        }

        let mut cache = Self::load(path)?;
        match cache.import_archive(archive) {
            Ok(count) => {
                tracing::info!("imported {count} probes from {}", archive.display());
                cache.save()?;
            }
            Err(e) => tracing::warn!("cannot read probe archive {}: {e}", archive.display()),
        }
        Ok(())
    }

    /// Load the cache file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CacheUnavailable`] if the file is missing,
    /// unreadable or not a JSON object of probe records.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::cache(path.display().to_string(), e))?;
        let entries = serde_json::from_str(&content)
            .map_err(|e| Error::cache(path.display().to_string(), e))?;
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Write the cache back to its file.
    ///
    /// The content goes to a sibling file first and replaces the cache by
    /// rename, so an interrupted write leaves the old cache intact.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, serde_json::to_string(&self.entries)?)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }

    /// Cached properties of `probe_id`.
    #[must_use]
    pub fn get(&self, probe_id: ProbeId) -> Option<&ProbeProperties> {
        self.entries.get(&probe_id.to_string())
    }

    /// Add or replace the properties of `probe_id`.
    pub fn insert(&mut self, probe_id: ProbeId, properties: ProbeProperties) {
        self.entries.insert(probe_id.to_string(), properties);
    }

    /// Number of cached probes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no probes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge the records of a bulk archive, keyed by their `id`.
    ///
    /// Records without an `id` or with undecodable fields are skipped.
    /// Returns the number of imported records.
    pub fn import_archive(&mut self, archive: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(archive)?;
        let archive: ProbeArchive = serde_json::from_str(&content)?;

        let mut imported = 0;
        for object in archive.objects {
            let Some(id) = object.get("id").and_then(Value::as_u64) else {
                continue;
            };
            match serde_json::from_value::<ProbeProperties>(object) {
                Ok(properties) => {
                    self.entries.insert(id.to_string(), properties);
                    imported += 1;
                }
                Err(e) => tracing::debug!("skipping archive record {id}: {e}"),
            }
        }
        Ok(imported)
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(asn: u32, cc: &str) -> ProbeProperties {
        ProbeProperties {
            asn_v4: Some(asn),
            country_code: Some(cc.to_string()),
            address_v4: Some("192.0.2.1".to_string()),
            ..ProbeProperties::default()
        }
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        ProbeCache::prepare(&path, None, Duration::from_secs(60)).unwrap();

        let mut cache = ProbeCache::load(&path).unwrap();
        assert!(cache.is_empty());
        cache.insert(1001, props(3333, "NL"));
        cache.insert(1002, ProbeProperties::placeholder());
        cache.save().unwrap();

        let reloaded = ProbeCache::load(&path).unwrap();
        assert_eq!(reloaded, cache);
        assert_eq!(reloaded.get(1001), Some(&props(3333, "NL")));
    }

    #[test]
    fn test_missing_cache_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProbeCache::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, Error::CacheUnavailable { .. }));
        assert_eq!(err.exit_code(), 13);
    }

    #[test]
    fn test_corrupt_cache_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(
            ProbeCache::load(&path),
            Err(Error::CacheUnavailable { .. })
        ));
    }

    #[test]
    fn test_prepare_imports_newer_archive() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("cache.json");
        let archive_path = dir.path().join("archive.json");

        std::fs::write(&cache_path, r#"{"7": {"asn_v4": 1, "country_code": "DE"}}"#).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        std::fs::write(
            &archive_path,
            r#"{"objects": [
                {"id": 1001, "asn_v4": 3333, "country_code": "NL", "address_v4": "193.0.0.1"},
                {"asn_v4": 1}
            ]}"#,
        )
        .unwrap();

        ProbeCache::prepare(&cache_path, Some(&archive_path), Duration::from_secs(86_400))
            .unwrap();

        let cache = ProbeCache::load(&cache_path).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(1001).unwrap().asn_v4, Some(3333));
        assert_eq!(cache.get(7).unwrap().country_code.as_deref(), Some("DE"));
    }

    #[test]
    fn test_prepare_imports_archive_without_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("cache").join("probes.json");
        let archive_path = dir.path().join("archive.json");
        std::fs::write(
            &archive_path,
            r#"{"objects": [{"id": 1001, "asn_v4": 3333, "country_code": "NL"}]}"#,
        )
        .unwrap();

        ProbeCache::prepare(&cache_path, Some(&archive_path), Duration::from_secs(86_400))
            .unwrap();

        let cache = ProbeCache::load(&cache_path).unwrap();
        assert_eq!(cache.get(1001).unwrap().asn_v4, Some(3333));
    }

    #[test]
    fn test_import_skips_undecodable_records() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("archive.json");
        std::fs::write(
            &archive_path,
            r#"{"objects": [
                {"id": 1, "asn_v4": "not a number"},
                {"id": 2, "asn_v4": 64500}
            ]}"#,
        )
        .unwrap();

        let mut cache = ProbeCache {
            path: dir.path().join("cache.json"),
            entries: BTreeMap::new(),
        };
        assert_eq!(cache.import_archive(&archive_path).unwrap(), 1);
        assert!(cache.get(1).is_none());
        assert_eq!(cache.get(2).unwrap().asn_v4, Some(64_500));
    }

    #[test]
    fn test_save_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let mut cache = ProbeCache {
            path: path.clone(),
            entries: BTreeMap::new(),
        };
        cache.insert(7, ProbeProperties::placeholder());
        cache.save().unwrap();
        cache.save().unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("cache.json")]);
        assert_eq!(ProbeCache::load(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_prepare_tolerates_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("cache.json");
        ProbeCache::prepare(
            &cache_path,
            Some(&dir.path().join("nope.json")),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(ProbeCache::load(&cache_path).unwrap().is_empty());
    }
}
