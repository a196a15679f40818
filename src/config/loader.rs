//! Settings file and probe exclusion list loader.
//!
//! Settings live in a TOML file under the user's config directory
//! (`$CONFIG_DIR/ra-dns-check/config.toml`). The file is written from
//! defaults the first time the tool runs so users have something to edit.

use crate::atlas::DEFAULT_API_URL;
use crate::dns::ProbeId;
use crate::error::{Error, Result};
use crate::report::ColumnId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Format of `oldest_result_datetime` in the settings file.
const OLDEST_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Persistent settings.
///
/// Unknown keys are rejected so that a typo in the settings file does not
/// go unnoticed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Earliest date-time (UTC) for which results may exist.
    pub oldest_result_datetime: String,
    /// JSON cache of resolved probe properties.
    pub probe_properties_cache_file: PathBuf,
    /// Decompressed bulk probe archive (`{"objects": [...]}`), if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_archive_file: Option<PathBuf>,
    /// Archive age in seconds after which a refresh is suggested.
    pub probe_archive_max_age: u64,
    /// Base URL of the measurement API.
    pub atlas_api_url: String,
    /// Per-request timeout against the measurement API.
    pub request_timeout_secs: u64,
    /// Ordered report columns.
    pub report_columns: Vec<String>,
    /// Newline-delimited probe ids to ignore.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_probes_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            oldest_result_datetime: "2010-01-01 00:00:00".to_string(),
            probe_properties_cache_file: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("ra-dns-check")
                .join("probe_properties.json"),
            probe_archive_file: None,
            probe_archive_max_age: 86_400,
            atlas_api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
            report_columns: ColumnId::defaults()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            exclude_probes_file: None,
        }
    }
}

impl Settings {
    /// Lower epoch bound derived from `oldest_result_datetime`.
    ///
    /// # Errors
    ///
    /// Returns a config error if the value is not `YYYY-MM-DD HH:MM:SS`.
    pub fn oldest_epoch(&self) -> Result<i64> {
        NaiveDateTime::parse_from_str(&self.oldest_result_datetime, OLDEST_DATETIME_FORMAT)
            .map(|dt| dt.and_utc().timestamp())
            .map_err(|e| {
                Error::config(format!(
                    "oldest_result_datetime \"{}\": {e}",
                    self.oldest_result_datetime
                ))
            })
    }

    /// Parse the configured report column names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownReportColumn`] for the first unknown name.
    pub fn columns(&self) -> Result<Vec<ColumnId>> {
        self.report_columns.iter().map(|c| c.parse()).collect()
    }
}

/// Settings and exclusion list loader.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Get the config directory path.
    #[must_use]
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ra-dns-check")
    }

    /// Default settings file path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML or
    /// contains unknown keys.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings, writing the defaults to `path` first if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be parsed or the default
    /// file cannot be written.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load_from_file(path);
        }

        tracing::debug!("settings file {} missing, writing defaults", path.display());
        let settings = Settings::default();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(&settings)?)?;
        Ok(settings)
    }

    /// Load the probe exclusion list.
    ///
    /// One probe id per line; blank lines and `#` comments are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn load_exclusions<P: AsRef<Path>>(path: P) -> Result<BTreeSet<ProbeId>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::parse_exclusions(&content))
    }

    /// Parse exclusion list text. Lines that are not probe ids are skipped
    /// with a warning.
    #[must_use]
    pub fn parse_exclusions(content: &str) -> BTreeSet<ProbeId> {
        content
            .lines()
            .map(|line| line.split('#').next().unwrap_or_default().trim())
            .filter(|id| !id.is_empty())
            .filter_map(|id| match id.parse() {
                Ok(probe_id) => Some(probe_id),
                Err(_) => {
                    tracing::warn!("ignoring exclusion entry \"{id}\"");
                    None
                }
            })
            .collect()
    }
}
