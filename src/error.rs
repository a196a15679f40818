//! Error types module.
//!
//! This module defines the error types used throughout ra-dns-check.
//! It uses `thiserror` for structured error handling and provides
//! a custom `Result` type alias for convenience.
//!
//! Every variant that aborts a run maps to its own process exit code,
//! see [`Error::exit_code`].

use thiserror::Error;

/// A specialized `Result` type for ra-dns-check operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for ra-dns-check.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (result files, cache files, config file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error (settings file)
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error (writing the default settings file)
    #[error("Config write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// HTTP transport error talking to the measurement API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error (invalid settings, unknown keys)
    #[error("Config error: {0}")]
    Config(String),

    /// A user supplied date-time could not be turned into a valid epoch
    #[error("Cannot validate \"{0}\" as a date-time representation")]
    InvalidDateTime(String),

    /// No result files or measurement ids were given
    #[error("Please supply one or two local filenames or RIPE Atlas Measurement IDs")]
    NoDataSources,

    /// More than two result files or measurement ids were given
    #[error("Too many data sources ({0}); supply one or two local filenames or RIPE Atlas Measurement IDs")]
    TooManyDataSources(usize),

    /// Source is neither a readable result file nor a measurement id
    #[error("Cannot read from {0} and it does not look like a RIPE Atlas Measurement ID")]
    DataSourceUnavailable(String),

    /// The measurement API refused or failed a request
    #[error("Request of {0} from RIPE Atlas failed")]
    RemoteRequestFailed(String),

    /// The probe properties cache could not be read
    #[error("Cannot read probe data from cache file {path}: {reason}")]
    CacheUnavailable { path: String, reason: String },

    /// Two result sets without a single probe in common
    #[error("The two sets of measurement results do not have any probes in common.\nSet 0: {}\nSet 1: {}", .set_a.join(" "), .set_b.join(" "))]
    NoCommonProbes { set_a: Vec<String>, set_b: Vec<String> },

    /// A configured report column is not known
    #[error("Unknown report column: {0}")]
    UnknownReportColumn(String),
}

impl Error {
    /// Create a new configuration error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new cache error for `path`.
    #[must_use]
    pub fn cache(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::CacheUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Process exit code for this error.
    ///
    /// | code | condition |
    /// |------|-----------|
    /// | 1    | configuration, I/O or other unexpected failure |
    /// | 2    | invalid date-time |
    /// | 3    | no data sources |
    /// | 4    | too many data sources |
    /// | 11   | remote request failed |
    /// | 12   | data source unavailable |
    /// | 13   | probe cache unreadable |
    /// | 14   | no common probes |
    /// | 15   | unknown report column |
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidDateTime(_) => 2,
            Self::NoDataSources => 3,
            Self::TooManyDataSources(_) => 4,
            Self::RemoteRequestFailed(_) | Self::Http(_) => 11,
            Self::DataSourceUnavailable(_) => 12,
            Self::CacheUnavailable { .. } => 13,
            Self::NoCommonProbes { .. } => 14,
            Self::UnknownReportColumn(_) => 15,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            Error::InvalidDateTime("x".into()),
            Error::NoDataSources,
            Error::TooManyDataSources(3),
            Error::RemoteRequestFailed("12345678".into()),
            Error::DataSourceUnavailable("foo".into()),
            Error::cache("/tmp/x", "missing"),
            Error::NoCommonProbes {
                set_a: vec![],
                set_b: vec![],
            },
            Error::UnknownReportColumn("bogus".into()),
            Error::config("bad"),
        ];
        let mut codes: Vec<i32> = errors.iter().map(Error::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_no_common_probes_lists_both_sets() {
        let err = Error::NoCommonProbes {
            set_a: vec!["1".into(), "2".into()],
            set_b: vec!["3".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Set 0: 1 2"));
        assert!(msg.contains("Set 1: 3"));
    }
}
