//! User supplied date-time normalization.
//!
//! Accepts either a unix timestamp or one of a handful of compact UTC
//! date-time spellings (`20210101_0000`, `2021-01-01 00:00`, ...) and
//! returns unix seconds within `[oldest, now)`.

use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};

/// Date layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%Y%m%d", "%Y-%m-%d"];

/// Separators between date and time of day, tried in order.
const DATE_TIME_SEPARATORS: &[&str] = &["", "_", " ", "-", ":", "."];

/// Time of day layouts, tried in order.
const TIME_FORMATS: &[&str] = &["%H%M", "%H:%M"];

/// Validates and converts date-time strings into unix seconds.
#[derive(Debug, Clone, Copy)]
pub struct TimeNormalizer {
    oldest: i64,
    now: i64,
}

impl TimeNormalizer {
    /// Create a normalizer accepting `[oldest, now)`.
    #[must_use]
    pub fn new(oldest: i64, now: i64) -> Self {
        Self { oldest, now }
    }

    /// Create a normalizer bounded by `oldest` and the current time.
    #[must_use]
    pub fn until_now(oldest: i64) -> Self {
        Self::new(oldest, Utc::now().timestamp())
    }

    /// Whether `epoch` lies within the accepted range.
    #[must_use]
    pub fn is_valid(&self, epoch: i64) -> bool {
        epoch >= self.oldest && epoch < self.now
    }

    /// Normalize `input` into unix seconds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDateTime`] if neither a valid timestamp nor
    /// any accepted pattern inside the valid range.
    pub fn normalize(&self, input: &str) -> Result<i64> {
        let input = input.trim();
        if let Ok(epoch) = input.parse::<i64>() {
            if self.is_valid(epoch) {
                return Ok(epoch);
            }
        }

        for date_format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(input, date_format) {
                if let Some(epoch) = date
                    .and_hms_opt(0, 0, 0)
                    .map(|dt| dt.and_utc().timestamp())
                    .filter(|epoch| self.is_valid(*epoch))
                {
                    return Ok(epoch);
                }
            }

            for separator in DATE_TIME_SEPARATORS {
                for time_format in TIME_FORMATS {
                    let format = format!("{date_format}{separator}{time_format}");
                    if let Ok(dt) = NaiveDateTime::parse_from_str(input, &format) {
                        let epoch = dt.and_utc().timestamp();
                        if self.is_valid(epoch) {
                            tracing::debug!("accepted {input:?} as {epoch} via {format:?}");
                            return Ok(epoch);
                        }
                    }
                }
            }
        }

        Err(Error::InvalidDateTime(input.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OLDEST: i64 = 1_262_304_000; // 2010-01-01 00:00:00
    const NOW: i64 = 1_700_000_000;
    const JAN_2021: i64 = 1_609_459_200; // 2021-01-01 00:00:00

    fn normalizer() -> TimeNormalizer {
        TimeNormalizer::new(OLDEST, NOW)
    }

    #[test]
    fn test_epoch_passthrough() {
        let n = normalizer();
        for epoch in [OLDEST, OLDEST + 1, JAN_2021, NOW - 1] {
            assert_eq!(n.normalize(&epoch.to_string()).unwrap(), epoch);
        }
    }

    #[test]
    fn test_epoch_bounds() {
        let n = normalizer();
        assert!(n.is_valid(OLDEST));
        assert!(!n.is_valid(OLDEST - 1));
        assert!(!n.is_valid(NOW));
        assert!(matches!(
            n.normalize(&NOW.to_string()),
            Err(Error::InvalidDateTime(_))
        ));
    }

    #[test]
    fn test_patterns_agree() {
        let n = normalizer();
        for input in [
            "202101010000",
            "20210101_0000",
            "20210101_00:00",
            "20210101 0000",
            "20210101 00:00",
            "20210101.0000",
            "20210101:00:00",
            "2021-01-01_0000",
            "2021-01-01_00:00",
            "2021-01-01-0000",
            "2021-01-01-00:00",
            "2021-01-01 00:00",
            "20210101",
            "2021-01-01",
        ] {
            assert_eq!(n.normalize(input).unwrap(), JAN_2021, "{input}");
        }
    }

    #[test]
    fn test_time_of_day() {
        let n = normalizer();
        assert_eq!(n.normalize("20210101_1230").unwrap(), JAN_2021 + 12 * 3600 + 30 * 60);
    }

    #[test]
    fn test_out_of_range_dates() {
        let n = normalizer();
        assert!(n.normalize("2009-12-31_2359").is_err());
        assert!(n.normalize("2099-01-01_0000").is_err());
    }

    #[test]
    fn test_garbage() {
        let n = normalizer();
        for input in ["", "yesterday", "2021-13-01_0000", "12345"] {
            assert!(
                matches!(n.normalize(input), Err(Error::InvalidDateTime(_))),
                "{input}"
            );
        }
    }
}
