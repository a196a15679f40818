//! Summary statistics of a measurement set.

use crate::measurement::types::MeasurementSet;
use chrono::DateTime;
use std::io::Write;

/// Response time statistics (ms).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub stddev: f64,
}

/// Summarize response time samples.
///
/// Returns `None` for an empty sample list.
#[must_use]
pub fn summarize(samples: &[f64]) -> Option<Summary> {
    if samples.is_empty() {
        return None;
    }

    let count = samples.len();
    let mean = samples.iter().sum::<f64>() / count as f64;
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / count as f64;
    let (min, max) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
            (lo.min(s), hi.max(s))
        });

    Some(Summary {
        count,
        min,
        max,
        mean,
        stddev: variance.sqrt(),
    })
}

impl MeasurementSet {
    /// Response time statistics of this set, `None` when empty.
    #[must_use]
    pub fn summary(&self) -> Option<Summary> {
        summarize(&self.response_times)
    }
}

fn format_timestamp(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Write the summary block of `set`.
///
/// The time range and latency lines are left out for an empty set.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_summary<W: Write>(
    set: &MeasurementSet,
    slow_threshold: f64,
    mut writer: W,
) -> std::io::Result<()> {
    let measurement_id = set
        .measurement_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());

    writeln!(writer)?;
    writeln!(writer, "{:>37} {:>10}", "Result set:", set.result_set_id)?;
    writeln!(writer, "{:>37} {:>10}", "Measurement_ID:", measurement_id)?;
    writeln!(writer, "{:>37} {:>10}", "Total Responses:", set.total_responses)?;
    writeln!(
        writer,
        "{:>37} {:>10}",
        format!("Slow (>{slow_threshold}ms) responses:"),
        set.slow
    )?;
    writeln!(writer, "{:>37} {:>10}", "Errors:", set.errors)?;
    writeln!(writer, "{:>37} {:>10}", "Malformed Responses:", set.malformed)?;
    writeln!(
        writer,
        "{:>37} {:>10}",
        "Malformed Answer Buffers:", set.abuf_malformed
    )?;

    if let (Some(first), Some(last)) = (set.timestamps.first(), set.timestamps.last()) {
        writeln!(
            writer,
            "{:>37} {:>19} - {:>19}",
            "Measurements created time range:",
            format_timestamp(*first),
            format_timestamp(*last)
        )?;
    }

    if let Some(summary) = set.summary() {
        writeln!(
            writer,
            "{:>37} {:.3}/{:.3}/{:.3}/{:.3}",
            "response time (ms) min/avg/max/stddev:",
            summary.min,
            summary.mean,
            summary.max,
            summary.stddev
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize() {
        let summary = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(summary.count, 8);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
        assert_eq!(summary.mean, 5.0);
        assert!((summary.stddev - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_summarize_single_and_empty() {
        let single = summarize(&[42.0]).unwrap();
        assert_eq!(single.min, 42.0);
        assert_eq!(single.max, 42.0);
        assert_eq!(single.stddev, 0.0);
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_write_summary() {
        let mut set = MeasurementSet::new(1, "12016241");
        set.measurement_id = Some(12_016_241);
        set.response_times = vec![10.0, 20.0, 30.0];
        set.timestamps = vec![1_609_459_200, 1_609_459_500];
        set.total_responses = 3;
        set.slow = 0;
        set.errors = 2;

        let mut out = Vec::new();
        write_summary(&set, 50.0, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Measurement_ID:   12016241"));
        assert!(text.contains("Slow (>50ms) responses:"));
        assert!(text.contains("2021-01-01 00:00:00 - 2021-01-01 00:05:00"));
        assert!(text.contains("10.000/20.000/30.000/8.165"));
    }

    #[test]
    fn test_write_summary_empty_set() {
        let set = MeasurementSet::new(0, "empty.json");
        let mut out = Vec::new();
        write_summary(&set, 50.0, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Total Responses:"));
        assert!(!text.contains("min/avg/max"));
        assert!(!text.contains("time range"));
    }
}
