//! Per-probe comparison report.
//!
//! Each row joins a probe's static properties with its metrics in result
//! set A (0) and B (1). The header goes to one writer (stderr in the
//! binary) and the rows to another (stdout), so rows can be piped on
//! their own.

use crate::dns::ProbeId;
use crate::error::Result;
use crate::measurement::{DnsAnswer, IpVersion, MeasurementSet};
use crate::probes::ProbeProperties;
use crate::report::columns::{Column, ColumnId};
use crate::report::highlight::Highlight;
use std::collections::BTreeMap;
use std::io::Write;

/// Shown in the response time columns for probes without a response.
const ABSENT_RESPONSE_TIME: f64 = -1.0;

/// Rendering options.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Columns in display order.
    pub columns: Vec<ColumnId>,
    /// Emit terminal colours.
    pub color: bool,
    /// Append `*` / `!` markers to significant cells.
    pub emphasis: bool,
    /// Only list probes slower than `slow_threshold` in either set.
    pub slow_only: bool,
    /// Slow response threshold (ms).
    pub slow_threshold: f64,
    /// Latency difference considered significant (ms).
    pub latency_diff_threshold: f64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            columns: ColumnId::defaults().to_vec(),
            color: true,
            emphasis: false,
            slow_only: false,
            slow_threshold: 50.0,
            latency_diff_threshold: 5.0,
        }
    }
}

/// Everything known about one probe for the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRow {
    pub probe_id: ProbeId,
    pub asn: String,
    pub country: String,
    pub address: String,
    pub rt_a: Option<f64>,
    pub rt_b: Option<f64>,
    pub rt_diff: f64,
    pub answer_a: DnsAnswer,
    pub answer_b: DnsAnswer,
}

impl ProbeRow {
    /// Join properties and metrics of `probe_id`.
    #[must_use]
    pub fn build(
        probe_id: ProbeId,
        properties: &ProbeProperties,
        set_a: &MeasurementSet,
        set_b: Option<&MeasurementSet>,
        ip_version: IpVersion,
    ) -> Self {
        let rt_a = set_a.response_time(probe_id);
        let rt_b = set_b.and_then(|set| set.response_time(probe_id));

        Self {
            probe_id,
            asn: properties.display_asn(ip_version),
            country: properties.display_country(),
            address: properties.display_address(ip_version),
            rt_a,
            rt_b,
            rt_diff: rt_diff(rt_a, rt_b),
            answer_a: set_a.answer(probe_id),
            answer_b: set_b.map_or(DnsAnswer::Unknown, |set| set.answer(probe_id)),
        }
    }

    /// Answer text: shared answer once, or `A:B` when they differ.
    #[must_use]
    pub fn answer_text(&self) -> String {
        if self.answer_a == self.answer_b {
            self.answer_a.to_string()
        } else {
            format!("{}:{}", self.answer_a, self.answer_b)
        }
    }
}

/// `b - a` when both sets have a real response, otherwise 0.
#[must_use]
pub fn rt_diff(rt_a: Option<f64>, rt_b: Option<f64>) -> f64 {
    match (rt_a, rt_b) {
        (Some(a), Some(b)) if a > 0.0 && b > 0.0 => b - a,
        _ => 0.0,
    }
}

/// Labels of the two response time columns.
///
/// Two date-times win, then two measurement ids, then a single id with an
/// empty second label.
#[must_use]
pub fn header_labels(
    datetimes: (Option<&str>, Option<&str>),
    sets: &[MeasurementSet],
) -> (String, String) {
    if let (first, Some(second)) = datetimes {
        return (first.unwrap_or("latest").to_string(), second.to_string());
    }
    match sets {
        [a, b, ..] => (a.label(), b.label()),
        [a] => (a.label(), String::new()),
        [] => (String::new(), String::new()),
    }
}

/// Laid out report.
pub struct Report {
    columns: Vec<Column>,
    options: ReportOptions,
}

impl Report {
    /// Lay out the configured columns.
    #[must_use]
    pub fn new(options: ReportOptions, labels: (&str, &str), ip_version: IpVersion) -> Self {
        let columns = options
            .columns
            .iter()
            .map(|&id| Column::new(id, labels, ip_version))
            .collect();
        Self { columns, options }
    }

    fn marker_width(&self, id: ColumnId) -> usize {
        let marked = matches!(id, ColumnId::RtDiff | ColumnId::DnsResponse);
        usize::from(self.options.emphasis && marked)
    }

    /// Header line followed by a separator line.
    #[must_use]
    pub fn header(&self) -> String {
        let line = self
            .columns
            .iter()
            .map(|c| format!("{:>w$}", c.header, w = c.width + self.marker_width(c.id)))
            .collect::<Vec<_>>()
            .join(" ");
        let rule = "-".repeat(line.len());
        format!("{line}\n{rule}")
    }

    /// Whether `row` passes the slow-only filter.
    #[must_use]
    pub fn is_listed(&self, row: &ProbeRow) -> bool {
        if !self.options.slow_only {
            return true;
        }
        let slow = |rt: Option<f64>| rt.is_some_and(|rt| rt > self.options.slow_threshold);
        slow(row.rt_a) || slow(row.rt_b)
    }

    /// Format `row`, or `None` when it is filtered out.
    #[must_use]
    pub fn format_row(&self, row: &ProbeRow) -> Option<String> {
        if !self.is_listed(row) {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|column| self.cell(column, row))
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    fn cell(&self, column: &Column, row: &ProbeRow) -> String {
        let w = column.width;
        let color = self.options.color;
        match column.id {
            ColumnId::ProbeId => format!("{:>w$}", row.probe_id),
            ColumnId::Asn => format!("{:>w$}", row.asn),
            ColumnId::CountryCode => format!("{:>w$}", row.country),
            ColumnId::IpAddress => format!("{:>w$}", row.address),
            ColumnId::RtA => self.response_time_cell(row.rt_a, w),
            ColumnId::RtB => self.response_time_cell(row.rt_b, w),
            ColumnId::RtDiff => {
                let highlight =
                    Highlight::for_diff(row.rt_diff, self.options.latency_diff_threshold);
                let marker = if highlight == Highlight::Increase { "*" } else { " " };
                let text = highlight.paint(&format!("{:>w$.2}", row.rt_diff), color);
                self.with_marker(text, marker)
            }
            ColumnId::DnsResponse => {
                let highlight = Highlight::for_answers(&row.answer_a, &row.answer_b);
                let marker = if highlight == Highlight::Differ { "!" } else { " " };
                let text = highlight.paint(&format!("{:>w$}", row.answer_text()), color);
                self.with_marker(text, marker)
            }
        }
    }

    fn response_time_cell(&self, rt: Option<f64>, w: usize) -> String {
        Highlight::for_response_time(rt, self.options.slow_threshold).paint(
            &format!("{:>w$.2}", rt.unwrap_or(ABSENT_RESPONSE_TIME)),
            self.options.color,
        )
    }

    fn with_marker(&self, text: String, marker: &str) -> String {
        if self.options.emphasis {
            text + marker
        } else {
            text
        }
    }

    /// Build and write the rows of `probe_ids` (ascending).
    ///
    /// The header goes to `header_out` unless `show_header` is false.
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    #[allow(clippy::too_many_arguments)]
    pub fn write<'p, O: Write, E: Write>(
        &self,
        probe_ids: impl IntoIterator<Item = &'p ProbeId>,
        properties: &BTreeMap<ProbeId, ProbeProperties>,
        sets: &[MeasurementSet],
        ip_version: IpVersion,
        show_header: bool,
        mut rows_out: O,
        mut header_out: E,
    ) -> Result<usize> {
        let Some(set_a) = sets.first() else {
            return Ok(0);
        };
        let set_b = sets.get(1);

        if show_header {
            writeln!(header_out, "{}", self.header())?;
        }

        let placeholder = ProbeProperties::placeholder();
        let mut written = 0;
        for &probe_id in probe_ids {
            let props = properties.get(&probe_id).unwrap_or(&placeholder);
            let row = ProbeRow::build(probe_id, props, set_a, set_b, ip_version);
            if let Some(line) = self.format_row(&row) {
                writeln!(rows_out, "{line}")?;
                written += 1;
            }
        }
        Ok(written)
    }
}
