//! Command-line interface (CLI) argument parsing module.
//!
//! This module provides CLI argument parsing using `clap`.
//! One or two data sources (result files or measurement ids) are compared;
//! a single source with `--datetime2` is compared against itself at two
//! points in time.

use crate::error::{Error, Result};
use clap::Parser;
use std::path::PathBuf;

/// CLI argument parser using clap derive macro.
///
/// # Example
///
/// ```ignore
/// let cli = Cli::parse();
/// for source in cli.data_sources()? {
///     /* ingest source.source starting at source.datetime */
/// }
/// ```
#[derive(Parser, Debug)]
#[command(
    name = "ra-dns-check",
    version,
    about = "Compare RIPE Atlas DNS measurement results",
    long_about = "Compare response times and answers of one or two RIPE Atlas DNS \
                  measurements, probe by probe"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Result files or 8-digit measurement ids (one or two)
    #[arg(value_name = "SOURCE")]
    pub sources: Vec<String>,

    /// Start of the first result window (default: latest results)
    #[arg(long = "datetime1", visible_alias = "dt1")]
    pub datetime1: Option<String>,

    /// Start of the second result window
    #[arg(long = "datetime2", visible_alias = "dt2")]
    pub datetime2: Option<String>,

    /// List every probe seen in either set, not only common ones
    #[arg(short = 'a', long)]
    pub all_probes: bool,

    /// Disable colour output
    #[arg(short = 'C', long)]
    pub no_color: bool,

    /// Append `*` and `!` to significant cells
    #[arg(short = 'e', long = "emphasis-chars")]
    pub emphasis: bool,

    /// Do not print the report header
    #[arg(short = 'H', long)]
    pub no_header: bool,

    /// Field of the split DNS answer to show
    #[arg(short = 'i', long, default_value = "1")]
    pub item_index: usize,

    /// Latency difference (ms) considered significant
    #[arg(short = 'l', long, default_value = "5")]
    pub latency_diff_threshold: f64,

    /// Do not print the per-probe report
    #[arg(short = 'P', long)]
    pub no_probe_list: bool,

    /// Only list probes slower than the slow threshold
    #[arg(short = 's', long)]
    pub slow_only: bool,

    /// Response time (ms) considered slow
    #[arg(short = 'S', long, default_value = "50")]
    pub slow_threshold: f64,

    /// Character the DNS answer is split on (`!` disables splitting)
    #[arg(short = 't', long, default_value = ".")]
    pub split_char: String,

    /// Print summary statistics for each result set
    #[arg(short = 'u', long)]
    pub summary: bool,

    /// Comma separated report columns
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// File of probe ids to exclude
    #[arg(long, value_name = "FILE")]
    pub exclude: Option<PathBuf>,

    /// Settings file (default: config dir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode (only errors)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// One result set to ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    /// File path or measurement id.
    pub source: String,
    /// Start of the result window, `None` for the latest results.
    pub datetime: Option<String>,
}

impl Cli {
    /// Result sets to ingest, in comparison order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoDataSources`] without sources and
    /// [`Error::TooManyDataSources`] with more than two.
    pub fn data_sources(&self) -> Result<Vec<DataSource>> {
        let source = |s: &String, dt: &Option<String>| DataSource {
            source: s.clone(),
            datetime: dt.clone(),
        };
        match self.sources.as_slice() {
            [] => Err(Error::NoDataSources),
            [only] if self.datetime2.is_some() => Ok(vec![
                source(only, &self.datetime1),
                source(only, &self.datetime2),
            ]),
            [only] => Ok(vec![source(only, &self.datetime1)]),
            [first, second] => Ok(vec![
                source(first, &self.datetime1),
                source(second, &self.datetime2),
            ]),
            more => Err(Error::TooManyDataSources(more.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ra-dns-check").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["12016241"]);
        assert_eq!(cli.item_index, 1);
        assert_eq!(cli.slow_threshold, 50.0);
        assert_eq!(cli.latency_diff_threshold, 5.0);
        assert_eq!(cli.split_char, ".");
        assert!(!cli.all_probes && !cli.no_color && !cli.emphasis);
        assert!(cli.columns.is_none());
    }

    #[test]
    fn test_short_flags() {
        let cli = parse(&[
            "a.json", "b.json", "-a", "-C", "-e", "-H", "-P", "-s", "-u", "-S", "80", "-l", "10",
            "-i", "0", "-t", "!",
        ]);
        assert!(cli.all_probes && cli.no_color && cli.emphasis && cli.no_header);
        assert!(cli.no_probe_list && cli.slow_only && cli.summary);
        assert_eq!(cli.slow_threshold, 80.0);
        assert_eq!(cli.latency_diff_threshold, 10.0);
        assert_eq!(cli.item_index, 0);
        assert_eq!(cli.split_char, "!");
    }

    #[test]
    fn test_columns_list() {
        let cli = parse(&["a.json", "--columns", "probe_id,rt_a,dns_response"]);
        assert_eq!(
            cli.columns.unwrap(),
            vec!["probe_id", "rt_a", "dns_response"]
        );
    }

    #[test]
    fn test_datetime_aliases() {
        let cli = parse(&["12016241", "--dt1", "20210101", "--datetime2", "20210301"]);
        assert_eq!(cli.datetime1.as_deref(), Some("20210101"));
        assert_eq!(cli.datetime2.as_deref(), Some("20210301"));
    }

    #[test]
    fn test_no_sources() {
        assert!(matches!(parse(&[]).data_sources(), Err(Error::NoDataSources)));
    }

    #[test]
    fn test_too_many_sources() {
        let err = parse(&["a", "b", "c"]).data_sources().unwrap_err();
        assert!(matches!(err, Error::TooManyDataSources(3)));
    }

    #[test]
    fn test_single_source_with_second_datetime() {
        let sources = parse(&["12016241", "--dt2", "20210301"]).data_sources().unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].source, "12016241");
        assert_eq!(sources[0].datetime, None);
        assert_eq!(sources[1].source, "12016241");
        assert_eq!(sources[1].datetime.as_deref(), Some("20210301"));
    }

    #[test]
    fn test_two_sources() {
        let sources = parse(&["a.json", "b.json", "--dt1", "20210101"])
            .data_sources()
            .unwrap();
        assert_eq!(
            sources,
            vec![
                DataSource {
                    source: "a.json".into(),
                    datetime: Some("20210101".into()),
                },
                DataSource {
                    source: "b.json".into(),
                    datetime: None,
                },
            ]
        );
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["ra-dns-check", "a.json", "-v", "-q"]).is_err());
    }
}
