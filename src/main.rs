//! ra-dns-check - RIPE Atlas DNS measurement comparison
//!
//! Binary entry point for the ra-dns-check CLI application.

#![warn(clippy::all, warnings)]
#![warn(clippy::pedantic, clippy::nursery)]

use clap::Parser;
use ra_dns_check::cli::Cli;
use ra_dns_check::config::{ConfigLoader, Settings};
use ra_dns_check::error::Result;
use ra_dns_check::measurement::{
    reconcile, write_summary, IngestOptions, Ingestor, MeasurementSet, TimeNormalizer,
};
use ra_dns_check::probes::{ProbeCache, ProbeResolver};
use ra_dns_check::report::{header_labels, ColumnId, Report, ReportOptions};
use ra_dns_check::AtlasClient;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set up logging based on verbosity level.
///
/// Logs go to stderr so they never mix with report rows.
///
/// # Arguments
///
/// * `verbose` - Enable debug-level logging
/// * `quiet` - Enable error-level only logging
fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().without_time().with_writer(std::io::stderr))
        .init();
}

/// Load settings from `--config` or the default location.
fn load_settings(cli: &Cli) -> Result<Settings> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load_or_create(ConfigLoader::default_path()),
    }
}

/// Report columns from `--columns`, else from the settings.
fn report_columns(cli: &Cli, settings: &Settings) -> Result<Vec<ColumnId>> {
    match &cli.columns {
        Some(names) => names.iter().map(|name| name.parse()).collect(),
        None => settings.columns(),
    }
}

/// Run the comparison.
async fn run(cli: Cli) -> Result<()> {
    let sources = cli.data_sources()?;
    let settings = load_settings(&cli)?;
    let columns = report_columns(&cli, &settings)?;

    let normalizer = TimeNormalizer::until_now(settings.oldest_epoch()?);
    let start_epochs = sources
        .iter()
        .map(|s| s.datetime.as_deref().map_or(Ok(0), |dt| normalizer.normalize(dt)))
        .collect::<Result<Vec<_>>>()?;

    let exclusions = match cli.exclude.as_ref().or(settings.exclude_probes_file.as_ref()) {
        Some(path) => ConfigLoader::load_exclusions(path)?,
        None => BTreeSet::new(),
    };
    if !exclusions.is_empty() {
        tracing::info!("excluding {} probes", exclusions.len());
    }

    let options = IngestOptions {
        slow_threshold: cli.slow_threshold,
        split_char: cli.split_char.clone(),
        item_index: cli.item_index,
        exclusions,
    };
    let api = AtlasClient::new(
        &settings.atlas_api_url,
        Duration::from_secs(settings.request_timeout_secs),
    )?;
    let ingestor = Ingestor::new(&api, &options);

    let mut sets: Vec<MeasurementSet> = Vec::with_capacity(sources.len());
    for (result_set_id, (source, start)) in sources.iter().zip(start_epochs).enumerate() {
        let set = ingestor.ingest(&source.source, result_set_id, start).await?;
        tracing::debug!(
            "result set {result_set_id}: {} responses from {} probes",
            set.total_responses,
            set.probe_ids.len()
        );
        if cli.summary {
            write_summary(&set, cli.slow_threshold, std::io::stdout().lock())?;
        }
        sets.push(set);
    }

    let reconciliation = reconcile(&sets)?;
    if cli.no_probe_list {
        return Ok(());
    }

    ProbeCache::prepare(
        &settings.probe_properties_cache_file,
        settings.probe_archive_file.as_deref(),
        Duration::from_secs(settings.probe_archive_max_age),
    )?;
    let probe_ids = reconciliation.probes(cli.all_probes);
    let (properties, _) = ProbeResolver::new(&api, &settings.probe_properties_cache_file)
        .resolve(probe_ids)
        .await?;

    let (label_a, label_b) = header_labels(
        (cli.datetime1.as_deref(), cli.datetime2.as_deref()),
        &sets,
    );
    let report = Report::new(
        ReportOptions {
            columns,
            color: !cli.no_color,
            emphasis: cli.emphasis,
            slow_only: cli.slow_only,
            slow_threshold: cli.slow_threshold,
            latency_diff_threshold: cli.latency_diff_threshold,
        },
        (label_a.as_str(), label_b.as_str()),
        reconciliation.ip_version,
    );
    let listed = report.write(
        probe_ids,
        &properties,
        &sets,
        reconciliation.ip_version,
        !cli.no_header,
        std::io::stdout().lock(),
        std::io::stderr().lock(),
    )?;
    tracing::debug!("listed {listed} of {} probes", probe_ids.len());

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = color_eyre::install() {
        eprintln!("cannot install error report hook: {e}");
    }

    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    tracing::debug!("ra-dns-check starting...");

    if let Err(e) = run(cli).await {
        tracing::debug!("aborting: {e:?}");
        eprintln!("{e}");
        std::process::exit(e.exit_code());
    }
}
