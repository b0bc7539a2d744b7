//! CLI entry point for the network metrics tool.
//!
//! Reads a simulation event log and its link network, then writes
//! network-wide travel metrics and hourly trip-time statistics.

use anyhow::Result;
use clap::Parser;
use network_metrics::{
    fetch::{BasicClient, open_source},
    output::{print_json, print_pretty},
    parser::{InputFormat, read_network},
    pipeline::{aggregate, write_report},
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "network_metrics")]
#[command(
    about = "Compute global traffic metrics (VKT, VHT, AvgSpeed) and hourly trip-time stats",
    long_about = None
)]
struct Cli {
    /// Event log: output_events.xml or CSV (path or URL, optionally .gz)
    #[arg(short, long, value_name = "FILE_OR_URL")]
    events: String,

    /// Network: output_network.xml or `link_id,length` CSV (path or URL, optionally .gz)
    #[arg(short, long, value_name = "FILE_OR_URL")]
    network: String,

    /// Optional mode filter for trip-time stats (e.g. car)
    #[arg(short, long, env = "NETWORK_METRICS_MODE")]
    mode: Option<String>,

    /// Directory to write global_metrics.csv and hourly_trip_time.csv into
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Also log the metrics as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/network_metrics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("network_metrics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    run(cli).await
}

/// Loads both inputs, runs the aggregation pass and writes the reports.
///
/// Any input or output failure aborts the run before anything partial is
/// reported as a result.
#[tracing::instrument(
    skip(cli),
    fields(events = %cli.events, network = %cli.network, mode = cli.mode.as_deref())
)]
async fn run(cli: Cli) -> Result<()> {
    let client = BasicClient::new()?;

    let network_format = InputFormat::from_source(&cli.network);
    let network_source = open_source(&client, &cli.network).await?;
    let network = read_network(network_source, network_format)?;
    info!(links = network.len(), format = ?network_format, "Network loaded");

    let events_format = InputFormat::from_source(&cli.events);
    let events = open_source(&client, &cli.events).await?;
    let report = aggregate(&network, events, events_format, cli.mode.as_deref())?;

    print_pretty(&report.metrics);
    if cli.json {
        print_json(&report.metrics)?;
    }

    write_report(&cli.output_dir, &report)?;

    info!(
        output_dir = %cli.output_dir.display(),
        vkt_km = report.metrics.vkt_km,
        vht_h = report.metrics.vht_h,
        trips = report.metrics.trips_all,
        "Finished computing global metrics"
    );
    Ok(())
}
