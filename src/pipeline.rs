//! Single pass over an event log: dispatch, derive, write.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::analyzers::{TraversalAggregator, TripAggregator};
use crate::events::dispatch;
use crate::network::Network;
use crate::output::{HOURLY_FILE, METRICS_FILE, write_hourly, write_metrics};
use crate::parser::{InputFormat, read_events};
use crate::stats::{GlobalMetrics, HourlyRow, hourly_table};

/// Everything derived from one event log.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub metrics: GlobalMetrics,
    pub hourly: Vec<HourlyRow>,
}

/// Reads the whole event log once, feeding both aggregators, and derives the
/// report from their final state.
#[tracing::instrument(skip(network, events), fields(links = network.len()))]
pub fn aggregate<R: Read>(
    network: &Network,
    events: R,
    format: InputFormat,
    mode: Option<&str>,
) -> Result<Report> {
    let mut traversal = TraversalAggregator::new(network);
    let mut trips = TripAggregator::new(mode);

    let mut reader = read_events(events, format)?;
    let delivered = dispatch(reader.by_ref(), &mut [&mut traversal, &mut trips])?;

    info!(
        delivered,
        skipped = reader.skipped(),
        open_traversals = traversal.pending(),
        open_trips = trips.pending(),
        "Event log processed"
    );

    Ok(Report {
        metrics: GlobalMetrics::from_aggregators(&traversal, &trips),
        hourly: hourly_table(&trips),
    })
}

/// Writes both tables into `output_dir`, creating it if needed.
#[tracing::instrument(skip(report, output_dir), fields(output_dir = %output_dir.display()))]
pub fn write_report(output_dir: &Path, report: &Report) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    write_metrics(&output_dir.join(METRICS_FILE), &report.metrics.records())?;
    write_hourly(&output_dir.join(HOURLY_FILE), &report.hourly)?;

    info!("Reports written");
    Ok(())
}
