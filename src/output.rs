//! Output formatting and persistence for computed metrics.
//!
//! Supports pretty-printing, JSON logging, and the two CSV tables.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::stats::{GlobalMetrics, HourlyRow, MetricRecord};
use csv::WriterBuilder;
use std::path::Path;

pub const METRICS_FILE: &str = "global_metrics.csv";
pub const HOURLY_FILE: &str = "hourly_trip_time.csv";

/// Logs metrics using Rust's debug pretty-print format.
pub fn print_pretty(metrics: &GlobalMetrics) {
    debug!("{:#?}", metrics);
}

/// Logs metrics as pretty-printed JSON.
pub fn print_json(metrics: &GlobalMetrics) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(metrics)?);
    Ok(())
}

/// Writes the `metric,value,unit,notes` table, replacing any existing file.
pub fn write_metrics(path: &Path, records: &[MetricRecord]) -> Result<()> {
    write_rows(path, records)
}

/// Writes the 24-row hourly trip-time table, replacing any existing file.
pub fn write_hourly(path: &Path, rows: &[HourlyRow]) -> Result<()> {
    write_rows(path, rows)
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV table");

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
