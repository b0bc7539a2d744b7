//! Network-wide metrics derived from the final aggregator state.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::analyzers::{TraversalAggregator, TripAggregator};

const METERS_PER_KM: f64 = 1000.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Scalar performance metrics for one simulation run.
///
/// Undefined ratios (no travel time, no trips) are `None` rather than zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalMetrics {
    pub vkt_km: f64,
    pub vht_h: f64,
    pub avg_speed_kmh: Option<f64>,
    pub trips_all: u64,
    pub avg_trip_time_all_s: Option<f64>,
    pub mode: Option<String>,
    pub trips_mode: u64,
    pub avg_trip_time_mode_s: Option<f64>,
}

impl GlobalMetrics {
    pub fn from_aggregators(traversal: &TraversalAggregator<'_>, trips: &TripAggregator) -> Self {
        let vkt_km = traversal.total_distance_meters() / METERS_PER_KM;
        let vht_h = traversal.total_time_seconds() / SECONDS_PER_HOUR;
        let avg_speed_kmh = if vht_h > 0.0 {
            Some(vkt_km / vht_h)
        } else {
            None
        };

        GlobalMetrics {
            vkt_km,
            vht_h,
            avg_speed_kmh,
            trips_all: trips.trips_all(),
            avg_trip_time_all_s: trips.avg_trip_time_all(),
            mode: trips.mode_filter().map(str::to_string),
            trips_mode: trips.trips_mode(),
            avg_trip_time_mode_s: trips.avg_trip_time_mode(),
        }
    }

    /// Flattens the metrics into `metric,value,unit,notes` rows.
    ///
    /// Mode rows are only present when a mode filter was configured.
    pub fn records(&self) -> Vec<MetricRecord> {
        let mut records = vec![
            MetricRecord::new(
                "VKT",
                MetricValue::decimal(self.vkt_km, 6),
                "km",
                "from LinkEnter/Leave",
            ),
            MetricRecord::new(
                "VHT",
                MetricValue::decimal(self.vht_h, 6),
                "h",
                "from LinkEnter/Leave",
            ),
            MetricRecord::new(
                "AvgSpeed",
                MetricValue::Decimal {
                    value: self.avg_speed_kmh,
                    precision: 6,
                },
                "km/h",
                "VKT/VHT",
            ),
            MetricRecord::new(
                "TripsAll",
                MetricValue::Count(self.trips_all),
                "count",
                "from PersonDeparture/Arrival",
            ),
            MetricRecord::new(
                "AvgTripTimeAll",
                MetricValue::Decimal {
                    value: self.avg_trip_time_all_s,
                    precision: 3,
                },
                "s",
                "all modes",
            ),
        ];

        if let Some(mode) = &self.mode {
            records.push(MetricRecord::new(
                format!("Trips[{mode}]"),
                MetricValue::Count(self.trips_mode),
                "count",
                "mode filtered",
            ));
            records.push(MetricRecord::new(
                format!("AvgTripTime[{mode}]"),
                MetricValue::Decimal {
                    value: self.avg_trip_time_mode_s,
                    precision: 3,
                },
                "s",
                "mode filtered",
            ));
        }

        records
    }
}

/// A metric value as written to the metrics table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Count(u64),
    /// Fixed-precision decimal; `None` renders as `NaN`.
    Decimal { value: Option<f64>, precision: usize },
}

impl MetricValue {
    fn decimal(value: f64, precision: usize) -> Self {
        MetricValue::Decimal {
            value: Some(value),
            precision,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(n) => write!(f, "{n}"),
            MetricValue::Decimal {
                value: Some(v),
                precision,
            } => write!(f, "{v:.precision$}"),
            MetricValue::Decimal { value: None, .. } => f.write_str("NaN"),
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row of `global_metrics.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub metric: String,
    pub value: MetricValue,
    pub unit: &'static str,
    pub notes: &'static str,
}

impl MetricRecord {
    fn new(
        metric: impl Into<String>,
        value: MetricValue,
        unit: &'static str,
        notes: &'static str,
    ) -> Self {
        Self {
            metric: metric.into(),
            value,
            unit,
            notes,
        }
    }
}

/// One row of `hourly_trip_time.csv`; undefined averages are empty cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRow {
    pub hour: usize,
    pub avg_trip_time_all_s: Option<f64>,
    pub trips_all: u64,
    pub avg_trip_time_mode_s: Option<f64>,
    pub trips_mode: u64,
    pub mode: String,
}

/// Builds the 24-row trip-time table, one row per departure hour.
pub fn hourly_table(trips: &TripAggregator) -> Vec<HourlyRow> {
    let mode = trips.mode_filter().unwrap_or_default();

    trips
        .hourly()
        .map(|bucket| HourlyRow {
            hour: bucket.hour,
            avg_trip_time_all_s: bucket.all.average(),
            trips_all: bucket.all.count,
            avg_trip_time_mode_s: bucket.mode.average(),
            trips_mode: bucket.mode.count,
            mode: mode.to_string(),
        })
        .collect()
}
