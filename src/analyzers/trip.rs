use std::collections::HashMap;

use crate::analyzers::utility::{HOURS, average, elapsed, hour_bucket};
use crate::events::{Event, EventHandler};

/// A person currently on a leg.
#[derive(Debug, Clone)]
struct OpenTrip {
    departed_at: f64,
    mode: String,
}

/// Running trip count and trip-time sum for one category.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TripTotals {
    pub count: u64,
    pub time_sum_s: f64,
}

impl TripTotals {
    fn add(&mut self, trip_time: f64) {
        self.count += 1;
        self.time_sum_s += trip_time;
    }

    /// Mean trip time in seconds, `None` without trips.
    pub fn average(&self) -> Option<f64> {
        average(self.time_sum_s, self.count)
    }
}

/// Totals for trips that departed within one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourBucket {
    pub hour: usize,
    pub all: TripTotals,
    pub mode: TripTotals,
}

/// Accumulates trip counts and trip times from departure/arrival pairs,
/// overall and for an optional mode.
pub struct TripAggregator {
    mode_filter: Option<String>,
    open: HashMap<String, OpenTrip>,
    all: TripTotals,
    mode: TripTotals,
    hourly_all: [TripTotals; HOURS],
    hourly_mode: [TripTotals; HOURS],
}

impl TripAggregator {
    /// Creates an aggregator; a missing or blank `mode_filter` disables the
    /// mode-filtered category.
    pub fn new(mode_filter: Option<&str>) -> Self {
        let mode_filter = mode_filter
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string);

        Self {
            mode_filter,
            open: HashMap::new(),
            all: TripTotals::default(),
            mode: TripTotals::default(),
            hourly_all: [TripTotals::default(); HOURS],
            hourly_mode: [TripTotals::default(); HOURS],
        }
    }

    /// Records that `person` departed with `mode`, replacing any open trip.
    pub fn on_departure(&mut self, person: &str, time: f64, mode: &str) {
        self.open.insert(
            person.to_string(),
            OpenTrip {
                departed_at: time,
                mode: mode.to_string(),
            },
        );
    }

    /// Closes the open trip of `person`, if any.
    ///
    /// The trip is bucketed by its departure hour. It also counts towards the
    /// mode category when its departure mode equals the filter exactly.
    pub fn on_arrival(&mut self, person: &str, time: f64) {
        let Some(open) = self.open.remove(person) else {
            return;
        };

        let trip_time = elapsed(open.departed_at, time);
        let hour = hour_bucket(open.departed_at);

        self.all.add(trip_time);
        self.hourly_all[hour].add(trip_time);

        if self.mode_filter.as_deref() == Some(open.mode.as_str()) {
            self.mode.add(trip_time);
            self.hourly_mode[hour].add(trip_time);
        }
    }

    pub fn mode_filter(&self) -> Option<&str> {
        self.mode_filter.as_deref()
    }

    pub fn trips_all(&self) -> u64 {
        self.all.count
    }

    pub fn avg_trip_time_all(&self) -> Option<f64> {
        self.all.average()
    }

    pub fn trips_mode(&self) -> u64 {
        self.mode.count
    }

    pub fn avg_trip_time_mode(&self) -> Option<f64> {
        self.mode.average()
    }

    /// Totals per departure hour, 0 through 23.
    pub fn hourly(&self) -> impl Iterator<Item = HourBucket> + '_ {
        (0..HOURS).map(|hour| HourBucket {
            hour,
            all: self.hourly_all[hour],
            mode: self.hourly_mode[hour],
        })
    }

    /// People still on a leg.
    pub fn pending(&self) -> usize {
        self.open.len()
    }
}

impl EventHandler for TripAggregator {
    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::PersonDeparture { time, person, mode } => self.on_departure(person, *time, mode),
            Event::PersonArrival { time, person, .. } => self.on_arrival(person, *time),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_trip_with_matching_filter() {
        let mut agg = TripAggregator::new(Some("car"));

        agg.on_departure("p1", 0.0, "car");
        agg.on_arrival("p1", 100.0);

        assert_eq!(agg.trips_all(), 1);
        assert_eq!(agg.avg_trip_time_all(), Some(100.0));
        assert_eq!(agg.trips_mode(), 1);
        assert_eq!(agg.avg_trip_time_mode(), Some(100.0));

        let hour0 = agg.hourly().next().unwrap();
        assert_eq!(hour0.hour, 0);
        assert_eq!(hour0.all.count, 1);
        assert_eq!(hour0.all.average(), Some(100.0));
        assert_eq!(hour0.mode.count, 1);
        assert_eq!(hour0.mode.average(), Some(100.0));
    }

    #[test]
    fn test_mode_filter_is_exact_and_case_sensitive() {
        for (filter, expected) in [("car", 1), ("Car", 0), ("bike", 0)] {
            let mut agg = TripAggregator::new(Some(filter));
            agg.on_departure("p1", 0.0, "car");
            agg.on_arrival("p1", 60.0);

            assert_eq!(agg.trips_all(), 1, "filter {filter}");
            assert_eq!(agg.trips_mode(), expected, "filter {filter}");
        }
    }

    #[test]
    fn test_blank_filter_disables_mode_category() {
        let mut agg = TripAggregator::new(Some("   "));
        assert_eq!(agg.mode_filter(), None);

        agg.on_departure("p1", 0.0, "   ");
        agg.on_arrival("p1", 60.0);

        assert_eq!(agg.trips_all(), 1);
        assert_eq!(agg.trips_mode(), 0);
        assert_eq!(agg.avg_trip_time_mode(), None);
    }

    #[test]
    fn test_no_trips_gives_undefined_averages() {
        let agg = TripAggregator::new(Some("car"));

        assert_eq!(agg.trips_all(), 0);
        assert_eq!(agg.avg_trip_time_all(), None);
        assert_eq!(agg.avg_trip_time_mode(), None);
        let undefined = |t: TripTotals| t.average().is_none();
        assert!(agg.hourly().all(|b| undefined(b.all) && undefined(b.mode)));
    }

    #[test]
    fn test_arrival_without_departure_is_ignored() {
        let mut agg = TripAggregator::new(None);

        agg.on_arrival("p1", 100.0);

        assert_eq!(agg.trips_all(), 0);
        assert_eq!(agg.avg_trip_time_all(), None);
        assert_eq!(agg.pending(), 0);
    }

    #[test]
    fn test_repeated_departure_overwrites_open_trip() {
        let mut agg = TripAggregator::new(Some("car"));

        agg.on_departure("p1", 0.0, "car");
        agg.on_departure("p1", 7200.0, "walk");
        agg.on_arrival("p1", 7500.0);

        assert_eq!(agg.trips_all(), 1);
        assert_eq!(agg.avg_trip_time_all(), Some(300.0));
        assert_eq!(agg.trips_mode(), 0);

        let buckets: Vec<_> = agg.hourly().collect();
        assert_eq!(buckets[0].all.count, 0);
        assert_eq!(buckets[2].all.count, 1);
    }

    #[test]
    fn test_trip_is_bucketed_by_departure_hour() {
        let mut agg = TripAggregator::new(None);

        agg.on_departure("p1", 3500.0, "car");
        agg.on_arrival("p1", 3700.0);

        let buckets: Vec<_> = agg.hourly().collect();
        assert_eq!(buckets[0].all.count, 1);
        assert_eq!(buckets[1].all.count, 0);
    }

    #[test]
    fn test_late_departures_land_in_last_hour() {
        let mut agg = TripAggregator::new(None);

        agg.on_departure("p1", 26.0 * 3600.0, "car");
        agg.on_arrival("p1", 26.0 * 3600.0 + 60.0);

        let buckets: Vec<_> = agg.hourly().collect();
        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets[23].all.count, 1);
    }

    #[test]
    fn test_hourly_counts_sum_to_totals() {
        let mut agg = TripAggregator::new(Some("car"));
        let trips = [
            ("p1", 0.0, 600.0, "car"),
            ("p2", 3600.0 * 7.2, 3600.0 * 7.5, "pt"),
            ("p3", 3600.0 * 7.9, 3600.0 * 8.1, "car"),
            ("p4", 3600.0 * 17.0, 3600.0 * 17.3, "bike"),
            ("p5", 3600.0 * 25.0, 3600.0 * 25.5, "car"),
        ];
        for (person, dep, arr, mode) in trips {
            agg.on_departure(person, dep, mode);
            agg.on_arrival(person, arr);
        }

        let all: u64 = agg.hourly().map(|b| b.all.count).sum();
        let mode: u64 = agg.hourly().map(|b| b.mode.count).sum();
        assert_eq!(all, agg.trips_all());
        assert_eq!(mode, agg.trips_mode());
        assert_eq!(agg.trips_all(), 5);
        assert_eq!(agg.trips_mode(), 3);
    }

    #[test]
    fn test_negative_trip_time_is_clamped() {
        let mut agg = TripAggregator::new(None);

        agg.on_departure("p1", 100.0, "car");
        agg.on_arrival("p1", 90.0);

        assert_eq!(agg.trips_all(), 1);
        assert_eq!(agg.avg_trip_time_all(), Some(0.0));
    }
}
