use std::collections::HashMap;

use crate::analyzers::utility::elapsed;
use crate::events::{Event, EventHandler};
use crate::network::Network;

/// A vehicle currently on a link.
#[derive(Debug, Clone)]
struct OpenTraversal {
    entered_at: f64,
    link: String,
}

/// Accumulates vehicle distance and time traveled from link enter/leave pairs.
pub struct TraversalAggregator<'n> {
    network: &'n Network,
    open: HashMap<String, OpenTraversal>,
    total_distance_m: f64,
    total_time_s: f64,
}

impl<'n> TraversalAggregator<'n> {
    pub fn new(network: &'n Network) -> Self {
        Self {
            network,
            open: HashMap::new(),
            total_distance_m: 0.0,
            total_time_s: 0.0,
        }
    }

    /// Records that `vehicle` entered `link`, replacing any open traversal.
    pub fn on_start(&mut self, vehicle: &str, time: f64, link: &str) {
        self.open.insert(
            vehicle.to_string(),
            OpenTraversal {
                entered_at: time,
                link: link.to_string(),
            },
        );
    }

    /// Closes the open traversal of `vehicle`, if any.
    ///
    /// Time always counts; distance only when the link is in the network.
    pub fn on_end(&mut self, vehicle: &str, time: f64) {
        let Some(open) = self.open.remove(vehicle) else {
            return;
        };

        self.total_time_s += elapsed(open.entered_at, time);

        if let Some(length) = self.network.link_length(&open.link) {
            self.total_distance_m += length;
        }
    }

    pub fn total_distance_meters(&self) -> f64 {
        self.total_distance_m
    }

    pub fn total_time_seconds(&self) -> f64 {
        self.total_time_s
    }

    /// Vehicles still on a link.
    pub fn pending(&self) -> usize {
        self.open.len()
    }
}

impl EventHandler for TraversalAggregator<'_> {
    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::LinkEnter {
                time,
                vehicle,
                link,
            } => self.on_start(vehicle, *time, link),
            Event::LinkLeave { time, vehicle, .. } => self.on_end(vehicle, *time),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network() -> Network {
        [("linkA".to_string(), 100.0), ("linkB".to_string(), 50.0)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_consecutive_links_accumulate() {
        let net = network();
        let mut agg = TraversalAggregator::new(&net);

        agg.on_start("v1", 0.0, "linkA");
        agg.on_end("v1", 10.0);
        agg.on_start("v1", 10.0, "linkB");
        agg.on_end("v1", 25.0);

        assert_eq!(agg.total_distance_meters(), 150.0);
        assert_eq!(agg.total_time_seconds(), 25.0);
        assert_eq!(agg.pending(), 0);
    }

    #[test]
    fn test_end_without_start_is_ignored() {
        let net = network();
        let mut agg = TraversalAggregator::new(&net);

        agg.on_end("v1", 10.0);

        assert_eq!(agg.total_distance_meters(), 0.0);
        assert_eq!(agg.total_time_seconds(), 0.0);
    }

    #[test]
    fn test_second_end_is_ignored() {
        let net = network();
        let mut agg = TraversalAggregator::new(&net);

        agg.on_start("v1", 0.0, "linkA");
        agg.on_end("v1", 10.0);
        agg.on_end("v1", 20.0);

        assert_eq!(agg.total_distance_meters(), 100.0);
        assert_eq!(agg.total_time_seconds(), 10.0);
    }

    #[test]
    fn test_repeated_start_overwrites_open_traversal() {
        let net = network();
        let mut agg = TraversalAggregator::new(&net);

        agg.on_start("v1", 0.0, "linkA");
        agg.on_start("v1", 5.0, "linkB");
        agg.on_end("v1", 20.0);

        // Only the second start (linkB, t=5) is paired.
        assert_eq!(agg.total_distance_meters(), 50.0);
        assert_eq!(agg.total_time_seconds(), 15.0);
        assert_eq!(agg.pending(), 0);
    }

    #[test]
    fn test_unknown_link_counts_time_only() {
        let net = network();
        let mut agg = TraversalAggregator::new(&net);

        agg.on_start("v1", 0.0, "nowhere");
        agg.on_end("v1", 30.0);

        assert_eq!(agg.total_distance_meters(), 0.0);
        assert_eq!(agg.total_time_seconds(), 30.0);
    }

    #[test]
    fn test_negative_duration_is_clamped() {
        let net = network();
        let mut agg = TraversalAggregator::new(&net);

        agg.on_start("v1", 50.0, "linkA");
        agg.on_end("v1", 40.0);

        assert_eq!(agg.total_distance_meters(), 100.0);
        assert_eq!(agg.total_time_seconds(), 0.0);
    }

    #[test]
    fn test_vehicles_are_tracked_independently() {
        let net = network();
        let mut agg = TraversalAggregator::new(&net);

        agg.on_start("v1", 0.0, "linkA");
        agg.on_start("v2", 2.0, "linkB");
        agg.on_end("v2", 4.0);
        assert_eq!(agg.pending(), 1);
        agg.on_end("v1", 8.0);

        assert_eq!(agg.total_distance_meters(), 150.0);
        assert_eq!(agg.total_time_seconds(), 10.0);
    }

    #[test]
    fn test_handle_event_ignores_trip_events() {
        let net = network();
        let mut agg = TraversalAggregator::new(&net);

        agg.handle_event(&Event::LinkEnter {
            time: 0.0,
            vehicle: "v1".to_string(),
            link: "linkA".to_string(),
        });
        agg.handle_event(&Event::PersonDeparture {
            time: 1.0,
            person: "v1".to_string(),
            mode: "car".to_string(),
        });
        agg.handle_event(&Event::LinkLeave {
            time: 12.0,
            vehicle: "v1".to_string(),
            link: "linkA".to_string(),
        });

        assert_eq!(agg.total_distance_meters(), 100.0);
        assert_eq!(agg.total_time_seconds(), 12.0);
    }
}
