//! Streaming reducers over the simulation event log.
//!
//! [`TraversalAggregator`] pairs link enter/leave events per vehicle into
//! distance and time traveled. [`TripAggregator`] pairs departure/arrival
//! events per person into trip counts, trip times and hourly buckets.
//!
//! Both keep one open interval per key. A repeated start overwrites the open
//! interval and an end without an open interval is ignored.

pub mod traversal;
pub mod trip;
pub mod utility;

pub use traversal::TraversalAggregator;
pub use trip::{HourBucket, TripAggregator, TripTotals};
