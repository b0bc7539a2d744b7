/// Number of hour-of-day buckets.
pub const HOURS: usize = 24;

/// Computes `sum / count`, or `None` when there is nothing to average.
pub fn average(sum: f64, count: u64) -> Option<f64> {
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Maps a time in seconds since midnight to its hour-of-day bucket.
///
/// Times before midnight land in hour 0, times past the end of the day in
/// hour 23.
pub fn hour_bucket(time: f64) -> usize {
    (time / 3600.0).floor().clamp(0.0, (HOURS - 1) as f64) as usize
}

/// Elapsed seconds between two events, never negative.
pub fn elapsed(start: f64, end: f64) -> f64 {
    (end - start).max(0.0)
}
