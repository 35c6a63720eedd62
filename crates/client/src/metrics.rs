//! Client metrics collection.
//!
//! Records through the `metrics` facade; the embedding application installs
//! whatever recorder or exporter it uses.

use metrics::{counter, histogram};
use std::time::Instant;

/// Record the outcome of one executed batch.
pub fn record_batch(kind: &'static str, operations: usize, failures: usize, duration_secs: f64) {
    counter!("farm_batch_operations_total", "kind" => kind).increment(operations as u64);
    if failures > 0 {
        counter!("farm_batch_failures_total", "kind" => kind).increment(failures as u64);
    }
    histogram!("farm_batch_duration_seconds", "kind" => kind).record(duration_secs);
}

/// Record remote request duration.
pub fn record_request_duration(endpoint: &str, duration_secs: f64) {
    histogram!(
        "farm_request_duration_seconds",
        "endpoint" => endpoint.to_string()
    )
    .record(duration_secs);
}

/// A helper to time remote requests and record metrics.
///
/// Usage:
/// ```ignore
/// let timer = RequestTimer::new("list_animals");
/// let result = self.get_json("/sheep/").await;
/// timer.record();
/// result
/// ```
pub struct RequestTimer {
    endpoint: String,
    start: Instant,
}

impl RequestTimer {
    /// Create a new timer for the given endpoint name.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_request_duration(&self.endpoint, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_timer_creation() {
        let timer = RequestTimer::new("list_groups");
        assert_eq!(timer.endpoint, "list_groups");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_batch("membership", 3, 1, 0.25);
        RequestTimer::new(String::from("list_sensors")).record();
    }
}
