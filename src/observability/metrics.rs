//! Request-loop metrics collection
//!
//! Thread-safe collector using atomic counters and a mutex-protected
//! timing vector. Instances are created at bootstrap and injected into the
//! worker; there is no process-wide singleton.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Thread-safe metrics collector for the request loop
#[derive(Debug, Default)]
pub struct MetricsCollector {
    requests_received: AtomicU64,
    responses_success: AtomicU64,
    responses_failure: AtomicU64,
    requests_dropped: AtomicU64,

    // Processing times in milliseconds (mutex protected)
    processing_times: Mutex<Vec<u64>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_received(&self) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a reply envelope handed to the transport
    pub fn response_sent(&self, success: bool) {
        if success {
            self.responses_success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.responses_failure.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a request dropped without a reply (undecodable input)
    pub fn request_dropped(&self) {
        self.requests_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_processing_time(&self, duration: Duration) {
        if let Ok(mut times) = self.processing_times.lock() {
            times.push(duration.as_millis() as u64);

            // Limit to last 1000 measurements to prevent unbounded growth
            if times.len() > 1000 {
                times.remove(0);
            }
        }
    }

    /// Calculate processing time statistics (pure function)
    fn calculate_processing_time_statistics(&self) -> (f64, f64, f64) {
        if let Ok(times) = self.processing_times.lock() {
            if times.is_empty() {
                (0.0, 0.0, 0.0)
            } else {
                let mut sorted_times = times.clone();
                sorted_times.sort_unstable();

                let avg = sorted_times.iter().sum::<u64>() as f64 / sorted_times.len() as f64;
                let p50 = percentile(&sorted_times, 50.0);
                let p95 = percentile(&sorted_times, 95.0);

                (avg, p50, p95)
            }
        } else {
            (0.0, 0.0, 0.0)
        }
    }

    /// Get complete metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        let (avg_processing_time_ms, p50, p95) = self.calculate_processing_time_statistics();

        MetricsSnapshot {
            requests_received: self.requests_received.load(Ordering::Relaxed),
            responses_success: self.responses_success.load(Ordering::Relaxed),
            responses_failure: self.responses_failure.load(Ordering::Relaxed),
            requests_dropped: self.requests_dropped.load(Ordering::Relaxed),
            avg_processing_time_ms,
            processing_time_p50_ms: p50,
            processing_time_p95_ms: p95,
        }
    }
}

/// Point-in-time view of the collector
#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub requests_received: u64,
    pub responses_success: u64,
    pub responses_failure: u64,
    pub requests_dropped: u64,
    pub avg_processing_time_ms: f64,
    pub processing_time_p50_ms: f64,
    pub processing_time_p95_ms: f64,
}

fn percentile(sorted_data: &[u64], percentile: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }

    let len = sorted_data.len();
    let index = (percentile / 100.0) * (len - 1) as f64;

    if index.fract() == 0.0 {
        sorted_data[index as usize] as f64
    } else {
        let lower_index = index.floor() as usize;
        let upper_index = index.ceil() as usize;
        let lower_value = sorted_data[lower_index] as f64;
        let upper_value = sorted_data[upper_index] as f64;

        lower_value + (upper_value - lower_value) * index.fract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_request_counters() {
        let collector = MetricsCollector::new();

        collector.request_received();
        collector.response_sent(true);
        collector.request_received();
        collector.response_sent(false);
        collector.request_dropped();

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.requests_received, 2);
        assert_eq!(snapshot.responses_success, 1);
        assert_eq!(snapshot.responses_failure, 1);
        assert_eq!(snapshot.requests_dropped, 1);
    }

    #[test]
    fn test_processing_time_statistics() {
        let collector = MetricsCollector::new();

        collector.record_processing_time(Duration::from_millis(100));
        collector.record_processing_time(Duration::from_millis(200));
        collector.record_processing_time(Duration::from_millis(300));

        let snapshot = collector.snapshot();
        assert!((snapshot.avg_processing_time_ms - 200.0).abs() < 0.1);
        assert!((snapshot.processing_time_p50_ms - 200.0).abs() < 0.1);
    }

    #[test]
    fn test_processing_time_bounds() {
        let collector = MetricsCollector::new();

        // Add more than 1000 processing times
        for i in 0..1500 {
            collector.record_processing_time(Duration::from_millis(i));
        }

        let snapshot = collector.snapshot();
        assert!(snapshot.avg_processing_time_ms > 0.0);
    }

    #[test]
    fn test_thread_safety() {
        let collector = Arc::new(MetricsCollector::new());

        let mut handles = vec![];
        for _ in 0..10 {
            let collector_clone = Arc::clone(&collector);
            let handle = thread::spawn(move || {
                for _ in 0..100 {
                    collector_clone.request_received();
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(collector.snapshot().requests_received, 1000);
    }

    #[test]
    fn test_percentile_calculation() {
        let data = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

        let p50 = percentile(&data, 50.0);
        let p95 = percentile(&data, 95.0);
        let p0 = percentile(&data, 0.0);
        let p100 = percentile(&data, 100.0);

        assert!((p50 - 5.5).abs() < 0.1, "P50: expected ~5.5, got {p50}");
        assert!((p95 - 9.5).abs() < 0.1, "P95: expected ~9.5, got {p95}");
        assert!((p0 - 1.0).abs() < 0.1, "P0: expected ~1.0, got {p0}");
        assert!((p100 - 10.0).abs() < 0.1, "P100: expected ~10.0, got {p100}");

        assert_eq!(percentile(&[], 50.0), 0.0);
    }
}
