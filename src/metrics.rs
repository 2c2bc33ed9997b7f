//! Metrics module - Timing statistics for firings and reader waits

use hdrhistogram::Histogram;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ============================================================================
// DEVICE METRICS - Thread-safe timing and event counters
// ============================================================================

#[derive(Clone)]
pub struct DeviceMetrics {
    firing_interval_hist: Arc<Mutex<Histogram<u64>>>,
    wait_hist: Arc<Mutex<Histogram<u64>>>,
    last_firing: Arc<Mutex<Option<Instant>>>,
    firings: Arc<AtomicU64>,
    drains: Arc<AtomicU64>,
    raced_reads: Arc<AtomicU64>,
    interruptions: Arc<AtomicU64>,
}

impl DeviceMetrics {
    pub fn new() -> Self {
        Self {
            firing_interval_hist: Arc::new(Mutex::new(Histogram::new(3).unwrap())),
            wait_hist: Arc::new(Mutex::new(Histogram::new(3).unwrap())),
            last_firing: Arc::new(Mutex::new(None)),
            firings: Arc::new(AtomicU64::new(0)),
            drains: Arc::new(AtomicU64::new(0)),
            raced_reads: Arc::new(AtomicU64::new(0)),
            interruptions: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_firing(&self) {
        let now = Instant::now();
        let mut last = self.last_firing.lock();
        if let Some(prev) = last.replace(now) {
            let interval = now.duration_since(prev);
            self.firing_interval_hist
                .lock()
                .record(interval.as_nanos() as u64)
                .ok();
        }
        self.firings.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_wait(&self, duration: Duration) {
        self.wait_hist
            .lock()
            .record(duration.as_nanos() as u64)
            .ok();
    }

    pub fn incr_drain(&self) {
        self.drains.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_raced_read(&self) {
        self.raced_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_interrupted(&self) {
        self.interruptions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn firings(&self) -> u64 {
        self.firings.load(Ordering::Relaxed)
    }

    pub fn drains(&self) -> u64 {
        self.drains.load(Ordering::Relaxed)
    }

    pub fn raced_reads(&self) -> u64 {
        self.raced_reads.load(Ordering::Relaxed)
    }

    pub fn interruptions(&self) -> u64 {
        self.interruptions.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> MetricsReport {
        let intervals = self.firing_interval_hist.lock();
        let waits = self.wait_hist.lock();

        MetricsReport {
            firing_interval_p50: Duration::from_nanos(intervals.value_at_quantile(0.5)),
            firing_interval_p99: Duration::from_nanos(intervals.value_at_quantile(0.99)),
            wait_p50: Duration::from_nanos(waits.value_at_quantile(0.5)),
            wait_p99: Duration::from_nanos(waits.value_at_quantile(0.99)),
            firings: self.firings(),
            drains: self.drains(),
            raced_reads: self.raced_reads(),
            interruptions: self.interruptions(),
        }
    }
}

impl Default for DeviceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// METRICS REPORT - Summary statistics
// ============================================================================

#[derive(Debug)]
pub struct MetricsReport {
    pub firing_interval_p50: Duration,
    pub firing_interval_p99: Duration,
    pub wait_p50: Duration,
    pub wait_p99: Duration,
    pub firings: u64,
    pub drains: u64,
    pub raced_reads: u64,
    pub interruptions: u64,
}
