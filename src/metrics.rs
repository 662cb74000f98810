//! Metrics collection for completion requests
//!
//! Metrics are stored in-memory and logged as a summary when the process
//! shuts down.
//!
//! ## Metrics Tracked
//!
//! - Completion requests and the cache hit rate
//! - Sessions opened and suggestions accepted
//! - Per-operation latencies (classification, computation, ...)
//!
//! ## Design
//!
//! - Lock-free atomic counters for per-keystroke operations
//! - DashMap for low-contention histogram storage
//! - Running totals per operation plus a bounded window of recent samples,
//!   so a long-lived server does not grow without limit

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use dashmap::DashMap;

/// Global metrics registry (singleton)
static METRICS: once_cell::sync::Lazy<Arc<Metrics>> = once_cell::sync::Lazy::new(|| {
    Arc::new(Metrics::new())
});

/// Recent samples kept per operation for percentiles
pub const MAX_TIMING_SAMPLES: usize = 1024;

/// Timings of one operation: all-time totals and the most recent samples
#[derive(Debug, Default)]
struct TimingSamples {
    count: u64,
    sum_micros: u64,
    min_micros: u64,
    max_micros: u64,
    recent: VecDeque<u64>,
}

impl TimingSamples {
    fn record(&mut self, micros: u64) {
        if self.count == 0 {
            self.min_micros = micros;
            self.max_micros = micros;
        } else {
            self.min_micros = self.min_micros.min(micros);
            self.max_micros = self.max_micros.max(micros);
        }
        self.count += 1;
        self.sum_micros = self.sum_micros.saturating_add(micros);

        if self.recent.len() == MAX_TIMING_SAMPLES {
            self.recent.pop_front();
        }
        self.recent.push_back(micros);
    }

    fn stats(&self) -> Option<OperationStats> {
        if self.count == 0 {
            return None;
        }
        let mut sorted: Vec<u64> = self.recent.iter().copied().collect();
        sorted.sort_unstable();
        let retained = sorted.len();
        let p95_idx = (retained as f64 * 0.95) as usize;

        Some(OperationStats {
            count: self.count,
            retained,
            min_micros: self.min_micros,
            max_micros: self.max_micros,
            mean_micros: self.sum_micros / self.count,
            p50_micros: sorted[retained / 2],
            p95_micros: sorted[p95_idx.min(retained - 1)],
        })
    }
}

/// Get the global metrics instance
pub fn metrics() -> &'static Arc<Metrics> {
    &METRICS
}

/// Completion metrics registry
#[derive(Debug)]
pub struct Metrics {
    // Engine
    completion_requests: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,

    // Session controller
    sessions_opened: AtomicU64,
    accepts: AtomicU64,
    cancels: AtomicU64,

    // Timing histograms (operation name -> durations in microseconds)
    operation_timings: DashMap<String, TimingSamples>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            completion_requests: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            sessions_opened: AtomicU64::new(0),
            accepts: AtomicU64::new(0),
            cancels: AtomicU64::new(0),
            operation_timings: DashMap::new(),
        }
    }

    /// Records a completion request answered from the cache (`hit`) or computed
    pub fn record_completion(&self, hit: bool) {
        self.completion_requests.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Gets the cache hit rate (0.0 to 1.0)
    pub fn cache_hit_rate(&self) -> f64 {
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);
        let total = hits + misses;

        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn record_session_opened(&self) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_accept(&self) {
        self.accepts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancel(&self) {
        self.cancels.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the timing of an operation
    ///
    /// # Arguments
    /// * `operation` - Name of the operation (e.g., "classify", "compute_suggestions")
    /// * `duration` - Duration of the operation
    pub fn record_timing(&self, operation: &str, duration: Duration) {
        let micros = duration.as_micros() as u64;

        match self.operation_timings.get_mut(operation) {
            Some(mut samples) => samples.record(micros),
            None => self
                .operation_timings
                .entry(operation.to_string())
                .or_default()
                .record(micros),
        }
    }

    /// Gets summary statistics for an operation
    ///
    /// Count, min, max and mean cover every sample; percentiles cover the
    /// last `MAX_TIMING_SAMPLES`.
    pub fn operation_stats(&self, operation: &str) -> Option<OperationStats> {
        self.operation_timings
            .get(operation)
            .and_then(|samples| samples.stats())
    }

    /// Gets a summary report of all counters
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            completion_requests: self.completion_requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_hit_rate: self.cache_hit_rate(),
            sessions_opened: self.sessions_opened.load(Ordering::Relaxed),
            accepts: self.accepts.load(Ordering::Relaxed),
            cancels: self.cancels.load(Ordering::Relaxed),
            operations: self
                .operation_timings
                .iter()
                .filter_map(|entry| Some((entry.key().clone(), entry.value().stats()?)))
                .collect(),
        }
    }

    /// Resets all metrics (useful for testing)
    pub fn reset(&self) {
        self.completion_requests.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.sessions_opened.store(0, Ordering::Relaxed);
        self.accepts.store(0, Ordering::Relaxed);
        self.cancels.store(0, Ordering::Relaxed);
        self.operation_timings.clear();
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics for a single operation
#[derive(Debug, Clone, serde::Serialize)]
pub struct OperationStats {
    pub count: u64,
    /// Samples the percentiles are computed from
    pub retained: usize,
    pub min_micros: u64,
    pub max_micros: u64,
    pub mean_micros: u64,
    pub p50_micros: u64,  // Median
    pub p95_micros: u64,
}

/// Snapshot of all counters
#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub completion_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
    pub sessions_opened: u64,
    pub accepts: u64,
    pub cancels: u64,
    pub operations: BTreeMap<String, OperationStats>,
}

/// RAII guard recording the duration of a scope into the global registry
///
/// ```
/// use extendscript_console::metrics::TimingGuard;
///
/// fn classify_document() {
///     let _guard = TimingGuard::new("classify");
///     // Duration recorded when _guard is dropped
/// }
/// ```
pub struct TimingGuard {
    operation: &'static str,
    start: Instant,
}

impl TimingGuard {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        metrics().record_timing(self.operation, self.start.elapsed());
    }
}
