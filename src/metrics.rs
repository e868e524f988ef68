// Performance metrics module
//
// Provides lightweight counters for monitoring the run lifecycle

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Run lifecycle metrics
///
/// Uses atomic operations for thread-safe tracking without locks. Counters
/// are collected throughout the application lifecycle and can be logged on
/// shutdown for performance analysis.
#[derive(Debug)]
pub struct Metrics {
    /// Runs that entered the `Running` state
    pub runs_started: AtomicUsize,

    /// Runs that reached `Completed`
    pub runs_completed: AtomicUsize,

    /// Runs that ended in an engine failure
    pub runs_failed: AtomicUsize,

    /// Cumulative engine run time in milliseconds
    pub total_run_time_ms: AtomicU64,

    /// Handoffs scheduled after completed runs
    pub handoffs_scheduled: AtomicU64,

    /// Handoffs cancelled before the delay elapsed
    pub handoffs_cancelled: AtomicU64,

    /// Payloads injected into the embedded web view
    pub payloads_injected: AtomicU64,

    /// Application start time
    start_time: Instant,
}

impl Metrics {
    /// Create a new Metrics instance
    pub fn new() -> Self {
        Self {
            runs_started: AtomicUsize::new(0),
            runs_completed: AtomicUsize::new(0),
            runs_failed: AtomicUsize::new(0),
            total_run_time_ms: AtomicU64::new(0),
            handoffs_scheduled: AtomicU64::new(0),
            handoffs_cancelled: AtomicU64::new(0),
            payloads_injected: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a run entering the `Running` state
    pub fn record_run_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed run and its wall-clock duration
    pub fn record_run_completed(&self, duration: Duration) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
        self.total_run_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record a failed run
    pub fn record_run_failed(&self) {
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a scheduled handoff
    pub fn record_handoff_scheduled(&self) {
        self.handoffs_scheduled.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cancelled handoff
    pub fn record_handoff_cancelled(&self) {
        self.handoffs_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a payload injection
    pub fn record_payload_injected(&self) {
        self.payloads_injected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get average run time in milliseconds
    pub fn avg_run_time_ms(&self) -> f64 {
        let total = self.total_run_time_ms.load(Ordering::Relaxed);
        let count = self.runs_completed.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Run Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Runs: {} started, {} completed, {} failed",
            self.runs_started.load(Ordering::Relaxed),
            self.runs_completed.load(Ordering::Relaxed),
            self.runs_failed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Total run time: {:.2}s (avg: {:.2}ms per run)",
            self.total_run_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_run_time_ms()
        );
        tracing::info!(
            "Handoffs: {} scheduled, {} cancelled, {} payloads injected",
            self.handoffs_scheduled.load(Ordering::Relaxed),
            self.handoffs_cancelled.load(Ordering::Relaxed),
            self.payloads_injected.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.runs_started.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.runs_completed.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.avg_run_time_ms(), 0.0);
    }

    #[test]
    fn test_record_run_lifecycle() {
        let metrics = Metrics::new();

        metrics.record_run_started();
        metrics.record_run_started();
        metrics.record_run_completed(Duration::from_millis(5_000));
        metrics.record_run_failed();

        assert_eq!(metrics.runs_started.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.runs_completed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.runs_failed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.avg_run_time_ms(), 5_000.0);
    }

    #[test]
    fn test_record_handoffs() {
        let metrics = Metrics::new();

        metrics.record_handoff_scheduled();
        metrics.record_handoff_scheduled();
        metrics.record_handoff_cancelled();
        metrics.record_payload_injected();

        assert_eq!(metrics.handoffs_scheduled.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.handoffs_cancelled.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.payloads_injected.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_uptime_advances() {
        let metrics = Metrics::new();
        std::thread::sleep(Duration::from_millis(5));
        assert!(metrics.uptime() >= Duration::from_millis(5));
    }
}
