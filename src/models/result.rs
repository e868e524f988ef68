use crate::services::engine::{EngineError, EngineReport};
use serde::{Deserialize, Serialize};

/// Normalized result of a completed benchmark run.
///
/// Produced by [`from_report`](Self::from_report) at the engine boundary. The
/// rate fields are always re-derived from the raw hash count and wall-clock
/// duration, so `mega_hashes_per_second * 1000 == kilo_hashes_per_second`
/// holds up to floating rounding regardless of what the engine claims.
///
/// # Related Types
///
/// - [`crate::services::engine::EngineReport`]: The raw counters this is built from
/// - [`crate::models::RunState`]: Carries the result while in `Completed`
/// - [`crate::orchestrator::bridge::BridgePayload`]: The subset delivered to the web view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Total hash operations performed across all worker threads
    pub hash_count: u64,

    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: f64,

    /// Worker thread count used by the engine
    pub threads: usize,

    /// Throughput in kilo-hashes per second
    pub kilo_hashes_per_second: f64,

    /// Throughput in mega-hashes per second
    pub mega_hashes_per_second: f64,

    /// Identifier of the hashing routine used (opaque to the orchestrator)
    pub algorithm: String,
}

impl BenchmarkResult {
    /// Normalize a raw engine report into a [`BenchmarkResult`].
    ///
    /// This is the single validation point for the engine boundary: reports
    /// with a zero duration or zero threads are rejected here instead of
    /// being shape-checked at every call site.
    pub fn from_report(report: EngineReport) -> Result<Self, EngineError> {
        if report.duration.is_zero() {
            return Err(EngineError::MalformedReport(
                "run duration is zero".to_string(),
            ));
        }
        if report.threads == 0 {
            return Err(EngineError::MalformedReport(
                "thread count is zero".to_string(),
            ));
        }

        let duration_secs = report.duration.as_secs_f64();
        let kilo = report.hash_count as f64 / duration_secs / 1_000.0;

        Ok(Self {
            hash_count: report.hash_count,
            duration_ms: duration_secs * 1_000.0,
            threads: report.threads,
            kilo_hashes_per_second: kilo,
            mega_hashes_per_second: kilo / 1_000.0,
            algorithm: report.algorithm,
        })
    }
}
