use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Identifier of the built-in hashing routine.
pub const ALGORITHM_FNV1A_64: &str = "fnv1a-64";

/// Hashes per deadline check inside a worker loop.
const HASH_BATCH: u64 = 1_024;

/// Raw aggregate counters returned by an engine run.
///
/// This is the untrusted shape coming across the engine boundary; it is
/// normalized and validated into a
/// [`BenchmarkResult`](crate::models::BenchmarkResult) by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineReport {
    pub hash_count: u64,
    pub duration: Duration,
    pub threads: usize,
    pub algorithm: String,
}

/// Errors that can occur at the engine boundary.
///
/// A single failure is terminal for the run; the orchestrator never retries.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("benchmark duration must be greater than zero")]
    InvalidDuration,

    #[error("native benchmark module unavailable: {0}")]
    Unavailable(String),

    #[error("hash worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("engine returned a malformed report: {0}")]
    MalformedReport(String),
}

/// Call boundary to the hashing engine and its device queries.
///
/// The engine is opaque: it exposes no incremental progress channel, only a
/// final aggregate report. Implementations may be multi-threaded internally;
/// the orchestrator treats them as a black box that eventually resolves or
/// rejects.
///
/// # Design Philosophy
///
/// - **Stateless**: All operations take explicit parameters; no hidden state
/// - **Framework-agnostic**: No UI dependencies, works with any frontend
/// - **Async**: `run_benchmark` suspends the caller without blocking the
///   cooperative event loop
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BenchmarkEngine: Send + Sync {
    /// Number of logical cores available to the engine. Always >= 1.
    fn core_count(&self) -> usize;

    /// Hash for `duration`, then resolve with the aggregate counters.
    async fn run_benchmark(&self, duration: Duration) -> Result<EngineReport, EngineError>;
}

/// Default multi-threaded FNV-1a engine.
///
/// Spawns one OS worker per logical core (or a configured count); each worker
/// hashes a private counter stream until the deadline and reports how many
/// hash operations it completed. Workers run under
/// [`tokio::task::spawn_blocking`] so the async runtime stays responsive for
/// the full run duration.
pub struct NativeHashEngine {
    threads: usize,
}

impl NativeHashEngine {
    /// Create an engine using one worker per logical core.
    pub fn new() -> Self {
        Self {
            threads: num_cpus::get().max(1),
        }
    }

    /// Create an engine with an explicit worker count.
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
        }
    }
}

impl Default for NativeHashEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BenchmarkEngine for NativeHashEngine {
    fn core_count(&self) -> usize {
        num_cpus::get().max(1)
    }

    async fn run_benchmark(&self, duration: Duration) -> Result<EngineReport, EngineError> {
        if duration.is_zero() {
            return Err(EngineError::InvalidDuration);
        }

        let threads = self.threads;
        tracing::info!(
            "Starting hash workload: {} threads for {:.2}s",
            threads,
            duration.as_secs_f32()
        );

        let report = tokio::task::spawn_blocking(move || run_hash_workload(threads, duration))
            .await
            .map_err(|e| EngineError::WorkerPanicked(e.to_string()))??;

        tracing::info!(
            "Hash workload finished: {} hashes in {:.2}s across {} threads",
            report.hash_count,
            report.duration.as_secs_f32(),
            report.threads
        );

        Ok(report)
    }
}

/// Run the FNV-1a workload on `threads` OS threads until the deadline.
fn run_hash_workload(threads: usize, duration: Duration) -> Result<EngineReport, EngineError> {
    let start = Instant::now();
    let deadline = start + duration;

    let workers: Vec<_> = (0..threads)
        .map(|worker| {
            std::thread::spawn(move || {
                let mut hash = 0xcbf2_9ce4_8422_2325u64 ^ (worker as u64).wrapping_mul(0x9e37);
                let mut count: u64 = 0;

                while Instant::now() < deadline {
                    for _ in 0..HASH_BATCH {
                        hash = fnv1a_64(count ^ hash);
                        count += 1;
                    }
                }

                (count, hash)
            })
        })
        .collect();

    let mut hash_count: u64 = 0;
    let mut sink: u64 = 0;
    for worker in workers {
        let (count, hash) = worker
            .join()
            .map_err(|_| EngineError::WorkerPanicked("hash worker thread".to_string()))?;
        hash_count += count;
        sink ^= hash;
    }

    // Keep the hash chain observable so the loops cannot be optimized away.
    std::hint::black_box(sink);

    Ok(EngineReport {
        hash_count,
        duration: start.elapsed(),
        threads,
        algorithm: ALGORITHM_FNV1A_64.to_string(),
    })
}

/// One FNV-1a 64 hash of the little-endian bytes of `value`.
#[inline]
pub fn fnv1a_64(value: u64) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for byte in value.to_le_bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
