// BenchmarkController - The run state machine
//
// This module contains the BenchmarkController which coordinates between:
// - StateManager (the single RunState cell)
// - BenchmarkEngine (opaque hashing routine)
// - ProgressEstimator (synthetic progress ramp)
// - ResultBridge (delayed web-view handoff)
//
// It owns every transition of the machine:
//   Idle -> Running -> Completed -> Idle (reset), and Running -> Idle on error.

use crate::metrics::Metrics;
use crate::models::{BenchmarkResult, BenchmarkSettings};
use crate::orchestrator::bridge::ResultBridge;
use crate::services::device;
use crate::services::engine::BenchmarkEngine;
use crate::services::progress::{EstimatorConfig, EstimatorConfigError, ProgressEstimator};
use crate::state::StateManager;
use std::sync::Arc;
use std::time::Duration;

/// Orchestrates benchmark runs against the engine boundary
///
/// The controller is the sole writer of run-state transitions. Presentation
/// reads state through [`state()`](Self::state) and triggers
/// [`start()`](Self::start) / [`reset()`](Self::reset); everything else is
/// event-driven.
///
/// # Reconciliation
///
/// The estimator and the engine race independently. The moment the engine
/// resolves, the estimator is cancelled and the `Running -> Completed`
/// transition commits immediately - displayed progress becomes 100 as part
/// of that same transition, never gated on the estimator's ramp.
///
/// # Example
/// ```ignore
/// let state = StateManager::new();
/// let metrics = Arc::new(Metrics::new());
/// let bridge = Arc::new(ResultBridge::new(host, state.clone(), delay, metrics.clone()));
/// let controller = BenchmarkController::new(
///     Arc::new(NativeHashEngine::new()),
///     bridge,
///     state,
///     &settings,
///     runtime.handle().clone(),
///     metrics,
/// )?;
/// controller.start();
/// ```
pub struct BenchmarkController {
    /// Shared run-state manager (the single source of truth)
    state: StateManager,

    /// Opaque engine boundary
    engine: Arc<dyn BenchmarkEngine>,

    /// Handoff bridge to the embedded web view
    bridge: Arc<ResultBridge>,

    /// How long the engine hashes per run
    run_duration: Duration,

    /// Validated estimator parameters
    estimator_config: EstimatorConfig,

    /// Handle to the tokio runtime for spawning the run task, so a
    /// synchronous presentation layer can call `start()` directly
    tokio_handle: tokio::runtime::Handle,

    metrics: Arc<Metrics>,
}

impl std::fmt::Debug for BenchmarkController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkController")
            .field("run_duration", &self.run_duration)
            .field("estimator_config", &self.estimator_config)
            .finish_non_exhaustive()
    }
}

impl BenchmarkController {
    /// Create a controller from validated settings.
    ///
    /// Invalid estimator parameters (zero tick, step outside 1..=100) are
    /// programmer errors and fail here rather than at the first run.
    pub fn new(
        engine: Arc<dyn BenchmarkEngine>,
        bridge: Arc<ResultBridge>,
        state: StateManager,
        settings: &BenchmarkSettings,
        tokio_handle: tokio::runtime::Handle,
        metrics: Arc<Metrics>,
    ) -> Result<Self, EstimatorConfigError> {
        let estimator_config =
            EstimatorConfig::new(settings.progress_tick(), settings.progress_step)?;

        Ok(Self {
            state,
            engine,
            bridge,
            run_duration: settings.run_duration(),
            estimator_config,
            tokio_handle,
            metrics,
        })
    }

    /// Read access to the run state for presentation.
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Start a benchmark run.
    ///
    /// Valid from `Idle` and from `Completed` ("run again"); a no-op while a
    /// run is already in flight, so at most one run races the estimator at a
    /// time.
    ///
    /// # Returns
    /// `true` if a run was started
    pub fn start(&self) -> bool {
        if !self.state.try_begin_run() {
            tracing::warn!("start() ignored - a benchmark run is already in flight");
            return false;
        }

        // A payload still pending from the previous run must not outlive it.
        self.bridge.cancel_pending();
        self.metrics.record_run_started();

        let state = self.state.clone();
        let engine = Arc::clone(&self.engine);
        let bridge = Arc::clone(&self.bridge);
        let metrics = Arc::clone(&self.metrics);
        let run_duration = self.run_duration;
        let estimator_config = self.estimator_config;

        self.tokio_handle.spawn(async move {
            Self::run_to_completion(state, engine, bridge, metrics, run_duration, estimator_config)
                .await;
        });

        true
    }

    /// Clear a retained result: `Completed -> Idle`.
    ///
    /// Also invalidates the pending handoff timer together with its captured
    /// payload. A no-op in any other state.
    ///
    /// # Returns
    /// `true` if a result was cleared
    pub fn reset(&self) -> bool {
        if self.state.clear_result() {
            self.bridge.cancel_pending();
            tracing::info!("Benchmark state reset");
            true
        } else {
            tracing::debug!("reset() ignored - no completed result to clear");
            false
        }
    }

    /// Drive one run from `Running` to its terminal transition.
    ///
    /// The estimator and the engine call run concurrently; whichever way the
    /// engine resolves, the estimator is stopped first and the single state
    /// write that follows is what presentation observes.
    async fn run_to_completion(
        state: StateManager,
        engine: Arc<dyn BenchmarkEngine>,
        bridge: Arc<ResultBridge>,
        metrics: Arc<Metrics>,
        run_duration: Duration,
        estimator_config: EstimatorConfig,
    ) {
        tracing::info!(
            "Benchmark run started: {:.0}s on the engine boundary",
            run_duration.as_secs_f32()
        );

        let estimator = ProgressEstimator::spawn(estimator_config, state.clone());

        match engine.run_benchmark(run_duration).await {
            Ok(report) => {
                estimator.cancel();

                match BenchmarkResult::from_report(report) {
                    Ok(result) => {
                        let info = device::probe();
                        let run_time = Duration::from_secs_f64(result.duration_ms / 1_000.0);

                        if state.complete_run(result.clone(), info) {
                            metrics.record_run_completed(run_time);
                            tracing::info!(
                                "Benchmark run completed: {:.2} KH/s across {} threads",
                                result.kilo_hashes_per_second,
                                result.threads
                            );

                            // The delay timer starts only once the Completed
                            // transition is fully applied.
                            bridge.schedule_handoff(&result);
                        }
                    }
                    Err(e) => {
                        tracing::error!("Benchmark report rejected: {e}");
                        state.fail_run(e.to_string());
                        metrics.record_run_failed();
                    }
                }
            }
            Err(e) => {
                estimator.cancel();
                tracing::error!("Benchmark engine failed: {e}");
                state.fail_run(e.to_string());
                metrics.record_run_failed();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::bridge::WebViewHost;
    use crate::services::engine::{EngineError, EngineReport, MockBenchmarkEngine};
    use crate::state::StateChange;
    use std::sync::atomic::Ordering;
    use tokio::time::timeout;

    struct NullWebView;

    impl WebViewHost for NullWebView {
        fn inject_script(&self, _script: &str) {}
    }

    fn controller_with_engine(
        engine: MockBenchmarkEngine,
    ) -> (BenchmarkController, StateManager, Arc<Metrics>) {
        let state = StateManager::new();
        let metrics = Arc::new(Metrics::new());
        let bridge = Arc::new(ResultBridge::new(
            Arc::new(NullWebView),
            state.clone(),
            Duration::from_millis(10),
            Arc::clone(&metrics),
        ));
        let controller = BenchmarkController::new(
            Arc::new(engine),
            bridge,
            state.clone(),
            &BenchmarkSettings::default(),
            tokio::runtime::Handle::current(),
            Arc::clone(&metrics),
        )
        .unwrap();
        (controller, state, metrics)
    }

    fn quick_report() -> EngineReport {
        EngineReport {
            hash_count: 500_000,
            duration: Duration::from_millis(50),
            threads: 4,
            algorithm: "fnv1a-64".to_string(),
        }
    }

    #[test]
    fn test_invalid_estimator_settings_fail_at_construction() {
        let mut settings = BenchmarkSettings::default();
        settings.progress_step = 0;

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let state = StateManager::new();
        let metrics = Arc::new(Metrics::new());
        let bridge = Arc::new(ResultBridge::new(
            Arc::new(NullWebView),
            state.clone(),
            Duration::from_millis(10),
            Arc::clone(&metrics),
        ));

        let err = BenchmarkController::new(
            Arc::new(MockBenchmarkEngine::new()),
            bridge,
            state,
            &settings,
            runtime.handle().clone(),
            metrics,
        )
        .unwrap_err();
        assert_eq!(err, EstimatorConfigError::StepOutOfRange(0));
    }

    #[tokio::test]
    async fn test_successful_run_commits_result_and_schedules_handoff() {
        let mut engine = MockBenchmarkEngine::new();
        engine
            .expect_run_benchmark()
            .times(1)
            .returning(|_| Ok(quick_report()));

        let (controller, state, metrics) = controller_with_engine(engine);
        let mut rx = state.subscribe();

        assert!(controller.start());

        loop {
            let change = timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("timed out waiting for completion")
                .expect("channel closed");
            if matches!(change, StateChange::RunCompleted { .. }) {
                break;
            }
        }

        assert_eq!(state.progress(), 100);
        assert!(state.snapshot().completed().is_some());
        assert_eq!(metrics.runs_completed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.handoffs_scheduled.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_engine_failure_returns_to_idle() {
        let mut engine = MockBenchmarkEngine::new();
        engine
            .expect_run_benchmark()
            .times(1)
            .returning(|_| Err(EngineError::Unavailable("native module missing".to_string())));

        let (controller, state, metrics) = controller_with_engine(engine);
        let mut rx = state.subscribe();

        assert!(controller.start());

        let mut saw_failure = false;
        while let Ok(Ok(change)) = timeout(Duration::from_millis(500), rx.recv()).await {
            match change {
                StateChange::RunFailed { reason } => {
                    assert!(reason.contains("native module missing"));
                    saw_failure = true;
                    break;
                }
                StateChange::RunCompleted { .. } => panic!("failed run must not complete"),
                _ => {}
            }
        }

        assert!(saw_failure);
        assert!(!state.snapshot().is_running());
        assert_eq!(state.progress(), 0);
        assert_eq!(metrics.runs_failed.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_malformed_report_is_a_failed_run() {
        let mut engine = MockBenchmarkEngine::new();
        engine.expect_run_benchmark().times(1).returning(|_| {
            Ok(EngineReport {
                hash_count: 100,
                duration: Duration::ZERO,
                threads: 4,
                algorithm: "fnv1a-64".to_string(),
            })
        });

        let (controller, state, _metrics) = controller_with_engine(engine);
        let mut rx = state.subscribe();

        assert!(controller.start());

        let mut saw_failure = false;
        while let Ok(Ok(change)) = timeout(Duration::from_millis(500), rx.recv()).await {
            match change {
                StateChange::RunFailed { .. } => {
                    saw_failure = true;
                    break;
                }
                StateChange::RunCompleted { .. } => panic!("malformed report must not complete"),
                _ => {}
            }
        }

        assert!(saw_failure);
        assert!(state.snapshot().completed().is_none());
    }

    #[tokio::test]
    async fn test_reset_clears_result_and_pending_handoff() {
        let mut engine = MockBenchmarkEngine::new();
        engine
            .expect_run_benchmark()
            .times(1)
            .returning(|_| Ok(quick_report()));

        let (controller, state, _metrics) = controller_with_engine(engine);
        let mut rx = state.subscribe();

        assert!(controller.start());
        loop {
            let change = timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("timed out")
                .expect("channel closed");
            if matches!(change, StateChange::RunCompleted { .. }) {
                break;
            }
        }

        assert!(controller.reset());
        assert_eq!(state.snapshot(), crate::models::RunState::Idle);

        // reset() is a no-op outside Completed
        assert!(!controller.reset());
    }
}
