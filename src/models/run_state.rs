use crate::models::result::BenchmarkResult;
use crate::services::device::DeviceInfo;

/// Single source of truth for the benchmark run lifecycle.
///
/// Exactly one `RunState` value is live per controller. Transitions replace
/// the whole value; no variant is ever partially mutated, so presentation
/// reads can never observe a torn state (for example progress forced to 100
/// while the result is not yet attached).
///
/// There is deliberately no `Failed` variant: a failed run returns the
/// machine to [`Idle`](RunState::Idle) and the failure is reported once as a
/// [`StateChange::RunFailed`](crate::state::StateChange::RunFailed) event.
///
/// # Thread Safety
///
/// `RunState` is wrapped in `Arc<RwLock<RunState>>` by
/// [`crate::state::StateManager`] to provide thread-safe access. Never hold
/// the value directly - always go through [`StateManager`](crate::state::StateManager):
/// - [`read()`](crate::state::StateManager::read) for read-only access
/// - [`update()`](crate::state::StateManager::update) for mutations with automatic change events
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RunState {
    /// No run in flight and no retained result. Initial state, and the only
    /// state reachable after `reset()` or a failed run.
    #[default]
    Idle,

    /// A run is in flight. `progress` is the advisory synthetic percentage
    /// in `0..=100`; it never gates the transition out of this state.
    Running { progress: u8 },

    /// The last run finished; the normalized result and the device snapshot
    /// are retained until `reset()` or the next `start()`.
    Completed {
        result: BenchmarkResult,
        device: DeviceInfo,
    },
}

impl RunState {
    /// Displayed progress percentage for this state.
    ///
    /// `Completed` always reports 100 even if the estimator's last tick was
    /// lower - reconciliation is structural, not a separate write.
    pub fn progress(&self) -> u8 {
        match self {
            RunState::Idle => 0,
            RunState::Running { progress } => *progress,
            RunState::Completed { .. } => 100,
        }
    }

    /// True while a run is in flight.
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running { .. })
    }

    /// The retained result and device snapshot, if the last run completed.
    pub fn completed(&self) -> Option<(&BenchmarkResult, &DeviceInfo)> {
        match self {
            RunState::Completed { result, device } => Some((result, device)),
            _ => None,
        }
    }
}
