// State management module
//
// This module provides the StateManager which wraps RunState with thread-safe access
// using Arc<RwLock<T>> and emits change events for presentation updates.

use crate::models::{BenchmarkResult, RunState};
use crate::services::device::DeviceInfo;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when the run state is modified
///
/// These events are emitted to notify interested parties (primarily the
/// presentation layer) about state changes without requiring them to poll.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// A benchmark run has started
    RunStarted,

    /// Synthetic progress has advanced during a run
    ProgressUpdated { percent: u8 },

    /// The engine resolved and the normalized result has been committed
    RunCompleted {
        result: BenchmarkResult,
        device: DeviceInfo,
    },

    /// The engine rejected; the machine is back in `Idle`. Emitted exactly
    /// once per failed run.
    RunFailed { reason: String },

    /// The retained result has been cleared via reset
    ResultCleared,

    /// The handoff delay elapsed - presentation should switch to the
    /// embedded web view now
    WebViewHandoff,
}

/// Thread-safe run-state manager with event emission
///
/// This is the central state management component that:
/// - Provides thread-safe access to [`RunState`] via `Arc<RwLock<T>>`
/// - Replaces the whole state value on every transition, so readers never
///   observe a half-applied transition
/// - Detects state changes and emits [`StateChange`] events
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// # Usage
///
/// Always use `StateManager` instead of holding a [`RunState`] directly:
/// - [`read()`](Self::read) for reading state without holding locks
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
///
/// # Related Types
///
/// - [`crate::models::RunState`]: The underlying state value
/// - [`StateChange`]: Event types emitted on state mutations
/// - [`crate::orchestrator::BenchmarkController`]: The sole writer of transitions
/// - [`crate::orchestrator::ResultBridge`]: Reads committed `Completed` snapshots
pub struct StateManager {
    /// The run state protected by RwLock for thread-safe access
    state: Arc<RwLock<RunState>>,

    /// Broadcast channel for emitting state change events
    /// Multiple subscribers can listen for state changes
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager starting in `Idle`
    ///
    /// # Returns
    /// A new StateManager with a broadcast channel buffer of 100 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(RunState::Idle)),
            state_tx,
        }
    }

    /// Get a snapshot of the current state
    ///
    /// This clones the state, so it's safe to use without holding locks.
    pub fn snapshot(&self) -> RunState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let running = state_manager.read(|state| state.is_running());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&RunState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Current displayed progress percentage
    pub fn progress(&self) -> u8 {
        self.read(|state| state.progress())
    }

    /// Update the state and emit change events
    ///
    /// This is the primary way to modify state. It:
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Emits appropriate events
    ///
    /// The old and new values are compared while the write lock is held, so
    /// transitions are atomic with respect to presentation reads.
    ///
    /// # Returns
    /// A vector of StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut RunState),
    {
        let mut state = self.state.write().unwrap();
        let old_state = state.clone();

        // Apply the update
        update_fn(&mut state);

        // Detect changes and emit events
        let changes = Self::detect_changes(&old_state, &state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    ///
    /// Returns a receiver that will get notified of all future state changes.
    /// Multiple subscribers can listen simultaneously.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Emit an event that is not derived from a state transition
    /// (used by the bridge for the web-view handoff signal).
    pub fn emit(&self, change: StateChange) {
        let _ = self.state_tx.send(change);
    }

    /// Derive events from a transition between two states
    fn detect_changes(old: &RunState, new: &RunState) -> Vec<StateChange> {
        match (old, new) {
            (RunState::Running { progress: a }, RunState::Running { progress: b }) if a != b => {
                vec![StateChange::ProgressUpdated { percent: *b }]
            }
            (RunState::Running { .. }, RunState::Running { .. }) => Vec::new(),
            (RunState::Idle | RunState::Completed { .. }, RunState::Running { .. }) => {
                vec![StateChange::RunStarted]
            }
            (RunState::Running { .. }, RunState::Completed { result, device }) => {
                vec![StateChange::RunCompleted {
                    result: result.clone(),
                    device: *device,
                }]
            }
            (RunState::Completed { .. }, RunState::Idle) => vec![StateChange::ResultCleared],
            // Failed run: the reason travels on the error side channel, the
            // transition itself only resets displayed progress.
            (RunState::Running { .. }, RunState::Idle) => {
                vec![StateChange::ProgressUpdated { percent: 0 }]
            }
            _ => Vec::new(),
        }
    }

    // Convenience methods for the controller's transitions

    /// Try to begin a run: `Idle` or `Completed` -> `Running { 0 }`.
    ///
    /// Returns `false` without touching state if a run is already in flight,
    /// which is what makes `start()` a no-op while `Running`.
    pub fn try_begin_run(&self) -> bool {
        let mut started = false;
        self.update(|state| {
            if !state.is_running() {
                *state = RunState::Running { progress: 0 };
                started = true;
            }
        });
        started
    }

    /// Advance synthetic progress by `step`, clamped to 100.
    ///
    /// Progress is monotonic for the lifetime of one `Running` period; any
    /// write outside `Running` is a no-op, which shields completed runs from
    /// a racing estimator tick.
    ///
    /// # Returns
    /// `true` while the estimator should keep ticking (state is `Running`
    /// and progress has not reached 100)
    pub fn advance_progress(&self, step: u8) -> bool {
        let mut ticking = false;
        self.update(|state| {
            if let RunState::Running { progress } = state {
                *progress = progress.saturating_add(step).min(100);
                ticking = *progress < 100;
            }
        });
        ticking
    }

    /// Commit a completed run: `Running` -> `Completed`.
    ///
    /// The result attachment and the progress jump to 100 are one write, so
    /// no reader can observe one without the other.
    pub fn complete_run(&self, result: BenchmarkResult, device: DeviceInfo) -> bool {
        let mut applied = false;
        self.update(|state| {
            if state.is_running() {
                *state = RunState::Completed { result, device };
                applied = true;
            }
        });
        applied
    }

    /// Record a failed run: `Running` -> `Idle`, plus exactly one
    /// [`StateChange::RunFailed`] notification. No partial result is retained.
    pub fn fail_run(&self, reason: impl Into<String>) -> bool {
        let mut applied = false;
        self.update(|state| {
            if state.is_running() {
                *state = RunState::Idle;
                applied = true;
            }
        });

        if applied {
            self.emit(StateChange::RunFailed {
                reason: reason.into(),
            });
        }

        applied
    }

    /// Clear a retained result: `Completed` -> `Idle`. No-op elsewhere.
    pub fn clear_result(&self) -> bool {
        let mut cleared = false;
        self.update(|state| {
            if state.completed().is_some() {
                *state = RunState::Idle;
                cleared = true;
            }
        });
        cleared
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across tasks
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}
