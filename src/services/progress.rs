use crate::state::StateManager;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Invalid estimator parameters. Programmer error, surfaced at construction.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EstimatorConfigError {
    #[error("progress tick interval must be greater than zero")]
    ZeroTick,

    #[error("progress step must be between 1 and 100, got {0}")]
    StepOutOfRange(u8),
}

/// Validated tick/step parameters for the synthetic progress ramp.
///
/// The defaults (100 ms tick, step 2) reach 100% in about five seconds,
/// calibrated to the default engine run duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatorConfig {
    tick: Duration,
    step: u8,
}

impl EstimatorConfig {
    pub fn new(tick: Duration, step: u8) -> Result<Self, EstimatorConfigError> {
        if tick.is_zero() {
            return Err(EstimatorConfigError::ZeroTick);
        }
        if step == 0 || step > 100 {
            return Err(EstimatorConfigError::StepOutOfRange(step));
        }
        Ok(Self { tick, step })
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    pub fn step(&self) -> u8 {
        self.step
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            step: 2,
        }
    }
}

/// Timed synthetic progress source for one `Running` period.
///
/// The engine exposes no incremental progress channel, so this task emits a
/// monotonically increasing percentage on a fixed cadence instead. The values
/// are advisory UI feedback only; the controller never waits for the ramp to
/// reach 100 before committing the real result.
///
/// The task stops on its own when progress reaches 100 or the run leaves the
/// `Running` state, and stops without further emissions when
/// [`cancel()`](Self::cancel) is called or the handle is dropped.
pub struct ProgressEstimator {
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ProgressEstimator {
    /// Start ticking against `state`. Must be called from a tokio runtime
    /// context.
    pub fn spawn(config: EstimatorConfig, state: StateManager) -> Self {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            tracing::debug!(
                "Progress estimator started: tick={:?}, step={}",
                config.tick,
                config.step
            );

            loop {
                tokio::select! {
                    // Ok on cancel(), Err when the handle is dropped; both stop the ramp.
                    _ = cancel_rx.changed() => break,
                    _ = tokio::time::sleep(config.tick) => {
                        if *cancel_rx.borrow() {
                            break;
                        }
                        if !state.advance_progress(config.step) {
                            break;
                        }
                    }
                }
            }

            tracing::debug!("Progress estimator stopped");
        });

        Self { cancel_tx, task }
    }

    /// Stop the ramp. No progress is emitted after this returns; a tick that
    /// races the signal is discarded by the `Running`-state guard in
    /// [`StateManager::advance_progress`].
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    /// Wait for the estimator task to wind down. Test helper, not required
    /// for correctness.
    pub async fn finished(self) {
        let _ = self.task.await;
    }
}
