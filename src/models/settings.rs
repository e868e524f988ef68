use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level document of `Hashmark Config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BenchmarkConfig {
    #[serde(rename = "Hashmark_Settings", default)]
    pub settings: BenchmarkSettings,
}

/// User-tunable orchestration settings.
///
/// Every timing knob of the run lifecycle lives here so integrating
/// applications can choose their own values; the defaults match the
/// configuration the product shipped with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSettings {
    /// How long the engine hashes for, in seconds.
    #[serde(rename = "Run Duration Secs", default = "default_run_duration_secs")]
    pub run_duration_secs: u64,

    /// Synthetic progress tick interval in milliseconds.
    #[serde(rename = "Progress Tick Ms", default = "default_progress_tick_ms")]
    pub progress_tick_ms: u64,

    /// Percentage points added per progress tick.
    #[serde(rename = "Progress Step", default = "default_progress_step")]
    pub progress_step: u8,

    /// Delay between run completion and the switch to the embedded web
    /// view, in milliseconds. Observed product variants disagreed on this
    /// value (immediate up to minutes); 1000 ms is the documented default
    /// and integrators are expected to pick their own.
    #[serde(rename = "Handoff Delay Ms", default = "default_handoff_delay_ms")]
    pub handoff_delay_ms: u64,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,
}

fn default_run_duration_secs() -> u64 {
    5
}

fn default_progress_tick_ms() -> u64 {
    100
}

fn default_progress_step() -> u8 {
    2
}

fn default_handoff_delay_ms() -> u64 {
    1_000
}

impl Default for BenchmarkSettings {
    fn default() -> Self {
        Self {
            run_duration_secs: default_run_duration_secs(),
            progress_tick_ms: default_progress_tick_ms(),
            progress_step: default_progress_step(),
            handoff_delay_ms: default_handoff_delay_ms(),
            debug_mode: false,
        }
    }
}

impl BenchmarkSettings {
    /// Engine run duration as a [`Duration`].
    pub fn run_duration(&self) -> Duration {
        Duration::from_secs(self.run_duration_secs)
    }

    /// Handoff delay as a [`Duration`].
    pub fn handoff_delay(&self) -> Duration {
        Duration::from_millis(self.handoff_delay_ms)
    }

    /// Estimator tick interval as a [`Duration`].
    pub fn progress_tick(&self) -> Duration {
        Duration::from_millis(self.progress_tick_ms)
    }
}
