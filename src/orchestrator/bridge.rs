// ResultBridge - Carries completed benchmark results to the embedded web view
//
// This module owns the native-to-web handoff:
// - Transforming a normalized result into a presentation-facing display model
// - Serializing the result subset the web view consumes
// - The one-shot delayed switch signal and the exactly-once script injection

use crate::metrics::Metrics;
use crate::models::BenchmarkResult;
use crate::services::device::DeviceInfo;
use crate::state::{StateChange, StateManager};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;

/// Name of the custom event dispatched inside the web view.
pub const BENCHMARK_RESULT_EVENT: &str = "benchmarkResult";

/// Boundary to the embedded content view's execution context.
///
/// Write-only: the bridge injects script, it never reads state back out of
/// the view. The view's "content loaded" signal travels the other way -
/// presentation wires it to [`ResultBridge::content_loaded`].
#[cfg_attr(test, automock)]
pub trait WebViewHost: Send + Sync {
    /// Evaluate `script` inside the view's execution context.
    fn inject_script(&self, script: &str);
}

/// Serialized subset of a benchmark result delivered into the web view.
///
/// Created once per completed run, immutable after creation, superseded
/// (never mutated) by the next run. Field names are camelCase because the
/// consumer is a JS event listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgePayload {
    pub kilo_hashes_per_second: f64,
    pub mega_hashes_per_second: f64,
    pub threads: usize,
    pub timestamp_ms: u64,
}

impl BridgePayload {
    /// Snapshot the deliverable subset of `result`, stamped with the current
    /// wall-clock time.
    pub fn from_result(result: &BenchmarkResult) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        Self {
            kilo_hashes_per_second: result.kilo_hashes_per_second,
            mega_hashes_per_second: result.mega_hashes_per_second,
            threads: result.threads,
            timestamp_ms,
        }
    }
}

/// Presentation-facing display model for the completion modal.
///
/// Figures are pre-formatted so the rendering layer only places strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCard {
    pub kilo_hashes_per_second: String,
    pub mega_hashes_per_second: String,
    pub threads: String,
    pub platform: String,
    pub cores: String,
}

/// The pending handoff for the last completed run.
///
/// Payload and timer live behind one lock so `cancel_pending()` invalidates
/// them together - a reset can never leave a stale payload behind a dead
/// timer or vice versa.
#[derive(Default)]
struct PendingHandoff {
    payload: Option<BridgePayload>,
    timer: Option<JoinHandle<()>>,
}

/// Bridges completed runs from native presentation to the embedded web view
///
/// The handoff protocol:
/// 1. [`schedule_handoff`](Self::schedule_handoff) arms the payload and
///    starts the delay timer when a run completes
/// 2. When the delay elapses, [`StateChange::WebViewHandoff`] is emitted -
///    presentation switches to the embedded view
/// 3. The view's load signal calls [`content_loaded`](Self::content_loaded),
///    which injects the payload as a custom-event dispatch, exactly once
///
/// If the view reloads after injection nothing is re-injected, and a load
/// signal with no pending result injects nothing - neither is an error.
pub struct ResultBridge {
    /// Script-injection boundary of the embedded view
    host: Arc<dyn WebViewHost>,

    /// Event channel shared with the state manager; used for the switch signal
    state: StateManager,

    /// Delay between run completion and the switch signal
    delay: Duration,

    /// Pending payload and its delay timer, invalidated together
    pending: Mutex<PendingHandoff>,

    metrics: Arc<Metrics>,
}

impl ResultBridge {
    pub fn new(
        host: Arc<dyn WebViewHost>,
        state: StateManager,
        delay: Duration,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            host,
            state,
            delay,
            pending: Mutex::new(PendingHandoff::default()),
            metrics,
        }
    }

    /// Arm the handoff for a freshly completed run.
    ///
    /// Supersedes any payload still pending from an earlier run and restarts
    /// the delay timer. Must be called from a tokio runtime context, and only
    /// after the `Completed` transition has been fully applied.
    pub fn schedule_handoff(&self, result: &BenchmarkResult) {
        let payload = BridgePayload::from_result(result);

        let mut pending = self.pending.lock().unwrap();
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
        pending.payload = Some(payload);

        let state = self.state.clone();
        let delay = self.delay;
        pending.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::info!("Handoff delay elapsed - requesting switch to web view");
            state.emit(StateChange::WebViewHandoff);
        }));

        self.metrics.record_handoff_scheduled();
        tracing::debug!("Handoff scheduled in {:?}", self.delay);
    }

    /// Invalidate the pending handoff: abort the delay timer and discard its
    /// captured payload in one step. Called on `reset()` and when a new run
    /// starts, so a stale payload can never be injected after a newer run.
    pub fn cancel_pending(&self) {
        let mut pending = self.pending.lock().unwrap();
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
        if pending.payload.take().is_some() {
            self.metrics.record_handoff_cancelled();
            tracing::debug!("Pending handoff cancelled");
        }
    }

    /// The embedded view finished loading its content.
    ///
    /// Consumes the pending payload, so injection happens exactly once per
    /// completed run no matter how often the view reloads.
    pub fn content_loaded(&self) {
        let payload = self.pending.lock().unwrap().payload.take();

        let Some(payload) = payload else {
            tracing::debug!("Web view loaded with no pending result - nothing to inject");
            return;
        };

        match serde_json::to_string(&payload) {
            Ok(json) => {
                let script = format!(
                    "window.dispatchEvent(new CustomEvent('{BENCHMARK_RESULT_EVENT}', {{ detail: {json} }}));"
                );
                self.host.inject_script(&script);
                self.metrics.record_payload_injected();
                tracing::info!("Benchmark result payload injected into web view");
            }
            Err(e) => {
                tracing::error!("Failed to serialize bridge payload: {e}");
            }
        }
    }

    /// Payload currently awaiting injection, if any.
    pub fn pending_payload(&self) -> Option<BridgePayload> {
        self.pending.lock().unwrap().payload.clone()
    }

    /// Build the display model for the completion modal.
    pub fn display_model(result: &BenchmarkResult, device: &DeviceInfo) -> ScoreCard {
        ScoreCard {
            kilo_hashes_per_second: format_number(result.kilo_hashes_per_second),
            mega_hashes_per_second: format_number(result.mega_hashes_per_second),
            threads: result.threads.to_string(),
            platform: device.platform.to_string(),
            cores: format!("{} Virtual Cores", device.cores),
        }
    }
}

impl Drop for ResultBridge {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(timer) = pending.timer.take() {
                timer.abort();
            }
        }
    }
}

/// Locale-style number formatting: thousands separators, at most two
/// fraction digits, trailing zeros trimmed.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let mut text = format!("{rounded:.2}");

    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }

    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part.to_string(), Some(frac_part.to_string())),
        None => (text, None),
    };

    let negative = int_part.starts_with('-');
    let digits: &str = if negative { &int_part[1..] } else { &int_part };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(&frac);
    }
    out
}
