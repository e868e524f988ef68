//! Hashmark - Device hash-rate benchmark orchestrator
//!
//! Main entry point for the console frontend.
//!
//! # Overview
//!
//! This binary crate provides a terminal presentation layer for the
//! orchestration core. It initializes:
//! - Configuration loading ([`ConfigManager`])
//! - Logging infrastructure (file rotation + console output)
//! - Tokio async runtime (worker threads for the hash workload)
//! - State management ([`StateManager`])
//! - The run state machine ([`BenchmarkController`]) and the web-view
//!   handoff ([`ResultBridge`])
//!
//! The application uses a hybrid threading model:
//! - **Main thread**: Blocks on the state-change subscription and renders it
//! - **Tokio workers**: Run the engine workload, the progress estimator, and
//!   the handoff delay timer
//!
//! # Execution Flow
//!
//! 1. Load `Hashmark Data/Hashmark Config.yaml` (defaults if missing)
//! 2. Initialize logging -> logs/hashmark.<date>
//! 3. Create the tokio runtime and the state manager
//! 4. Start one benchmark run and render progress events
//! 5. On completion, render the score card; after the configured delay the
//!    handoff fires, the (simulated) web view loads, and the payload is
//!    injected exactly once
//! 6. Shutdown the tokio runtime with a 5s timeout

use anyhow::Result;
use hashmark::orchestrator::{BenchmarkController, ResultBridge, WebViewHost};
use hashmark::services::{BenchmarkEngine, NativeHashEngine};
use hashmark::{APP_NAME, ConfigManager, Metrics, StateChange, StateManager, VERSION};
use std::sync::Arc;

/// Stand-in for the embedded content view.
///
/// A real frontend hands the injected script to its web-view widget; the
/// console frontend just shows what would be evaluated.
struct ConsoleWebView;

impl WebViewHost for ConsoleWebView {
    fn inject_script(&self, script: &str) {
        println!("[web view] {script}");
    }
}

/// Main entry point for the hashmark console application
///
/// # Errors
///
/// This function can fail if:
/// - The configuration file exists but is invalid YAML
/// - Logging initialization fails (disk space, permissions)
/// - Tokio runtime creation fails (system resources)
/// - The configured estimator parameters are invalid
fn main() -> Result<()> {
    // Load configuration before logging so the debug flag can apply
    let config_manager = ConfigManager::new("Hashmark Data")?;
    let config = config_manager.load_config()?;
    let settings = config.settings;

    let _guard = hashmark::logging::setup_logging("logs", "hashmark", settings.debug_mode, false)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!(
        "Settings: run {}s, tick {}ms, step {}, handoff delay {}ms",
        settings.run_duration_secs,
        settings.progress_tick_ms,
        settings.progress_step,
        settings.handoff_delay_ms
    );

    // Create tokio runtime for the engine workload and timers
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(4)
        .thread_name("hashmark-worker")
        .build()?;

    let state_manager = StateManager::new();
    let metrics = Arc::new(Metrics::new());

    let engine = Arc::new(NativeHashEngine::new());
    let cores = engine.core_count();
    let bridge = Arc::new(ResultBridge::new(
        Arc::new(ConsoleWebView),
        state_manager.clone(),
        settings.handoff_delay(),
        Arc::clone(&metrics),
    ));

    let controller = BenchmarkController::new(
        engine,
        Arc::clone(&bridge),
        state_manager.clone(),
        &settings,
        runtime.handle().clone(),
        Arc::clone(&metrics),
    )?;

    let mut rx = state_manager.subscribe();

    println!("{APP_NAME} v{VERSION}");
    println!(
        "Running benchmark: {}s on {} cores...",
        settings.run_duration_secs, cores
    );
    controller.start();

    // Render state changes from the main thread until the handoff completes
    while let Ok(change) = rx.blocking_recv() {
        match change {
            StateChange::RunStarted => {
                println!("Benchmark started");
            }
            StateChange::ProgressUpdated { percent } => {
                println!("  progress: {percent:>3}%");
            }
            StateChange::RunCompleted { result, device } => {
                let card = ResultBridge::display_model(&result, &device);
                println!("Benchmark complete!");
                println!("  {} KH/s", card.kilo_hashes_per_second);
                println!("  {} MH/s", card.mega_hashes_per_second);
                println!("  Threads:  {}", card.threads);
                println!("  Platform: {}", card.platform);
                println!("  Cores:    {}", card.cores);
                println!("Redirecting to web view...");
            }
            StateChange::RunFailed { reason } => {
                println!("Benchmark failed: {reason}");
                break;
            }
            StateChange::WebViewHandoff => {
                println!("Switching to web view");
                // The console stands in for the view's "content loaded" signal
                bridge.content_loaded();
                break;
            }
            StateChange::ResultCleared => {}
        }
    }

    metrics.log_summary();
    tracing::info!("Shutting down");
    runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    Ok(())
}
