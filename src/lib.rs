// Hashmark - Device hash-rate benchmark orchestrator with web-view handoff
//
// This is the library crate containing the orchestration core and data structures.
// The binary crate (main.rs) provides a console frontend.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::Metrics;
pub use models::{BenchmarkConfig, BenchmarkResult, BenchmarkSettings, RunState};
pub use orchestrator::{BenchmarkController, BridgePayload, ResultBridge, ScoreCard, WebViewHost};
pub use services::{BenchmarkEngine, NativeHashEngine};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
