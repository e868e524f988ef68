// Orchestrator module - run state machine and web-view handoff
//
// This module contains:
// - BenchmarkController: drives the Idle -> Running -> Completed lifecycle
//   and reconciles synthetic progress with real engine completion
// - ResultBridge: turns committed results into a display model and a
//   serialized payload, and manages the one-shot delayed handoff

pub mod bridge;
pub mod controller;

pub use bridge::{BridgePayload, ResultBridge, ScoreCard, WebViewHost, BENCHMARK_RESULT_EVENT};
pub use controller::BenchmarkController;
