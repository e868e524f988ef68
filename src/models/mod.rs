//! Data models for the hashmark orchestrator.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`RunState`]: The tagged union describing the run lifecycle, owned by
//!   [`StateManager`](crate::state::StateManager)
//! - [`BenchmarkResult`]: The normalized outcome of a completed run
//! - [`BenchmarkConfig`] / [`BenchmarkSettings`]: Orchestration settings loaded
//!   from `Hashmark Config.yaml`
//!
//! # Architecture Note
//!
//! The models are designed to be:
//! - **Serializable**: Settings and results derive `Serialize`/`Deserialize`
//! - **Cloneable**: `RunState` snapshots are handed out by value so readers
//!   never hold a lock
//! - **Replace-only**: State transitions swap the whole `RunState` value
//!   through [`StateManager::update()`](crate::state::StateManager::update)

pub mod result;
pub mod run_state;
pub mod settings;

pub use result::BenchmarkResult;
pub use run_state::RunState;
pub use settings::{BenchmarkConfig, BenchmarkSettings};
