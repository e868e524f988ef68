//! Services module - Pure business logic for benchmark execution.
//!
//! This module contains the engine boundary, the device probe, and the
//! synthetic progress ramp. The services are **framework-agnostic** and have
//! no dependencies on the presentation layer, making them testable and
//! reusable.
//!
//! # Components
//!
//! - [`BenchmarkEngine`]: Opaque call boundary to the hashing routine. The
//!   engine reports only a final aggregate; it has no incremental progress
//!   channel. [`NativeHashEngine`] is the default multi-threaded FNV-1a
//!   implementation.
//! - [`device`]: Synchronous platform and core-count probe, immutable for
//!   the process lifetime.
//! - [`ProgressEstimator`]: Time-based progress approximation for one
//!   `Running` period, cancellable at any time without further emissions.
//!
//! # Design Philosophy
//!
//! - **Pure**: No side effects beyond the hashing workload itself
//! - **Async**: Long operations use tokio and never block the event loop
//! - **Testable**: No hidden dependencies, all inputs are explicit parameters

pub mod device;
pub mod engine;
pub mod progress;

pub use device::{DeviceInfo, Platform};
pub use engine::{BenchmarkEngine, EngineError, EngineReport, NativeHashEngine};
pub use progress::{EstimatorConfig, EstimatorConfigError, ProgressEstimator};
