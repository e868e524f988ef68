//! Device probing utilities for identifying the platform and core count.
//!
//! The probe is synchronous and its answers are immutable for the process
//! lifetime, so callers query it once per completed run rather than caching
//! anything themselves.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform the process is running on, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Ios,
    Android,
    Unknown,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Platform::Ios => "iOS",
            Platform::Android => "Android",
            Platform::Unknown => "Unknown",
        };
        write!(f, "{label}")
    }
}

/// Immutable snapshot of the device the benchmark ran on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub platform: Platform,
    pub cores: usize,
}

/// Resolve the platform from the compile target.
pub fn current_platform() -> Platform {
    if cfg!(target_os = "ios") {
        Platform::Ios
    } else if cfg!(target_os = "android") {
        Platform::Android
    } else {
        Platform::Unknown
    }
}

/// Snapshot the device. `cores` is always >= 1.
pub fn probe() -> DeviceInfo {
    DeviceInfo {
        platform: current_platform(),
        cores: num_cpus::get().max(1),
    }
}
