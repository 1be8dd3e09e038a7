//! Host CPU load sampling.

use sysinfo::System;

/// Source of the host's global CPU usage.
pub trait CpuProbe {
    /// Returns global CPU usage in percent (0.0..=100.0).
    fn cpu_percent(&mut self) -> f32;
}

/// CPU probe backed by `sysinfo`.
///
/// Usage is computed between consecutive refreshes, so the first sample after
/// construction reads close to zero.
pub struct SystemCpu {
    system: System,
}

impl SystemCpu {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        Self { system }
    }
}

impl Default for SystemCpu {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuProbe for SystemCpu {
    fn cpu_percent(&mut self) -> f32 {
        self.system.refresh_cpu_usage();
        self.system.global_cpu_usage().clamp(0.0, 100.0)
    }
}
