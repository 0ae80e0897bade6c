use std::path::Path;

use serde::Serialize;
use sysinfo::System;

use crate::disk_info::{self, DiskInfo};

const WARNING_PERCENT: f32 = 80.0;
const CRITICAL_PERCENT: f32 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Good,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Worst status across the given usage percentages.
    pub fn from_usage(percentages: &[f32]) -> Self {
        let peak = percentages.iter().copied().fold(0.0_f32, f32::max);
        if peak > CRITICAL_PERCENT {
            HealthStatus::Critical
        } else if peak > WARNING_PERCENT {
            HealthStatus::Warning
        } else {
            HealthStatus::Good
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Good => "good",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoryInfo {
    pub used: u64,
    pub total: u64,
}

impl MemoryInfo {
    pub fn usage_percent(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.used as f32 / self.total as f32 * 100.0
    }
}

/// Disk and memory pressure on the host serving the application.
#[derive(Debug, Clone, Serialize)]
pub struct HostReport {
    pub disk: Option<DiskInfo>,
    pub memory: MemoryInfo,
    pub status: HealthStatus,
}

fn get_memory_info() -> MemoryInfo {
    let mut sys = System::new();
    sys.refresh_memory();
    MemoryInfo {
        used: sys.used_memory(),
        total: sys.total_memory(),
    }
}

pub fn host_report(root: &Path) -> HostReport {
    let disk = disk_info::get_disk_info(root);
    let memory = get_memory_info();

    let mut usage = vec![memory.usage_percent()];
    if let Some(disk) = &disk {
        usage.push(disk.usage_percent());
    }

    HostReport {
        disk,
        status: HealthStatus::from_usage(&usage),
        memory,
    }
}
