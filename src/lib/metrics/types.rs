use std::collections::BTreeMap;

use chrono::{DateTime, Local, Utc};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
}

impl MemoryUsage {
    pub fn used_percent(&self) -> f64 {
        percent(self.used_bytes, self.total_bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskUsage {
    pub mount_point: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
}

impl DiskUsage {
    pub fn used_percent(&self) -> f64 {
        percent(self.used_bytes, self.total_bytes)
    }
}

/// Host facts from one collection pass. A `None` field means its source failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemMetrics {
    pub load_average: Option<LoadAverage>,
    pub cpu_percent_per_core: Option<Vec<f64>>,
    pub memory: Option<MemoryUsage>,
    pub disk_usage: Option<DiskUsage>,
    /// `Some` and empty on hosts without sensors.
    pub temperatures: Option<BTreeMap<String, f64>>,
    pub boot_time: Option<DateTime<Utc>>,
}

impl SystemMetrics {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("load average", self.load_average.is_none()),
            ("cpu usage", self.cpu_percent_per_core.is_none()),
            ("memory", self.memory.is_none()),
            ("disk usage", self.disk_usage.is_none()),
            ("temperatures", self.temperatures.is_none()),
            ("boot time", self.boot_time.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}

/// Everything one refresh cycle shows, never mutated after collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub version: String,
    pub blocking_stats: String,
    pub system: SystemMetrics,
    pub collected_at: DateTime<Local>,
}

fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }

    part as f64 / total as f64 * 100.0
}
