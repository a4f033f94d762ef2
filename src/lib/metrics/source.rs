use std::{collections::BTreeMap, time::Duration};

use chrono::{DateTime, Utc};

use super::types::{DiskUsage, LoadAverage, MemoryUsage};

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("{0} is not available on this host")]
    Unavailable(&'static str),

    #[error("Failed reading {metric}: {reason}")]
    Failed {
        metric: &'static str,
        reason: String,
    },
}

/// One fallible read per metric category, so a broken sensor only costs its own field.
pub trait MetricsSource {
    fn load_average(&mut self) -> Result<LoadAverage, MetricsError>;

    /// Blocks for `sample_window` to measure usage between two readings.
    fn cpu_percent_per_core(&mut self, sample_window: Duration) -> Result<Vec<f64>, MetricsError>;

    fn memory(&mut self) -> Result<MemoryUsage, MetricsError>;

    fn root_disk(&mut self) -> Result<DiskUsage, MetricsError>;

    /// An empty map is a valid answer for hosts without sensors.
    fn temperatures(&mut self) -> Result<BTreeMap<String, f64>, MetricsError>;

    fn boot_time(&mut self) -> Result<DateTime<Utc>, MetricsError>;
}
