use std::{collections::BTreeMap, path::Path, time::Duration};

use chrono::{DateTime, Utc};
use sysinfo::{ComponentExt, CpuExt, DiskExt, System, SystemExt};
use tracing::*;

use super::{
    source::{MetricsError, MetricsSource},
    types::{DiskUsage, LoadAverage, MemoryUsage},
};

const ROOT_MOUNT_POINT: &str = "/";

/// [`MetricsSource`] backed by `sysinfo`.
///
/// The `System` is kept between cycles so the component and disk lists are only
/// built on the first collection.
pub struct SysinfoSource {
    system: System,
    lists_loaded: bool,
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SysinfoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SysinfoSource")
            .field("lists_loaded", &self.lists_loaded)
            .finish()
    }
}

impl SysinfoSource {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            lists_loaded: false,
        }
    }

    fn ensure_lists(&mut self) {
        if self.lists_loaded {
            return;
        }

        self.system.refresh_disks_list();
        self.system.refresh_components_list();
        self.lists_loaded = true;
    }
}

impl MetricsSource for SysinfoSource {
    #[instrument(level = "trace", skip(self))]
    fn load_average(&mut self) -> Result<LoadAverage, MetricsError> {
        if !System::IS_SUPPORTED {
            return Err(MetricsError::Unavailable("load average"));
        }

        let load = self.system.load_average();
        Ok(LoadAverage {
            one: load.one,
            five: load.five,
            fifteen: load.fifteen,
        })
    }

    #[instrument(level = "trace", skip(self))]
    fn cpu_percent_per_core(&mut self, sample_window: Duration) -> Result<Vec<f64>, MetricsError> {
        self.system.refresh_cpu();
        std::thread::sleep(sample_window.max(System::MINIMUM_CPU_UPDATE_INTERVAL));
        self.system.refresh_cpu();

        let usage: Vec<f64> = self
            .system
            .cpus()
            .iter()
            .map(|cpu| cpu.cpu_usage() as f64)
            .collect();

        if usage.is_empty() {
            return Err(MetricsError::Unavailable("cpu usage"));
        }

        Ok(usage)
    }

    #[instrument(level = "trace", skip(self))]
    fn memory(&mut self) -> Result<MemoryUsage, MetricsError> {
        self.system.refresh_memory();

        let total_bytes = self.system.total_memory();
        if total_bytes == 0 {
            return Err(MetricsError::Unavailable("memory"));
        }

        Ok(MemoryUsage {
            total_bytes,
            used_bytes: self.system.used_memory(),
            available_bytes: self.system.available_memory(),
        })
    }

    #[instrument(level = "trace", skip(self))]
    fn root_disk(&mut self) -> Result<DiskUsage, MetricsError> {
        self.ensure_lists();
        self.system.refresh_disks();

        let root = Path::new(ROOT_MOUNT_POINT);
        let Some(disk) = self
            .system
            .disks()
            .iter()
            .find(|disk| disk.mount_point() == root)
        else {
            return Err(MetricsError::Unavailable("root filesystem"));
        };

        let total_bytes = disk.total_space();
        let available_bytes = disk.available_space();

        Ok(DiskUsage {
            mount_point: ROOT_MOUNT_POINT.to_string(),
            total_bytes,
            used_bytes: total_bytes.saturating_sub(available_bytes),
            available_bytes,
        })
    }

    #[instrument(level = "trace", skip(self))]
    fn temperatures(&mut self) -> Result<BTreeMap<String, f64>, MetricsError> {
        self.ensure_lists();
        self.system.refresh_components();

        Ok(self
            .system
            .components()
            .iter()
            .map(|component| (component.label().to_string(), component.temperature() as f64))
            .filter(|(_, temperature)| temperature.is_finite())
            .collect())
    }

    #[instrument(level = "trace", skip(self))]
    fn boot_time(&mut self) -> Result<DateTime<Utc>, MetricsError> {
        let seconds = self.system.boot_time();
        if seconds == 0 {
            return Err(MetricsError::Unavailable("boot time"));
        }

        let seconds = i64::try_from(seconds).map_err(|error| MetricsError::Failed {
            metric: "boot time",
            reason: error.to_string(),
        })?;

        DateTime::from_timestamp(seconds, 0).ok_or(MetricsError::Failed {
            metric: "boot time",
            reason: format!("{seconds} is not a valid timestamp"),
        })
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn linux_host_reports_core_metrics() {
        let mut source = SysinfoSource::new();

        assert!(source.load_average().is_ok());
        assert!(source.memory().unwrap().total_bytes > 0);
        assert!(!source
            .cpu_percent_per_core(Duration::from_millis(200))
            .unwrap()
            .is_empty());
        assert!(source.boot_time().unwrap() < Utc::now());
        assert!(source.temperatures().is_ok());
    }
}
