use std::time::{Duration, Instant};

use tracing::*;

use super::{
    source::{MetricsError, MetricsSource},
    sys_info::SysinfoSource,
    types::SystemMetrics,
};

pub const DEFAULT_CPU_SAMPLE_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct MetricsCollector<S: MetricsSource = SysinfoSource> {
    source: S,
    cpu_sample_window: Duration,
}

impl Default for MetricsCollector<SysinfoSource> {
    fn default() -> Self {
        Self::new(SysinfoSource::new(), DEFAULT_CPU_SAMPLE_WINDOW)
    }
}

impl<S: MetricsSource> MetricsCollector<S> {
    pub fn new(source: S, cpu_sample_window: Duration) -> Self {
        Self {
            source,
            cpu_sample_window,
        }
    }

    pub fn cpu_sample_window(&self) -> Duration {
        self.cpu_sample_window
    }

    /// Reads every category once. Takes at least the CPU sample window.
    #[instrument(level = "debug", skip(self))]
    pub fn collect(&mut self) -> SystemMetrics {
        let started = Instant::now();

        let metrics = SystemMetrics {
            load_average: degrade("load average", self.source.load_average()),
            cpu_percent_per_core: degrade(
                "cpu usage",
                self.source.cpu_percent_per_core(self.cpu_sample_window),
            ),
            memory: degrade("memory", self.source.memory()),
            disk_usage: degrade("disk usage", self.source.root_disk()),
            temperatures: degrade("temperatures", self.source.temperatures()),
            boot_time: degrade("boot time", self.source.boot_time()),
        };

        debug!("System metrics collected in {:?}", started.elapsed());

        metrics
    }
}

fn degrade<T>(metric: &str, result: Result<T, MetricsError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            warn!("Skipping {metric}: {error}");
            None
        }
    }
}
