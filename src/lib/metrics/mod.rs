pub mod collector;
pub mod source;
pub mod sys_info;
pub mod types;

pub use collector::MetricsCollector;
pub use source::{MetricsError, MetricsSource};
pub use sys_info::SysinfoSource;
pub use types::{DiskUsage, LoadAverage, MemoryUsage, Snapshot, SystemMetrics};
