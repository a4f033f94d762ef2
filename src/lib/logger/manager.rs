use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{metadata::LevelFilter, *};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = env!("CARGO_PKG_NAME");
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug, Clone)]
pub struct LoggerSettings {
    pub verbose: bool,
    pub directory: PathBuf,
    /// Number of daily files kept on disk.
    pub retention: usize,
}

/// Owns the background file writer. Dropping it flushes whatever is still queued.
#[must_use = "dropping the logger stops file logging"]
pub struct Logger {
    _file_guard: WorkerGuard,
}

impl Logger {
    pub fn shutdown(self) {
        info!("Logger shutting down");
    }
}

// Start logger, should be done inside main
pub fn init(settings: &LoggerSettings) -> Result<Logger> {
    // Redirect all logs from libs using "Log"
    LogTracer::init_with_filter(tracing::log::LevelFilter::Trace)
        .context("Failed to set logger")?;

    // Configure the console log
    let console_env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if settings.verbose {
            EnvFilter::new(LevelFilter::DEBUG.to_string())
        } else {
            EnvFilter::new(LevelFilter::INFO.to_string())
        }
    });

    let console_layer = fmt::Layer::new()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(fmt::format::FmtSpan::NONE)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_filter(console_env_filter);

    // Configure the file log
    let file_env_filter = if settings.verbose {
        EnvFilter::new(LevelFilter::TRACE.to_string())
    } else {
        EnvFilter::new(LevelFilter::DEBUG.to_string())
    };
    let file_appender = file_appender(&settings.directory, settings.retention)?;
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::Layer::new()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(fmt::format::FmtSpan::NONE)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_filter(file_env_filter);

    // Configure the default subscriber
    let subscriber = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)
        .context("Unable to set a global subscriber")?;

    info!(
        "{}, version: {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    );
    info!(
        "Starting at {}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
    );
    info!(
        "Logging to {:?}, keeping {} daily files",
        settings.directory, settings.retention
    );

    Ok(Logger {
        _file_guard: file_guard,
    })
}

/// Daily rotated files named `<crate>.<date>.log`, oldest deleted past `retention`.
pub fn file_appender(directory: &Path, retention: usize) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(retention.max(1))
        .build(directory)
        .with_context(|| format!("Failed to create log files in {directory:?}"))
}
