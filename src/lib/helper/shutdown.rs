use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use tracing::*;

pub const DEFAULT_SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Process-wide stop request, shared between the signal handler and the refresh loop.
///
/// Every wait in the refresh loop goes through [`Shutdown::sleep`], which never blocks
/// longer than one slice before looking at the flag again.
#[derive(Debug, Clone)]
pub struct Shutdown {
    requested: Arc<AtomicBool>,
    slice: Duration,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new(DEFAULT_SLEEP_SLICE)
    }
}

impl Shutdown {
    pub fn new(slice: Duration) -> Self {
        Self {
            requested: Arc::new(AtomicBool::new(false)),
            slice: slice.max(Duration::from_millis(1)),
        }
    }

    pub fn request(&self) {
        if !self.requested.swap(true, Ordering::SeqCst) {
            info!("Shutdown requested");
        }
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration`, returns `false` if a stop was requested before it elapsed.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;

        loop {
            if self.is_requested() {
                return false;
            }

            let now = Instant::now();
            if now >= deadline {
                return true;
            }

            std::thread::sleep(self.slice.min(deadline - now));
        }
    }

    /// Routes SIGINT and SIGTERM to [`Shutdown::request`].
    #[instrument(level = "debug", skip(self))]
    pub fn install_signal_handler(&self) -> Result<()> {
        let shutdown = self.clone();
        ctrlc::set_handler(move || shutdown.request())
            .context("Failed to install the termination signal handler")
    }
}
