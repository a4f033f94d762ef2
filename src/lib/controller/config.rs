use std::time::Duration;

use anyhow::{bail, Result};

use crate::{page::ViewportBudget, settings::manager::SettingsStruct};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Keep cycling until a stop is requested.
    Continuous,
    /// One full page cycle, then exit.
    Once,
}

/// Everything the refresh loop needs, resolved from settings and command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshConfig {
    pub host: String,
    pub port: u16,
    pub read_timeout: Duration,
    pub viewport: ViewportBudget,
    pub run_mode: RunMode,
    pub page_interval: Duration,
    pub cycle_interval: Duration,
    pub reconnect_attempts: u32,
    pub reconnect_backoff: Duration,
}

impl RefreshConfig {
    /// Without a display the pages go to the log once, back to back.
    pub fn from_settings(
        settings: &SettingsStruct,
        display_enabled: bool,
        force_once: bool,
        ftl_override: Option<(String, u16)>,
    ) -> Result<Self> {
        let (host, port) =
            ftl_override.unwrap_or_else(|| (settings.ftl.host.clone(), settings.ftl.port));

        let run_mode = if display_enabled && !force_once {
            RunMode::Continuous
        } else {
            RunMode::Once
        };

        let read_timeout = settings.ftl.read_timeout();
        if read_timeout.is_zero() {
            bail!("FTL read timeout must be longer than zero");
        }

        let page_interval = if display_enabled {
            settings.refresh.page_interval()
        } else {
            Duration::ZERO
        };

        Ok(Self {
            host,
            port,
            read_timeout,
            viewport: settings.viewport.budget()?,
            run_mode,
            page_interval,
            cycle_interval: settings.refresh.cycle_interval(),
            reconnect_attempts: settings.refresh.reconnect_attempts,
            reconnect_backoff: settings.refresh.reconnect_backoff(),
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
