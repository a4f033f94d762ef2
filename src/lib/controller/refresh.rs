use std::time::{Duration, Instant};

use chrono::Local;
use tracing::*;

use super::{
    config::{RefreshConfig, RunMode},
    error::{ControllerError, Termination},
    state::State,
};
use crate::{
    ftl::{Command, ConnectionError, ConnectionHandle, ProtocolError},
    helper::shutdown::Shutdown,
    metrics::{MetricsCollector, MetricsSource, Snapshot, SysinfoSource},
    page::{Page, PageComposer},
    render::Sink,
};

/// Owns the FTL connection and drives one page cycle after another.
pub struct RefreshController<S: MetricsSource = SysinfoSource> {
    config: RefreshConfig,
    connection: Option<ConnectionHandle>,
    metrics: MetricsCollector<S>,
    composer: PageComposer,
    sink: Sink,
    shutdown: Shutdown,
    cycles: u64,
    last_collection_time: Duration,
}

impl<S: MetricsSource> RefreshController<S> {
    pub fn new(
        config: RefreshConfig,
        metrics: MetricsCollector<S>,
        sink: Sink,
        shutdown: Shutdown,
    ) -> Self {
        let composer = PageComposer::new(config.viewport);

        Self {
            config,
            connection: None,
            metrics,
            composer,
            sink,
            shutdown,
            cycles: 0,
            last_collection_time: Duration::ZERO,
        }
    }

    /// Page cycles in which every page was rendered.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    /// Runs until the single cycle is shown, a stop is requested, or FTL can't be reached.
    /// The connection is closed on every way out.
    #[instrument(
        level = "debug",
        skip(self),
        fields(ftl = %self.config.address(), mode = ?self.config.run_mode)
    )]
    pub fn run(&mut self) -> Result<Termination, ControllerError> {
        let result = self.drive();
        self.disconnect();

        match &result {
            Ok(termination) => info!(
                "Refresh loop ended ({termination:?}) after {} cycles",
                self.cycles
            ),
            Err(error) => error!("Refresh loop failed after {} cycles: {error}", self.cycles),
        }

        result
    }

    fn drive(&mut self) -> Result<Termination, ControllerError> {
        let mut state = State::Idle;

        loop {
            if self.shutdown.is_requested() && !state.is_terminated() {
                debug!("Stop requested while {}", state.name());
                state = State::Terminated(Termination::Stopped);
            }

            trace!("Entering {}", state.name());

            state = match state {
                State::Idle => {
                    self.connect()?;
                    State::Connected
                }
                State::Connected => State::Collecting,
                State::Collecting => match self.collect() {
                    Ok(snapshot) => State::Composing(snapshot),
                    Err(error) => State::Failed(error),
                },
                State::Composing(snapshot) => State::Rendering(self.composer.compose(&snapshot)),
                State::Rendering(pages) => match self.render_all(&pages) {
                    Some(0) => {
                        self.cycles += 1;
                        State::Waiting
                    }
                    Some(failed) => {
                        warn!("{failed} of {} pages were not shown this cycle", pages.len());
                        State::Waiting
                    }
                    None => State::Terminated(Termination::Stopped),
                },
                State::Waiting => self.wait_for_next_cycle(),
                State::Failed(error) => {
                    warn!("Cycle aborted: {error}");
                    self.disconnect();

                    match self.config.run_mode {
                        RunMode::Once => return Err(error.into()),
                        RunMode::Continuous => self.reconnect(error)?,
                    }
                }
                State::Terminated(termination) => return Ok(termination),
            };
        }
    }

    fn connect(&mut self) -> Result<(), ConnectionError> {
        let connection = ConnectionHandle::connect(
            &self.config.host,
            self.config.port,
            self.config.read_timeout,
        )?;
        self.connection = Some(connection);

        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
        }
    }

    /// Tries to get a connection back, doubling the wait after every failed attempt.
    fn reconnect(&mut self, cause: ProtocolError) -> Result<State, ControllerError> {
        let attempts = self.config.reconnect_attempts;
        let mut backoff = self.config.reconnect_backoff;
        let mut last_error = None;

        for attempt in 1..=attempts {
            info!("Reconnecting in {backoff:?}, attempt {attempt} of {attempts}");
            if !self.shutdown.sleep(backoff) {
                return Ok(State::Terminated(Termination::Stopped));
            }

            match self.connect() {
                Ok(()) => return Ok(State::Connected),
                Err(error) => {
                    warn!("Reconnect attempt {attempt} failed: {error}");
                    last_error = Some(error);
                }
            }

            backoff = backoff.saturating_mul(2);
        }

        match last_error {
            Some(source) => Err(ControllerError::ReconnectExhausted { attempts, source }),
            None => Err(cause.into()),
        }
    }

    #[instrument(level = "debug", skip(self))]
    fn collect(&mut self) -> Result<Snapshot, ProtocolError> {
        let started = Instant::now();

        let connection = self
            .connection
            .as_mut()
            .ok_or(ProtocolError::NotConnected)?;
        let version = connection.request(Command::Version)?;
        let blocking_stats = connection.request(Command::Stats)?;

        let system = self.metrics.collect();
        let missing = system.missing_fields();
        if !missing.is_empty() {
            debug!("No value for: {}", missing.join(", "));
        }

        self.last_collection_time = started.elapsed();
        debug!("Collected in {:?}", self.last_collection_time);

        Ok(Snapshot {
            version,
            blocking_stats,
            system,
            collected_at: Local::now(),
        })
    }

    /// Shows every page in order. A page that fails to render is logged and skipped.
    /// Returns `None` if a stop cut the cycle short, otherwise the number of failed pages.
    fn render_all(&mut self, pages: &[Page]) -> Option<usize> {
        let mut failed = 0;

        for (index, page) in pages.iter().enumerate() {
            if index > 0 && !self.shutdown.sleep(self.config.page_interval) {
                return None;
            }

            debug!("Page {} of {}: {}", index + 1, pages.len(), page.heading());
            if let Err(error) = self.sink.render(page) {
                error!("Failed to render {:?}: {error}", page.heading());
                failed += 1;
            }
        }

        Some(failed)
    }

    fn wait_for_next_cycle(&mut self) -> State {
        if self.config.run_mode == RunMode::Once {
            return State::Terminated(Termination::Completed);
        }

        let wait = self
            .config
            .cycle_interval
            .saturating_sub(self.last_collection_time);
        debug!("Next cycle in {wait:?}");

        if self.shutdown.sleep(wait) {
            State::Collecting
        } else {
            State::Terminated(Termination::Stopped)
        }
    }
}
