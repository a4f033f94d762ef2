pub mod display;
pub mod display_sink;
pub mod log_sink;

use enum_dispatch::enum_dispatch;
use tracing::*;

use crate::page::Page;

use display::{DisplayDriver, DisplayError};
use display_sink::DisplayRenderSink;
use log_sink::LogRenderSink;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to clear the display buffer: {0}")]
    Clear(#[source] DisplayError),

    #[error("Failed to draw {heading:?}: {source}")]
    Draw {
        heading: String,
        source: DisplayError,
    },

    #[error("Failed to flush the display: {0}")]
    Flush(#[source] DisplayError),
}

#[enum_dispatch]
pub trait RenderSink {
    /// Blank the output before a new page.
    fn clear(&mut self) -> Result<(), RenderError>;

    fn draw_page(&mut self, page: &Page) -> Result<(), RenderError>;

    /// Push whatever was drawn out to the target.
    fn flush(&mut self) -> Result<(), RenderError>;
}

#[enum_dispatch(RenderSink)]
#[derive(Debug)]
pub enum Sink {
    Display(DisplayRenderSink),
    Log(LogRenderSink),
}

impl Sink {
    /// Clear, draw and flush one page. The first failing step aborts the page.
    #[instrument(level = "debug", skip_all, fields(page = %page.heading()))]
    pub fn render(&mut self, page: &Page) -> Result<(), RenderError> {
        self.clear()?;
        self.draw_page(page)?;
        self.flush()
    }
}

#[instrument(level = "debug")]
pub fn create_display_sink(driver: Box<dyn DisplayDriver>, origin_x: u32, origin_y: u32) -> Sink {
    Sink::Display(DisplayRenderSink::new(driver, origin_x, origin_y))
}

#[instrument(level = "debug")]
pub fn create_log_sink() -> Sink {
    Sink::Log(LogRenderSink::default())
}
