use tracing::*;

use super::{display::DisplayDriver, RenderError, RenderSink};
use crate::page::Page;

/// Draws page bodies on a physical panel at a fixed origin.
#[derive(Debug)]
pub struct DisplayRenderSink {
    driver: Box<dyn DisplayDriver>,
    origin_x: u32,
    origin_y: u32,
}

impl DisplayRenderSink {
    pub fn new(driver: Box<dyn DisplayDriver>, origin_x: u32, origin_y: u32) -> Self {
        Self {
            driver,
            origin_x,
            origin_y,
        }
    }
}

impl RenderSink for DisplayRenderSink {
    fn clear(&mut self) -> Result<(), RenderError> {
        self.driver.clear_buffer().map_err(RenderError::Clear)
    }

    fn draw_page(&mut self, page: &Page) -> Result<(), RenderError> {
        trace!("Drawing {:?} at ({}, {})", page.heading(), self.origin_x, self.origin_y);

        self.driver
            .draw_text(&page.body, self.origin_x, self.origin_y)
            .map_err(|source| RenderError::Draw {
                heading: page.heading(),
                source,
            })
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        self.driver.flush().map_err(RenderError::Flush)
    }
}
