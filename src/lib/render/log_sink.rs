use tracing::*;

use super::{RenderError, RenderSink};
use crate::page::Page;

const SEPARATOR: &str = "----------";

/// Writes pages to the log instead of a panel.
#[derive(Debug, Default)]
pub struct LogRenderSink {
    rendered: usize,
}

impl LogRenderSink {
    pub fn rendered(&self) -> usize {
        self.rendered
    }
}

impl RenderSink for LogRenderSink {
    fn clear(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn draw_page(&mut self, page: &Page) -> Result<(), RenderError> {
        info!("{SEPARATOR} {} {SEPARATOR}", page.heading());
        for line in page.lines() {
            info!("{line}");
        }
        info!("{SEPARATOR}");

        self.rendered += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}
