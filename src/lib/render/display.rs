use std::path::{Path, PathBuf};

use tracing::*;

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("Text origin ({x}, {y}) is outside the {width}x{height} panel")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("Failed writing the frame to {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What the refresh loop needs from a physical panel, called in this order per page.
pub trait DisplayDriver: std::fmt::Debug + Send {
    fn clear_buffer(&mut self) -> Result<(), DisplayError>;

    /// `x` and `y` are pixel coordinates of the first glyph.
    fn draw_text(&mut self, text: &str, x: u32, y: u32) -> Result<(), DisplayError>;

    fn flush(&mut self) -> Result<(), DisplayError>;
}

/// Pixel size of one glyph including spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphCell {
    pub width: u32,
    pub height: u32,
}

impl Default for GlyphCell {
    // 5x7 bitmap font with one pixel of spacing on each axis
    fn default() -> Self {
        Self {
            width: 6,
            height: 8,
        }
    }
}

/// Text-mode panel driver.
///
/// Draws into an in-memory grid of glyph cells covering the panel and writes the whole
/// grid to `device_path` on flush, where the panel's own refresher picks it up.
#[derive(Debug)]
pub struct TextPanel {
    device_path: PathBuf,
    width_px: u32,
    height_px: u32,
    cell: GlyphCell,
    grid: Vec<Vec<char>>,
}

impl TextPanel {
    pub fn new(device_path: &Path, width_px: u32, height_px: u32, cell: GlyphCell) -> Self {
        let cell = GlyphCell {
            width: cell.width.max(1),
            height: cell.height.max(1),
        };
        let columns = (width_px / cell.width) as usize;
        let rows = (height_px / cell.height) as usize;

        Self {
            device_path: device_path.to_path_buf(),
            width_px,
            height_px,
            cell,
            grid: vec![vec![' '; columns]; rows],
        }
    }

    pub fn columns(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    /// Text columns and rows left after starting at pixel (`x`, `y`).
    pub fn capacity_from(&self, x: u32, y: u32) -> (usize, usize) {
        let column = (x / self.cell.width) as usize;
        let row = (y / self.cell.height) as usize;

        (
            self.columns().saturating_sub(column),
            self.rows().saturating_sub(row),
        )
    }

    pub fn contents(&self) -> String {
        self.grid
            .iter()
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect::<Vec<String>>()
            .join("\n")
    }
}

impl DisplayDriver for TextPanel {
    fn clear_buffer(&mut self) -> Result<(), DisplayError> {
        self.grid.iter_mut().for_each(|row| row.fill(' '));
        Ok(())
    }

    fn draw_text(&mut self, text: &str, x: u32, y: u32) -> Result<(), DisplayError> {
        let (columns, rows) = self.capacity_from(x, y);
        if columns == 0 || rows == 0 {
            return Err(DisplayError::OutOfBounds {
                x,
                y,
                width: self.width_px,
                height: self.height_px,
            });
        }

        let first_column = (x / self.cell.width) as usize;
        let first_row = (y / self.cell.height) as usize;

        for (offset, line) in text.lines().take(rows).enumerate() {
            let row = &mut self.grid[first_row + offset];
            for (column, character) in line.chars().take(columns).enumerate() {
                row[first_column + column] = character;
            }

            if line.chars().count() > columns {
                trace!("Clipped line {offset} at the panel edge");
            }
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let mut frame = self.contents();
        frame.push('\n');

        std::fs::write(&self.device_path, frame).map_err(|source| DisplayError::Io {
            path: self.device_path.clone(),
            source,
        })
    }
}
