// Copyright (c) 2026 rezky_nightky

use std::str::FromStr;

/// Pixel size of one terminal cell. Every layer simulates in pixels; the
/// metrics decide how many of them a cell covers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellMetrics {
    pub width: f32,
    pub height: f32,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            width: 8.0,
            height: 16.0,
        }
    }
}

impl CellMetrics {
    /// Derives the cell size from the terminal's reported window pixel size.
    /// Many terminals report zero pixels; those get `None`.
    pub fn from_window(cols: u16, rows: u16, px_width: u16, px_height: u16) -> Option<Self> {
        if cols == 0 || rows == 0 || px_width == 0 || px_height == 0 {
            return None;
        }
        let width = px_width as f32 / cols as f32;
        let height = px_height as f32 / rows as f32;
        if !(1.0..=64.0).contains(&width) || !(1.0..=64.0).contains(&height) {
            return None;
        }
        Some(Self { width, height })
    }
}

impl FromStr for CellMetrics {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| "expected: WIDTHxHEIGHT".to_string())?;
        let width: u8 = a
            .trim()
            .parse()
            .map_err(|_| "invalid width".to_string())?;
        let height: u8 = b
            .trim()
            .parse()
            .map_err(|_| "invalid height".to_string())?;
        if !(1..=64).contains(&width) || !(1..=64).contains(&height) {
            return Err("each side must be within 1..=64".to_string());
        }
        Ok(Self {
            width: width as f32,
            height: height as f32,
        })
    }
}

/// Pixel-space view of the terminal grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    cols: u16,
    rows: u16,
    metrics: CellMetrics,
}

impl Surface {
    /// A zero-sized terminal has nothing to draw on; callers treat `None` as
    /// "skip rendering" rather than an error.
    pub fn from_cells(cols: u16, rows: u16, metrics: CellMetrics) -> Option<Self> {
        if cols == 0 || rows == 0 {
            return None;
        }
        Some(Self {
            cols,
            rows,
            metrics,
        })
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn metrics(&self) -> CellMetrics {
        self.metrics
    }

    pub fn width(&self) -> f32 {
        self.cols as f32 * self.metrics.width
    }

    pub fn height(&self) -> f32 {
        self.rows as f32 * self.metrics.height
    }

    pub fn cell_of(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / self.metrics.width) as u32;
        let row = (y / self.metrics.height) as u32;
        if col >= self.cols as u32 || row >= self.rows as u32 {
            return None;
        }
        Some((col as u16, row as u16))
    }

    pub fn cell_center(&self, col: u16, row: u16) -> (f32, f32) {
        (
            (col as f32 + 0.5) * self.metrics.width,
            (row as f32 + 0.5) * self.metrics.height,
        )
    }
}
