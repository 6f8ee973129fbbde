//! Per-pixel event counts for each accepted time window.

use crate::grid::GridShape;

/// Pixel-major count cube: the counts of one pixel across all windows are
/// contiguous.
#[derive(Debug, Clone)]
pub struct WindowCounts {
    shape: GridShape,
    windows: usize,
    counts: Vec<u32>,
}

impl WindowCounts {
    pub fn new(shape: GridShape, windows: usize) -> Self {
        Self {
            shape,
            windows,
            counts: vec![0; shape.len() * windows],
        }
    }

    pub fn windows(&self) -> usize {
        self.windows
    }

    /// Adds one count to every cell of the 3x3 neighbourhood of `(x, y)`
    /// that lies inside the grid.
    pub fn add_neighbourhood(&mut self, x: usize, y: usize, window: usize) {
        debug_assert!(window < self.windows);
        let x_range = x.saturating_sub(1)..(x + 2).min(self.shape.rows);
        let y_range = y.saturating_sub(1)..(y + 2).min(self.shape.cols);
        for nx in x_range {
            for ny in y_range.clone() {
                self.counts[self.shape.index(nx, ny) * self.windows + window] += 1;
            }
        }
    }

    /// Counts of one pixel, one entry per window.
    pub fn pixel(&self, x: usize, y: usize) -> &[u32] {
        let start = self.shape.index(x, y) * self.windows;
        &self.counts[start..start + self.windows]
    }
}
