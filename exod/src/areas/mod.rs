//! Box-scan detection of variable areas in a variability grid.
//!
//! A `box_size x box_size` box slides over the grid row by row. A box whose
//! sum exceeds `detection_level * box_size^2 * lower_limit` is a hit, and its
//! footprint is merged into the first already-detected area sharing more than
//! one cell with it, or else starts a new area. A box summing to zero skips
//! ahead by a full box width.
//!
//! The merge is single-pass: an area absorbing a box is never merged with
//! other areas afterwards, so this is not a connected-component labelling.


use std::collections::BTreeSet;

use crate::config::BoxSumMode;
use crate::grid::VariabilityGrid;

/// A set of `(x, y)` cells of one sensor's grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableArea {
    cells: BTreeSet<(usize, usize)>,
}

impl VariableArea {
    pub fn from_cells(cells: impl IntoIterator<Item = (usize, usize)>) -> Self {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    /// All cells of the box anchored at `(x, y)`.
    pub fn from_box(x: usize, y: usize, box_size: usize) -> Self {
        Self::from_cells(
            (x..x + box_size).flat_map(|a| (y..y + box_size).map(move |b| (a, b))),
        )
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.cells.contains(&(x, y))
    }

    /// Cells in `(x, y)` order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().copied()
    }

    pub fn shared_cells(&self, other: &VariableArea) -> usize {
        self.cells.intersection(&other.cells).count()
    }

    fn absorb(&mut self, other: VariableArea) {
        self.cells.extend(other.cells);
    }
}

/// Aggregate of the box anchored at `(x, y)`.
///
/// [`BoxSumMode::AnchorSample`] adds the anchor cell `box_size^2` times.
pub fn box_sum(
    grid: &VariabilityGrid,
    x: usize,
    y: usize,
    box_size: usize,
    mode: BoxSumMode,
) -> f64 {
    debug_assert!(x + box_size <= grid.rows() && y + box_size <= grid.cols());
    match mode {
        BoxSumMode::AnchorSample => {
            let anchor = grid[(x, y)];
            let mut sum = 0.0;
            for _ in 0..box_size * box_size {
                sum += anchor;
            }
            sum
        }
        BoxSumMode::Footprint => (x..x + box_size)
            .map(|a| grid.row(a)[y..y + box_size].iter().sum::<f64>())
            .sum(),
    }
}

/// Merges the box anchored at `(x, y)` into `areas`: the first area sharing
/// more than one cell absorbs it, otherwise it is appended.
pub fn add_to_detected_areas(areas: &mut Vec<VariableArea>, x: usize, y: usize, box_size: usize) {
    let footprint = VariableArea::from_box(x, y, box_size);
    match areas
        .iter_mut()
        .find(|area| area.shared_cells(&footprint) > 1)
    {
        Some(area) => area.absorb(footprint),
        None => areas.push(footprint),
    }
}

/// Scan parameters shared by every sensor of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaDetector {
    pub box_size: usize,
    pub detection_level: f64,
    pub mode: BoxSumMode,
}

impl AreaDetector {
    pub fn new(box_size: usize, detection_level: f64, mode: BoxSumMode) -> Self {
        assert!(box_size > 0, "box_size must be > 0");
        Self {
            box_size,
            detection_level,
            mode,
        }
    }

    /// Box sum a hit must exceed.
    pub fn box_threshold(&self, lower_limit: f64) -> f64 {
        self.detection_level * (self.box_size * self.box_size) as f64 * lower_limit
    }

    /// Variable areas of `grid`, in emission order.
    ///
    /// Box anchors range over `x < rows - box_size` and `y < cols - box_size`,
    /// so the last row and column of anchors are never visited.
    pub fn detect(&self, grid: &VariabilityGrid, lower_limit: f64) -> Vec<VariableArea> {
        let box_size = self.box_size;
        let threshold = self.box_threshold(lower_limit);
        let x_end = grid.rows().saturating_sub(box_size);
        let y_end = grid.cols().saturating_sub(box_size);

        let mut areas = Vec::new();
        for x in 0..x_end {
            let mut y = 0;
            while y < y_end {
                let sum = box_sum(grid, x, y, box_size, self.mode);
                if sum == 0.0 {
                    y += box_size;
                    continue;
                }
                if sum > threshold {
                    add_to_detected_areas(&mut areas, x, y, box_size);
                }
                y += 1;
            }
        }
        areas
    }
}

/// Variable areas of `grid` using the anchor-sampled box sum.
pub fn detect_areas(
    lower_limit: f64,
    box_size: usize,
    detection_level: f64,
    grid: &VariabilityGrid,
) -> Vec<VariableArea> {
    AreaDetector::new(box_size, detection_level, BoxSumMode::AnchorSample).detect(grid, lower_limit)
}
