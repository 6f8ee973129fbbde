//! Global adaptive threshold shared by every sensor of a run.

use crate::grid::VariabilityGrid;
use crate::math::median_f64_mut;

/// Lowest lower limit a run may use.
pub const THRESHOLD_FLOOR: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalThreshold {
    /// Median of every cell of every grid.
    pub median: f64,
    /// The median, raised to [`THRESHOLD_FLOOR`] when below it.
    pub lower_limit: f64,
}

impl GlobalThreshold {
    pub fn is_floored(&self) -> bool {
        self.lower_limit != self.median
    }
}

/// Median across all cells of `grids`, floored at [`THRESHOLD_FLOOR`].
/// No cells at all yields the floor.
pub fn global_threshold<'a>(grids: impl IntoIterator<Item = &'a VariabilityGrid>) -> GlobalThreshold {
    let mut values: Vec<f64> = grids
        .into_iter()
        .flat_map(|grid| grid.pixels().iter().copied())
        .collect();

    let median = if values.is_empty() {
        0.0
    } else {
        median_f64_mut(&mut values)
    };
    let lower_limit = if median < THRESHOLD_FLOOR {
        THRESHOLD_FLOOR
    } else {
        median
    };

    if lower_limit != median {
        tracing::info!(median, lower_limit, "median below floor, switched to floor");
    }

    GlobalThreshold {
        median,
        lower_limit,
    }
}
