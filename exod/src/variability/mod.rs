//! Per-pixel variability over time windows.
//!
//! Events are binned into the windows of a [`WindowPlan`], each event
//! counting towards its pixel's 3x3 neighbourhood. Windows with too little
//! good time are discarded and the remaining counts are scaled by each
//! window's projection ratio. A pixel's variability is the largest excursion
//! of its scaled counts from their median, relative to that median:
//!
//! ```text
//! v = max(max - median, |min - median|) / median     (median != 0)
//! v = max                                             (median == 0)
//! ```
//!
//! Fewer than two usable windows leave the grid at the baseline of 1.0.

mod counts;
mod windows;

#[cfg(test)]
mod tests;

pub use counts::WindowCounts;
pub use windows::{GtiEdges, TimeWindow, WindowPlan, MAX_WINDOWS};

use crate::error::{SensorError, VariabilityError};
use crate::event::{Event, GoodTimeInterval};
use crate::grid::{GridShape, PixelGrid, VariabilityGrid};
use crate::math::median_f64_mut;

/// Value of a cell that was never computed.
pub const BASELINE_VARIABILITY: f64 = 1.0;

/// Why a grid holds the values it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariabilityStatus {
    Computed,
    /// The sensor recorded nothing.
    NoEvents,
    /// Fewer than two windows passed the good time ratio.
    NoUsableData,
}

#[derive(Debug, Clone)]
pub struct VariabilityOutcome {
    pub grid: VariabilityGrid,
    pub status: VariabilityStatus,
    /// Events that landed in an accepted window.
    pub events_counted: usize,
    /// Events in rejected windows or past the effective stop.
    pub events_skipped: usize,
}

impl VariabilityOutcome {
    fn baseline(shape: GridShape, status: VariabilityStatus, events_skipped: usize) -> Self {
        Self {
            grid: PixelGrid::new_filled(shape, BASELINE_VARIABILITY),
            status,
            events_counted: 0,
            events_skipped,
        }
    }
}

/// Computes variability grids for sensors sharing one window plan.
#[derive(Debug, Clone)]
pub struct VariabilityEstimator {
    plan: WindowPlan,
    shape: GridShape,
}

impl VariabilityEstimator {
    pub fn new(plan: WindowPlan, shape: GridShape) -> Self {
        Self { plan, shape }
    }

    pub fn plan(&self) -> &WindowPlan {
        &self.plan
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Variability grid for one sensor's time-sorted events.
    ///
    /// Fails only when an event's pixel lies outside the grid.
    pub fn estimate(&self, events: &[Event]) -> Result<VariabilityOutcome, SensorError> {
        let shape = self.shape;
        if events.is_empty() {
            return Ok(VariabilityOutcome::baseline(
                shape,
                VariabilityStatus::NoEvents,
                0,
            ));
        }

        let slots = self.plan.accepted_slots();
        let ratios: Vec<f64> = self.plan.accepted().map(|w| w.projection_ratio).collect();
        let usable = ratios.len() > 1;

        let mut counts = WindowCounts::new(shape, if usable { ratios.len() } else { 0 });
        let mut counted = 0;
        for (index, event) in events.iter().enumerate() {
            if !shape.contains(event.x as i64, event.y as i64) {
                return Err(SensorError::EventOutsideGrid {
                    index,
                    x: event.x,
                    y: event.y,
                    shape,
                });
            }
            if !usable {
                continue;
            }
            let slot = self
                .plan
                .window_index(event.time)
                .and_then(|window| slots[window]);
            if let Some(slot) = slot {
                counts.add_neighbourhood(event.x as usize, event.y as usize, slot);
                counted += 1;
            }
        }

        if !usable {
            tracing::warn!(
                sensor = events[0].sensor,
                accepted_windows = ratios.len(),
                "no usable data within the good time intervals"
            );
            return Ok(VariabilityOutcome::baseline(
                shape,
                VariabilityStatus::NoUsableData,
                events.len(),
            ));
        }

        let mut scaled = vec![0.0; ratios.len()];
        let grid = PixelGrid::from_fn(shape, |x, y| {
            for ((value, &count), &ratio) in scaled.iter_mut().zip(counts.pixel(x, y)).zip(&ratios)
            {
                *value = count as f64 / ratio;
            }
            pixel_variability(&mut scaled)
        });

        tracing::debug!(
            sensor = events[0].sensor,
            counted,
            skipped = events.len() - counted,
            windows = ratios.len(),
            "variability computed"
        );

        Ok(VariabilityOutcome {
            grid,
            status: VariabilityStatus::Computed,
            events_counted: counted,
            events_skipped: events.len() - counted,
        })
    }
}

/// Largest relative excursion from the median of `values`, which are
/// reordered. Returns the maximum when the median is zero.
pub fn pixel_variability(values: &mut [f64]) -> f64 {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let median = median_f64_mut(values);
    if median != 0.0 {
        (max - median).max((min - median).abs()) / median
    } else {
        max
    }
}

/// Plans the windows for `[t_start, t_end]` and estimates one sensor's grid.
pub fn compute_variability(
    gti: &[GoodTimeInterval],
    window_duration: f64,
    good_time_ratio: f64,
    t_start: f64,
    t_end: f64,
    events: &[Event],
) -> Result<VariabilityOutcome, VariabilityError> {
    let plan = WindowPlan::new(gti, t_start, t_end, window_duration, good_time_ratio)?;
    Ok(VariabilityEstimator::new(plan, GridShape::SENSOR).estimate(events)?)
}
