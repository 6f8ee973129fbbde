//! Reduction of variable areas to sources.
//!
//! Each area becomes a centroid (component-wise mean of its cells) and a
//! radius `round(sqrt(dx^2 + dy^2))`, where `dx` and `dy` are the largest
//! per-axis distances from the centroid. Areas whose sensor and truncated
//! centroid x match the bad-pixel list are not reported as sources, but
//! their cells are still recorded.

mod lightcurve;

#[cfg(test)]
mod tests;

pub use lightcurve::{light_curve, Excursion, LightCurve, LightCurvePoint};

use std::collections::BTreeSet;

use glam::DVec2;

use crate::areas::VariableArea;
use crate::geometry::SkyPosition;

/// Known hot columns, as `(sensor, raw x)` with 0-based sensors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadPixelList {
    entries: BTreeSet<(usize, i64)>,
}

impl BadPixelList {
    pub const DEFAULT_ENTRIES: [(usize, i64); 5] = [(4, 11), (4, 12), (4, 13), (5, 12), (10, 28)];

    pub fn new(entries: impl IntoIterator<Item = (usize, i64)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::new([])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a centroid at `center_x` on `sensor` is excluded. The
    /// fractional part of `center_x` is dropped.
    pub fn excludes(&self, sensor: usize, center_x: f64) -> bool {
        self.entries.contains(&(sensor, center_x.trunc() as i64))
    }
}

impl Default for BadPixelList {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ENTRIES)
    }
}

/// Where a source lands on the focal plane and the sky.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourcePlacement {
    /// Position on the assembled sensor mosaic.
    pub mosaic: DVec2,
    /// Position in the rotated, rectified projection.
    pub projected: DVec2,
    pub sky: SkyPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// 1-based, in sensor then emission order.
    pub id: u32,
    /// 0-based sensor index.
    pub sensor: usize,
    /// Centroid in raw `(x, y)` pixel coordinates.
    pub center: DVec2,
    pub radius: u32,
    pub pixel_count: usize,
    /// Filled in once geometry is known.
    pub placement: Option<SourcePlacement>,
}

/// One cell of a detected area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedPixel {
    /// Id of the source the area became, `None` for excluded areas.
    pub source_id: Option<u32>,
    pub sensor: usize,
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Reduction {
    pub sources: Vec<Source>,
    pub detected_pixels: Vec<DetectedPixel>,
    pub excluded_areas: usize,
}

pub fn area_center(area: &VariableArea) -> DVec2 {
    debug_assert!(!area.is_empty());
    let sum = area
        .cells()
        .fold(DVec2::ZERO, |acc, (x, y)| acc + DVec2::new(x as f64, y as f64));
    sum / area.len() as f64
}

/// Radius from the largest per-axis deviations, rounded half to even.
pub fn area_radius(area: &VariableArea, center: DVec2) -> u32 {
    let max_dev = area.cells().fold(DVec2::ZERO, |acc, (x, y)| {
        acc.max((DVec2::new(x as f64, y as f64) - center).abs())
    });
    max_dev.length().round_ties_even() as u32
}

/// Turns per-sensor area lists (indexed by sensor) into sources with
/// run-wide sequential ids.
pub fn reduce(areas_by_sensor: &[Vec<VariableArea>], bad_pixels: &BadPixelList) -> Reduction {
    let mut reduction = Reduction::default();
    let mut next_id = 1u32;

    for (sensor, areas) in areas_by_sensor.iter().enumerate() {
        for area in areas.iter().filter(|area| !area.is_empty()) {
            let center = area_center(area);
            let radius = area_radius(area, center);

            let source_id = if bad_pixels.excludes(sensor, center.x) {
                tracing::debug!(sensor, x = center.x, y = center.y, "area on bad pixels skipped");
                reduction.excluded_areas += 1;
                None
            } else {
                let id = next_id;
                next_id += 1;
                reduction.sources.push(Source {
                    id,
                    sensor,
                    center,
                    radius,
                    pixel_count: area.len(),
                    placement: None,
                });
                Some(id)
            };

            reduction
                .detected_pixels
                .extend(area.cells().map(|(x, y)| DetectedPixel {
                    source_id,
                    sensor,
                    x,
                    y,
                }));
        }
    }

    reduction
}
