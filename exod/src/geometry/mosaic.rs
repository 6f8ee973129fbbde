//! Placement of the twelve sensor grids on one focal-plane mosaic.
//!
//! The mosaic is six bands of 64 rows, each band holding two sensors side by
//! side. Left-half sensors are flipped vertically; right-half sensors are
//! flipped horizontally, so both halves face the mosaic centre.

use glam::DVec2;

use crate::error::GeometryError;
use crate::grid::{GridShape, PixelGrid, VariabilityGrid, SENSOR_COUNT};

pub const MOSAIC_SHAPE: GridShape = GridShape::new(384, 400);

const BAND_ROWS: usize = GridShape::SENSOR.rows;
const HALF_COLS: usize = GridShape::SENSOR.cols;

/// Sensors of each band, top to bottom.
const LEFT_SENSORS: [usize; 6] = [8, 7, 6, 9, 10, 11];
const RIGHT_SENSORS: [usize; 6] = [5, 4, 3, 0, 1, 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MosaicSide {
    Left,
    Right,
}

/// Band and half occupied by `sensor`.
pub fn sensor_slot(sensor: usize) -> Option<(MosaicSide, usize)> {
    if let Some(band) = LEFT_SENSORS.iter().position(|&s| s == sensor) {
        return Some((MosaicSide::Left, band));
    }
    RIGHT_SENSORS
        .iter()
        .position(|&s| s == sensor)
        .map(|band| (MosaicSide::Right, band))
}

/// The sensor cell shown at mosaic `(row, col)`, as `(sensor, x, y)`.
pub fn mosaic_cell_source(row: usize, col: usize) -> (usize, usize, usize) {
    debug_assert!(row < MOSAIC_SHAPE.rows && col < MOSAIC_SHAPE.cols);
    let band = row / BAND_ROWS;
    let j = row % BAND_ROWS;
    if col < HALF_COLS {
        (LEFT_SENSORS[band], BAND_ROWS - 1 - j, col)
    } else {
        (RIGHT_SENSORS[band], j, 2 * HALF_COLS - 1 - col)
    }
}

/// Assembles per-sensor grids (indexed by sensor) into the 384 x 400 mosaic.
pub fn assemble_mosaic(grids: &[VariabilityGrid]) -> Result<VariabilityGrid, GeometryError> {
    if grids.len() != SENSOR_COUNT {
        return Err(GeometryError::MosaicSensorCount {
            expected: SENSOR_COUNT,
            actual: grids.len(),
        });
    }
    if let Some((sensor, grid)) = grids
        .iter()
        .enumerate()
        .find(|(_, grid)| grid.shape() != GridShape::SENSOR)
    {
        return Err(GeometryError::MosaicShape {
            sensor,
            expected: GridShape::SENSOR,
            actual: grid.shape(),
        });
    }

    Ok(PixelGrid::from_fn(MOSAIC_SHAPE, |row, col| {
        let (sensor, x, y) = mosaic_cell_source(row, col);
        grids[sensor][(x, y)]
    }))
}

/// Position of a raw sensor point on the mosaic, with `y` measured upwards
/// from the bottom edge.
///
/// Raw cell centres sit on integers. Mosaic cell `(row, col)` covers
/// `[col, col + 1)` horizontally and `[rows - row - 1, rows - row)`
/// vertically, so a raw cell centre lands on the centre of the mosaic cell
/// that shows it on either half.
pub fn mosaic_position(sensor: usize, raw: DVec2) -> Result<DVec2, GeometryError> {
    let (side, band) = sensor_slot(sensor).ok_or(GeometryError::UnknownSensor(sensor))?;
    let band_bottom = (MOSAIC_SHAPE.rows - (band + 1) * BAND_ROWS) as f64;
    let edge = raw + DVec2::splat(0.5);
    Ok(match side {
        MosaicSide::Left => DVec2::new(edge.y, band_bottom + edge.x),
        MosaicSide::Right => DVec2::new(
            MOSAIC_SHAPE.cols as f64 - edge.y,
            band_bottom + BAND_ROWS as f64 - edge.x,
        ),
    })
}
