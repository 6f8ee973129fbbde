//! Rotation and rectification shared by point and image transforms.

use glam::DVec2;

use crate::error::GeometryError;
use crate::geometry::mosaic::MOSAIC_SHAPE;

/// Below this `|cos 2a|` the rectified size is unbounded.
const DEGENERATE_COS_2A: f64 = 1e-9;

/// Rotates `v` counter-clockwise by `angle_deg` degrees:
/// `(x cos a - y sin a, x sin a + y cos a)`.
///
/// Every rotation in the crate goes through here, so points and images
/// share one sign convention.
#[inline]
pub fn rotate(v: DVec2, angle_deg: f64) -> DVec2 {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    DVec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Axis-aligned bounds of the sky-pixel footprint of an observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: DVec2,
    pub max: DVec2,
}

impl Extent {
    pub fn new(min: DVec2, max: DVec2) -> Result<Self, GeometryError> {
        if !(min.is_finite() && max.is_finite() && min.x < max.x && min.y < max.y) {
            return Err(GeometryError::InvalidExtent {
                min: min.to_array(),
                max: max.to_array(),
            });
        }
        Ok(Self { min, max })
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    pub fn center(&self) -> DVec2 {
        self.min + self.size() / 2.0
    }
}

/// Size of the unrotated frame whose rotation by `angle_deg` fits `size`:
/// on each axis, the smaller of the two projections divided by `|cos 2a|`.
pub fn rectified_size(size: DVec2, angle_deg: f64) -> Result<DVec2, GeometryError> {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let cos_2a = (2.0 * angle_deg.to_radians()).cos();
    if cos_2a.abs() < DEGENERATE_COS_2A {
        return Err(GeometryError::DegenerateRotation { angle: angle_deg });
    }

    let x = (size.x * cos - size.y * sin)
        .abs()
        .min((size.x * cos + size.y * sin).abs());
    let y = (size.y * cos - size.x * sin)
        .abs()
        .min((size.y * cos + size.x * sin).abs());
    Ok(DVec2::new(x, y) / cos_2a.abs())
}

/// Maps a mosaic position into the rotated frame spanning `extent`.
///
/// The position is recentred on the mosaic middle, scaled from mosaic pixels
/// to the rectified size, rotated, and recentred on the extent.
pub fn transform(point: DVec2, extent: &Extent, angle_deg: f64) -> Result<DVec2, GeometryError> {
    let rectified = rectified_size(extent.size(), angle_deg)?;
    let mosaic = DVec2::new(MOSAIC_SHAPE.cols as f64, MOSAIC_SHAPE.rows as f64);
    let offset = (point - mosaic / 2.0) * rectified / mosaic;
    Ok(rotate(offset, angle_deg) + extent.center())
}
