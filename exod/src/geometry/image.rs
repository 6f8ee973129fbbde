//! Whole-image projection of the mosaic onto a fixed square canvas.
//!
//! The mosaic is rotated about its centre with the canvas grown to hold the
//! rotated corners, flipped vertically, resized to the part of the canvas
//! the projected footprint covers within the legal limits, and zero-padded
//! out to [`CANVAS_SIZE`] on each side.

use glam::DVec2;
use rayon::prelude::*;

use crate::error::GeometryError;
use crate::geometry::projection::rotate;
use crate::grid::{GridShape, PixelGrid};

/// Side of the output canvas in pixels.
pub const CANVAS_SIZE: usize = 648;

/// Rows per parallel chunk when resampling.
const ROWS_PER_CHUNK: usize = 32;

/// Projected and legal coordinate limits of the observation, per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageProjection {
    pub projected_x: [f64; 2],
    pub projected_y: [f64; 2],
    pub legal_x: [f64; 2],
    pub legal_y: [f64; 2],
}

/// Padding on each side, and the size of the image between the pads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasLayout {
    /// `(top, bottom)` rows.
    pub pad_rows: (usize, usize),
    /// `(left, right)` columns.
    pub pad_cols: (usize, usize),
    pub rows: usize,
    pub cols: usize,
}

/// Pads along one axis: the distance from each legal limit to the projected
/// limit, in canvas pixels, truncated towards zero.
fn axis_pads(projected: [f64; 2], legal: [f64; 2]) -> Result<(i64, i64), GeometryError> {
    let span = legal[1] - legal[0];
    if !(span.is_finite() && span > 0.0) {
        return Err(GeometryError::EmptyLimits {
            min: legal[0],
            max: legal[1],
        });
    }
    let scale = CANVAS_SIZE as f64 / span;
    Ok((
        ((projected[0] - legal[0]) * scale) as i64,
        ((legal[1] - projected[1]) * scale) as i64,
    ))
}

impl ImageProjection {
    pub fn layout(&self) -> Result<CanvasLayout, GeometryError> {
        let (left, right) = axis_pads(self.projected_x, self.legal_x)?;
        let (top, bottom) = axis_pads(self.projected_y, self.legal_y)?;
        let cols = CANVAS_SIZE as i64 - left - right;
        let rows = CANVAS_SIZE as i64 - top - bottom;
        if rows <= 0 || cols <= 0 || [left, right, top, bottom].iter().any(|&p| p < 0) {
            return Err(GeometryError::EmptyFootprint { rows, cols });
        }
        Ok(CanvasLayout {
            pad_rows: (top as usize, bottom as usize),
            pad_cols: (left as usize, right as usize),
            rows: rows as usize,
            cols: cols as usize,
        })
    }
}

/// Bilinear sample at fractional `(row, col)`. Neighbours outside the image
/// read as zero.
#[inline]
fn sample_bilinear(image: &PixelGrid<f64>, row: f64, col: f64) -> f64 {
    let r0 = row.floor();
    let c0 = col.floor();
    let fr = row - r0;
    let fc = col - c0;
    let (r0, c0) = (r0 as i64, c0 as i64);

    let at = |r: i64, c: i64| {
        if r < 0 || c < 0 {
            0.0
        } else {
            image.get(r as usize, c as usize).unwrap_or(0.0)
        }
    };

    let top = at(r0, c0) + fc * (at(r0, c0 + 1) - at(r0, c0));
    let bottom = at(r0 + 1, c0) + fc * (at(r0 + 1, c0 + 1) - at(r0 + 1, c0));
    top + fr * (bottom - top)
}

/// Fills a new `shape` grid in parallel row chunks, `f(row, col)` per cell.
fn par_fill(shape: GridShape, f: impl Fn(usize, usize) -> f64 + Sync) -> PixelGrid<f64> {
    let mut pixels = vec![0.0; shape.len()];
    if shape.is_empty() {
        return PixelGrid::from_vec(shape, pixels);
    }
    pixels
        .par_chunks_mut(shape.cols * ROWS_PER_CHUNK)
        .enumerate()
        .for_each(|(chunk, rows)| {
            for (i, row) in rows.chunks_mut(shape.cols).enumerate() {
                let r = chunk * ROWS_PER_CHUNK + i;
                for (c, value) in row.iter_mut().enumerate() {
                    *value = f(r, c);
                }
            }
        });
    PixelGrid::from_vec(shape, pixels)
}

/// Rotates `image` by `angle_deg` about its centre, enlarging the output to
/// the bounding box of the rotated corners. Uncovered cells are zero.
pub fn rotate_image(image: &PixelGrid<f64>, angle_deg: f64) -> PixelGrid<f64> {
    let in_size = DVec2::new(image.rows() as f64, image.cols() as f64);

    // Output to input is a rotation by -angle in (row, col) space.
    let corners = [
        DVec2::ZERO,
        DVec2::new(0.0, in_size.y),
        DVec2::new(in_size.x, 0.0),
        in_size,
    ]
    .map(|corner| rotate(corner, -angle_deg));
    let lo = corners.iter().fold(DVec2::INFINITY, |acc, &c| acc.min(c));
    let hi = corners.iter().fold(DVec2::NEG_INFINITY, |acc, &c| acc.max(c));
    let out_size = (hi - lo + 0.5).floor();
    let out_shape = GridShape::new(out_size.x as usize, out_size.y as usize);

    let in_center = (in_size - 1.0) / 2.0;
    let out_center = (out_size - 1.0) / 2.0;

    par_fill(out_shape, |r, c| {
        let src = rotate(DVec2::new(r as f64, c as f64) - out_center, -angle_deg) + in_center;
        sample_bilinear(image, src.x, src.y)
    })
}

pub fn flip_rows(image: &PixelGrid<f64>) -> PixelGrid<f64> {
    let rows = image.rows();
    PixelGrid::from_fn(image.shape(), |r, c| image[(rows - 1 - r, c)])
}

/// Bilinear resize mapping pixel centres onto pixel centres.
pub fn resize_bilinear(image: &PixelGrid<f64>, rows: usize, cols: usize) -> PixelGrid<f64> {
    let scale_r = image.rows() as f64 / rows as f64;
    let scale_c = image.cols() as f64 / cols as f64;
    par_fill(GridShape::new(rows, cols), |r, c| {
        let src_r = (r as f64 + 0.5) * scale_r - 0.5;
        let src_c = (c as f64 + 0.5) * scale_c - 0.5;
        sample_bilinear(image, src_r, src_c)
    })
}

/// Surrounds `image` with zeros.
pub fn pad(image: &PixelGrid<f64>, rows: (usize, usize), cols: (usize, usize)) -> PixelGrid<f64> {
    let shape = GridShape::new(
        rows.0 + image.rows() + rows.1,
        cols.0 + image.cols() + cols.1,
    );
    let mut out = PixelGrid::new_filled(shape, 0.0);
    for r in 0..image.rows() {
        for c in 0..image.cols() {
            out[(rows.0 + r, cols.0 + c)] = image[(r, c)];
        }
    }
    out
}

/// Rotates, flips, resizes and pads `image` onto the
/// [`CANVAS_SIZE`] x [`CANVAS_SIZE`] canvas.
pub fn data_transformation(
    image: &PixelGrid<f64>,
    angle_deg: f64,
    projection: &ImageProjection,
) -> Result<PixelGrid<f64>, GeometryError> {
    let layout = projection.layout()?;
    let rotated = flip_rows(&rotate_image(image, angle_deg));
    let resized = resize_bilinear(&rotated, layout.rows, layout.cols);
    Ok(pad(&resized, layout.pad_rows, layout.pad_cols))
}
