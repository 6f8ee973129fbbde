//! Focal-plane and sky geometry.
//!
//! Detections live in per-sensor raw pixels. They are placed on the sensor
//! mosaic, mapped into the rotated projection described by the observation
//! header, and converted to sky coordinates. The same rotation is applied to
//! whole images by [`data_transformation`].

mod image;
mod mosaic;
mod projection;
mod wcs;


use std::collections::BTreeMap;

use glam::DVec2;

pub use image::{
    data_transformation, flip_rows, pad, resize_bilinear, rotate_image, CanvasLayout,
    ImageProjection, CANVAS_SIZE,
};
pub use mosaic::{
    assemble_mosaic, mosaic_cell_source, mosaic_position, sensor_slot, MosaicSide, MOSAIC_SHAPE,
};
pub use projection::{rectified_size, rotate, transform, Extent};
pub use wcs::{SkyPosition, Wcs};

use crate::error::GeometryError;
use crate::grid::VariabilityGrid;
use crate::sources::SourcePlacement;

/// Numeric header keywords of an observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderKeywords {
    values: BTreeMap<String, f64>,
}

impl HeaderKeywords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, keyword: impl Into<String>, value: f64) {
        self.values.insert(keyword.into(), value);
    }

    pub fn with(mut self, keyword: impl Into<String>, value: f64) -> Self {
        self.insert(keyword, value);
        self
    }

    /// The value of `keyword`, which must be present and finite.
    pub fn get(&self, keyword: &str) -> Result<f64, GeometryError> {
        let value = *self
            .values
            .get(keyword)
            .ok_or_else(|| GeometryError::MissingKeyword(keyword.to_string()))?;
        if !value.is_finite() {
            return Err(GeometryError::NonFiniteKeyword {
                keyword: keyword.to_string(),
                value,
            });
        }
        Ok(value)
    }

    fn pair(&self, a: &str, b: &str) -> Result<[f64; 2], GeometryError> {
        Ok([self.get(a)?, self.get(b)?])
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for HeaderKeywords {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut header = Self::new();
        for (keyword, value) in iter {
            header.insert(keyword, value);
        }
        header
    }
}

/// Everything needed to place detections of one observation.
#[derive(Debug, Clone, PartialEq)]
pub struct FocalPlaneGeometry {
    /// Position angle of the pointing, degrees.
    pub angle: f64,
    /// Bounds of the event sky-pixel coordinates.
    pub extent: Extent,
    pub projection: ImageProjection,
    pub wcs: Wcs,
}

impl FocalPlaneGeometry {
    /// Reads `PA_PNT`, the `TDMIN/TDMAX` and `TLMIN/TLMAX` limits of
    /// columns 6 and 7, and the `REFX*`/`REFY*` reference keywords.
    pub fn from_header(header: &HeaderKeywords, extent: Extent) -> Result<Self, GeometryError> {
        let angle = header.get("PA_PNT")?;
        let projection = ImageProjection {
            projected_x: header.pair("TDMIN6", "TDMAX6")?,
            projected_y: header.pair("TDMIN7", "TDMAX7")?,
            legal_x: header.pair("TLMIN6", "TLMAX6")?,
            legal_y: header.pair("TLMIN7", "TLMAX7")?,
        };
        let wcs = Wcs::from_cdelt(
            DVec2::from_array(header.pair("REFXCRPX", "REFYCRPX")?),
            SkyPosition {
                ra: header.get("REFXCRVL")?,
                dec: header.get("REFYCRVL")?,
            },
            DVec2::from_array(header.pair("REFXCDLT", "REFYCDLT")?),
        );

        Ok(Self {
            angle,
            extent,
            projection,
            wcs,
        })
    }

    /// Mosaic, projected and sky position of a raw sensor point.
    pub fn place(&self, sensor: usize, raw: DVec2) -> Result<SourcePlacement, GeometryError> {
        let mosaic = mosaic_position(sensor, raw)?;
        let projected = transform(mosaic, &self.extent, self.angle)?;
        Ok(SourcePlacement {
            mosaic,
            projected,
            sky: self.wcs.pixel_to_sky(projected),
        })
    }

    /// The per-sensor grids as one rotated, projected canvas image.
    pub fn project_grids(&self, grids: &[VariabilityGrid]) -> Result<VariabilityGrid, GeometryError> {
        let mosaic = assemble_mosaic(grids)?;
        data_transformation(&mosaic, self.angle, &self.projection)
    }
}
