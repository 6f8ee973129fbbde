//! Gnomonic world coordinate system for projected positions.

use glam::DVec2;

/// Right ascension and declination in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyPosition {
    pub ra: f64,
    pub dec: f64,
}

/// Tangent-plane projection about a reference point.
///
/// Pixel coordinates follow the FITS convention: the first pixel is 1, and
/// `crpix` is expressed in the same convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wcs {
    /// Reference pixel.
    pub crpix: DVec2,
    /// Sky position of the reference pixel, degrees.
    pub crval: SkyPosition,
    /// Pixel offset to intermediate coordinates (degrees), row-major
    /// `[[CD1_1, CD1_2], [CD2_1, CD2_2]]`.
    pub cd: [[f64; 2]; 2],
}

impl Wcs {
    pub fn new(crpix: DVec2, crval: SkyPosition, cd: [[f64; 2]; 2]) -> Self {
        Self { crpix, crval, cd }
    }

    /// Axis-aligned scale with no rotation or shear.
    pub fn from_cdelt(crpix: DVec2, crval: SkyPosition, cdelt: DVec2) -> Self {
        Self::new(crpix, crval, [[cdelt.x, 0.0], [0.0, cdelt.y]])
    }

    pub fn pixel_to_sky(&self, pixel: DVec2) -> SkyPosition {
        let d = pixel - self.crpix;
        let xi = (self.cd[0][0] * d.x + self.cd[0][1] * d.y).to_radians();
        let eta = (self.cd[1][0] * d.x + self.cd[1][1] * d.y).to_radians();

        let ra0 = self.crval.ra.to_radians();
        let (sin_dec0, cos_dec0) = self.crval.dec.to_radians().sin_cos();
        let denom = cos_dec0 - eta * sin_dec0;

        let ra = ra0 + xi.atan2(denom);
        let dec = (sin_dec0 + eta * cos_dec0).atan2((xi * xi + denom * denom).sqrt());

        SkyPosition {
            ra: ra.to_degrees().rem_euclid(360.0),
            dec: dec.to_degrees(),
        }
    }

    /// Inverse of [`pixel_to_sky`](Self::pixel_to_sky). `None` when the CD
    /// matrix is singular or the point is on the far hemisphere.
    pub fn sky_to_pixel(&self, sky: SkyPosition) -> Option<DVec2> {
        let (sin_dec, cos_dec) = sky.dec.to_radians().sin_cos();
        let (sin_dec0, cos_dec0) = self.crval.dec.to_radians().sin_cos();
        let (sin_dra, cos_dra) = (sky.ra - self.crval.ra).to_radians().sin_cos();

        let d = sin_dec * sin_dec0 + cos_dec * cos_dec0 * cos_dra;
        if d <= 0.0 {
            return None;
        }
        let xi = (cos_dec * sin_dra / d).to_degrees();
        let eta = ((sin_dec * cos_dec0 - cos_dec * sin_dec0 * cos_dra) / d).to_degrees();

        let det = self.cd[0][0] * self.cd[1][1] - self.cd[0][1] * self.cd[1][0];
        if det.abs() < 1e-15 {
            return None;
        }
        let dx = (self.cd[1][1] * xi - self.cd[0][1] * eta) / det;
        let dy = (-self.cd[1][0] * xi + self.cd[0][0] * eta) / det;
        Some(self.crpix + DVec2::new(dx, dy))
    }
}
