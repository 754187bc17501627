//! Affine mapping between pixel and geographic space.
//!
//! Coefficients follow the GDAL geotransform layout:
//!
//! ```text
//! x = g0 + col * g1 + row * g2
//! y = g3 + col * g4 + row * g5
//! ```

use crate::{DemError, C};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    coeffs: [C; 6],
}

impl AffineTransform {
    /// Returns a transform for the GDAL-ordered coefficients.
    ///
    /// Fails if any coefficient is not finite or if the 2x2
    /// rotation/scale part can not be inverted.
    pub fn new(coeffs: [C; 6]) -> Result<Self, DemError> {
        let transform = Self { coeffs };
        let det = transform.determinant();
        if coeffs.iter().all(|g| g.is_finite()) && det.is_finite() && det != 0.0 {
            Ok(transform)
        } else {
            Err(DemError::DegenerateTransform(coeffs))
        }
    }

    /// Returns a transform without rotation terms.
    ///
    /// `(origin_x, origin_y)` is the outer corner of the first pixel;
    /// `pixel_height` is negative for north-up rasters.
    pub fn north_up(
        origin_x: C,
        origin_y: C,
        pixel_width: C,
        pixel_height: C,
    ) -> Result<Self, DemError> {
        Self::new([origin_x, pixel_width, 0.0, origin_y, 0.0, pixel_height])
    }

    /// Parses an ESRI world file.
    ///
    /// World files hold the six coefficients in the order `A D B E C F`
    /// and reference the _center_ of the upper-left pixel, so the
    /// origin is shifted by half a pixel to its outer corner.
    pub fn from_world_file<P: AsRef<Path>>(path: P) -> Result<Self, DemError> {
        let mk_err = || DemError::WorldFile(path.as_ref().to_owned());
        let text = std::fs::read_to_string(&path)?;
        let values = text
            .split_whitespace()
            .map(str::parse::<C>)
            .collect::<Result<Vec<C>, _>>()
            .map_err(|_| mk_err())?;
        let [a, d, b, e, c, f] = <[C; 6]>::try_from(values).map_err(|_| mk_err())?;
        Self::new([c - a / 2.0 - b / 2.0, a, b, f - d / 2.0 - e / 2.0, d, e])
    }

    pub fn coeffs(&self) -> [C; 6] {
        self.coeffs
    }

    /// Determinant of the rotation/scale submatrix.
    pub fn determinant(&self) -> C {
        let [_, g1, g2, _, g4, g5] = self.coeffs;
        g1 * g5 - g2 * g4
    }

    /// Returns the geographic position of the pixel corner `(col, row)`.
    pub fn pixel_to_geo(&self, col: C, row: C) -> (C, C) {
        let [g0, g1, g2, g3, g4, g5] = self.coeffs;
        (g0 + col * g1 + row * g2, g3 + col * g4 + row * g5)
    }

    /// Returns the fractional pixel position of `(x, y)`.
    pub fn geo_to_pixel(&self, x: C, y: C) -> (C, C) {
        let [g0, g1, g2, g3, g4, g5] = self.coeffs;
        if g2 == 0.0 {
            let col = (x - g0) / g1;
            let row = (y - g3 - col * g4) / g5;
            (col, row)
        } else {
            let (dx, dy) = (x - g0, y - g3);
            let det = self.determinant();
            ((g5 * dx - g2 * dy) / det, (g1 * dy - g4 * dx) / det)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AffineTransform;
    use crate::DemError;
    use approx::assert_relative_eq;
    use std::io::Write;

    fn assert_roundtrip(transform: &AffineTransform, x: f64, y: f64) {
        let (col, row) = transform.geo_to_pixel(x, y);
        let (x2, y2) = transform.pixel_to_geo(col, row);
        assert_relative_eq!(x, x2, epsilon = 1e-6);
        assert_relative_eq!(y, y2, epsilon = 1e-6);
    }

    #[test]
    fn test_north_up_roundtrip() {
        let transform =
            AffineTransform::north_up(1_060_000.0, 5_970_000.0, 30.0, -30.0).unwrap();
        for (x, y) in [
            (1_069_126.081_875_97, 5_962_419.305_238),
            (1_060_000.0, 5_970_000.0),
            (-5.5, 12.25),
        ] {
            assert_roundtrip(&transform, x, y);
        }
        assert_eq!(transform.geo_to_pixel(1_060_030.0, 5_969_940.0), (1.0, 2.0));
    }

    #[test]
    fn test_rotated_roundtrip() {
        let transform = AffineTransform::new([100.0, 2.0, 0.5, 300.0, -0.25, -2.0]).unwrap();
        for (x, y) in [(0.0, 0.0), (150.0, 250.0), (-1234.5, 987.25)] {
            assert_roundtrip(&transform, x, y);
        }
    }

    #[test]
    fn test_sheared_row_axis_roundtrip() {
        // g2 == 0 but g4 != 0 still goes through the axis-aligned branch.
        let transform = AffineTransform::new([10.0, 1.5, 0.0, 20.0, 0.75, -1.5]).unwrap();
        assert_roundtrip(&transform, 42.0, -17.0);
    }

    #[test]
    fn test_degenerate_transform() {
        assert!(matches!(
            AffineTransform::new([0.0, 1.0, 2.0, 0.0, 2.0, 4.0]),
            Err(DemError::DegenerateTransform(_))
        ));
        assert!(AffineTransform::north_up(0.0, 0.0, 0.0, -1.0).is_err());
        assert!(AffineTransform::north_up(f64::NAN, 0.0, 1.0, -1.0).is_err());
    }

    #[test]
    fn test_world_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "30.0\n0.0\n0.0\n-30.0\n1000015.0\n2000085.0").unwrap();
        let transform = AffineTransform::from_world_file(file.path()).unwrap();
        assert_eq!(
            transform.coeffs(),
            [1_000_000.0, 30.0, 0.0, 2_000_100.0, 0.0, -30.0]
        );
    }

    #[test]
    fn test_malformed_world_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "30.0\n0.0\nnope").unwrap();
        assert!(matches!(
            AffineTransform::from_world_file(file.path()),
            Err(DemError::WorldFile(_))
        ));
    }
}
