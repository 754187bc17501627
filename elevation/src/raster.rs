//! Geographic access to a DEM.

use crate::ElevationError;
use dem::{AffineTransform, Dem, Grid, LoadMode};
use geo::geometry::{Coord, Rect};
use log::debug;
use std::{path::Path, sync::Arc};

/// A shared handle to an opened DEM.
///
/// Cloning is cheap; the underlying raster is opened once and shared
/// read-only between requests.
#[derive(Clone)]
pub struct GeoRaster {
    dem: Arc<Dem>,
}

impl GeoRaster {
    pub fn new(dem: Arc<Dem>) -> Self {
        Self { dem }
    }

    pub fn open<P: AsRef<Path>>(path: P, mode: LoadMode) -> Result<Self, ElevationError> {
        Ok(Self::new(Arc::new(Dem::open(path, mode)?)))
    }

    pub fn dem(&self) -> &Dem {
        &self.dem
    }

    /// Returns the fractional pixel position of `(x, y)`.
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        self.dem.transform().geo_to_pixel(x, y)
    }

    /// Returns the geographic position of pixel corner `(col, row)`.
    pub fn pixel_to_geo(&self, col: f64, row: f64) -> (f64, f64) {
        self.dem.transform().pixel_to_geo(col, row)
    }

    /// Reads the smallest block of whole pixels needed to interpolate
    /// anywhere within `bbox`.
    ///
    /// Samples sit at pixel centers, so the block reaches out to the
    /// pixel centers on either side of `bbox`. It is then clipped to the
    /// raster, so coordinates of `bbox` beyond the raster's edge end up
    /// clamped to that edge when sampled. Fails with
    /// [`NotFound`](ElevationError::NotFound) when `bbox` does not
    /// touch the raster at all.
    pub fn load_window(&self, bbox: Rect<f64>) -> Result<RasterWindow, ElevationError> {
        let (min, max) = (bbox.min(), bbox.max());
        let mut pixel_min = Coord {
            x: f64::INFINITY,
            y: f64::INFINITY,
        };
        let mut pixel_max = Coord {
            x: f64::NEG_INFINITY,
            y: f64::NEG_INFINITY,
        };
        for (x, y) in [(min.x, min.y), (min.x, max.y), (max.x, min.y), (max.x, max.y)] {
            let (col, row) = self.geo_to_pixel(x, y);
            pixel_min.x = pixel_min.x.min(col);
            pixel_min.y = pixel_min.y.min(row);
            pixel_max.x = pixel_max.x.max(col);
            pixel_max.y = pixel_max.y.max(row);
        }

        let (cols, rows) = self.dem.dimensions();
        let (col_off, col_end) = clip(pixel_min.x, pixel_max.x, cols)?;
        let (row_off, row_end) = clip(pixel_min.y, pixel_max.y, rows)?;

        let grid = self.dem.read_window(
            col_off,
            row_off,
            col_end.abs_diff(col_off) + 1,
            row_end.abs_diff(row_off) + 1,
        )?;

        #[allow(clippy::cast_precision_loss)]
        let bounds = {
            let (c0, r0) = (col_off as f64, row_off as f64);
            let (c1, r1) = ((col_end + 1) as f64, (row_end + 1) as f64);
            let mut window_bounds = crate::BoundsAccumulator::new();
            for (col, row) in [(c0, r0), (c1, r0), (c0, r1), (c1, r1)] {
                let (x, y) = self.pixel_to_geo(col, row);
                window_bounds.expand(x, y, x, y);
            }
            window_bounds.bounds().ok_or(ElevationError::NotFound)?
        };

        debug!(
            "window; pixels: ({col_off}, {row_off})..=({col_end}, {row_end}), bounds: {:?}..{:?}",
            bounds.min(),
            bounds.max()
        );

        Ok(RasterWindow {
            grid,
            transform: *self.dem.transform(),
            col_off,
            row_off,
            bounds,
        })
    }
}

/// Returns the inclusive range of pixels whose centers enclose the
/// fractional pixel span `lo..=hi`, intersected with `0..len`.
fn clip(lo: f64, hi: f64, len: usize) -> Result<(isize, isize), ElevationError> {
    #[allow(clippy::cast_precision_loss)]
    let len = len as f64;
    if !(lo.is_finite() && hi.is_finite()) || hi < 0.0 || lo > len {
        return Err(ElevationError::NotFound);
    }
    let first = (lo - 0.5).floor().max(0.0);
    let last = (hi - 0.5).ceil().clamp(first, len - 1.0);
    #[allow(clippy::cast_possible_truncation)]
    Ok((first as isize, last as isize))
}

/// A block of DEM samples in memory, covering one request.
#[derive(Debug, Clone)]
pub struct RasterWindow {
    grid: Grid,
    transform: AffineTransform,
    col_off: isize,
    row_off: isize,
    bounds: Rect<f64>,
}

impl RasterWindow {
    /// Pixel-aligned geographic bounds of the window.
    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns `true` if the window holds no valid sample.
    pub fn is_void(&self) -> bool {
        self.grid.valid_count() == 0
    }

    /// Moves `coord` onto the window's bounds if it lies outside.
    pub fn clamp(&self, Coord { x, y }: Coord<f64>) -> Coord<f64> {
        let (min, max) = (self.bounds.min(), self.bounds.max());
        Coord {
            x: x.clamp(min.x, max.x),
            y: y.clamp(min.y, max.y),
        }
    }

    /// Returns the fractional `(col, row)` index into [`grid`](Self::grid)
    /// for `coord`.
    ///
    /// Samples sit at pixel centers; indices are clamped to the grid.
    pub fn index(&self, coord: Coord<f64>) -> (f64, f64) {
        let Coord { x, y } = self.clamp(coord);
        let (col, row) = self.transform.geo_to_pixel(x, y);
        #[allow(clippy::cast_precision_loss)]
        let (col_off, row_off) = (self.col_off as f64, self.row_off as f64);
        #[allow(clippy::cast_precision_loss)]
        let (last_col, last_row) = (
            (self.grid.cols() - 1) as f64,
            (self.grid.rows() - 1) as f64,
        );
        (
            (col - 0.5 - col_off).clamp(0.0, last_col),
            (row - 0.5 - row_off).clamp(0.0, last_row),
        )
    }
}
