use crate::DemError;

/// A row-major block of elevation samples.
///
/// Row `0` is the first row of the raster (north for north-up
/// rasters). Voids are stored as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    samples: Box<[f32]>,
}

impl Grid {
    pub fn new(cols: usize, rows: usize, samples: Vec<f32>) -> Result<Self, DemError> {
        if cols == 0 || rows == 0 || samples.len() != cols * rows {
            return Err(DemError::Dimensions {
                cols,
                rows,
                len: samples.len(),
            });
        }
        Ok(Self {
            cols,
            rows,
            samples: samples.into_boxed_slice(),
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the sample at `(col, row)`.
    ///
    /// # Panics
    ///
    /// Panics if `(col, row)` lies outside the grid.
    pub fn get(&self, col: usize, row: usize) -> f32 {
        assert!(col < self.cols && row < self.rows);
        self.samples[row * self.cols + col]
    }

    /// Returns the number of non-void samples.
    pub fn valid_count(&self) -> usize {
        self.samples.iter().filter(|s| !s.is_nan()).count()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}
