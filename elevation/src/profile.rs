use crate::{signal::Window, ElevationError};
use serde::{Deserialize, Serialize};

/// A sampled point of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElevationPoint {
    pub x: f64,
    pub y: f64,

    /// Elevation, `NaN` when the point lies in a void.
    pub ele: f64,

    /// Distance from the start of the route.
    pub pos: f64,
}

/// Tuning knobs shared by both profile kinds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProfileParams {
    /// Number of samples in the smoothing window.
    pub smoothing_window: usize,

    /// Smoothing window weights.
    pub window: Window,

    /// Height change below which a local extremum is treated as noise
    /// when summing ascent and descent.
    pub ascent_accuracy: f64,

    /// Ascent and descent are reported in multiples of this.
    pub rounding_base: f64,

    /// Largest tolerated error of the reduced per-way profile.
    pub max_deviation: f64,

    /// Distance between way midpoints.
    pub step: f64,

    /// Largest distance between two points of a reduced per-way
    /// profile.
    pub max_segment_len: f64,
}

impl Default for ProfileParams {
    fn default() -> Self {
        Self {
            smoothing_window: 7,
            window: Window::Hanning,
            ascent_accuracy: 15.0,
            rounding_base: 5.0,
            max_deviation: 5.0,
            step: 20.0,
            max_segment_len: 1000.0,
        }
    }
}

impl ProfileParams {
    pub fn builder() -> ProfileParamsBuilder {
        ProfileParamsBuilder {
            params: Self::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ElevationError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;
        if self.smoothing_window == 0 {
            return Err(ElevationError::Parameter("smoothing_window"));
        }
        if !non_negative(self.ascent_accuracy) {
            return Err(ElevationError::Parameter("ascent_accuracy"));
        }
        if !positive(self.rounding_base) {
            return Err(ElevationError::Parameter("rounding_base"));
        }
        if !non_negative(self.max_deviation) {
            return Err(ElevationError::Parameter("max_deviation"));
        }
        if !positive(self.step) {
            return Err(ElevationError::Parameter("step"));
        }
        if !(positive(self.max_segment_len) && self.max_segment_len >= self.step) {
            return Err(ElevationError::Parameter("max_segment_len"));
        }
        Ok(())
    }
}

pub struct ProfileParamsBuilder {
    params: ProfileParams,
}

impl ProfileParamsBuilder {
    /// Samples in the smoothing window (defaults to 7).
    #[must_use]
    pub fn smoothing_window(mut self, len: usize) -> Self {
        self.params.smoothing_window = len;
        self
    }

    /// Smoothing weights (defaults to Hanning).
    #[must_use]
    pub fn window(mut self, window: Window) -> Self {
        self.params.window = window;
        self
    }

    /// Ascent noise threshold (defaults to 15).
    #[must_use]
    pub fn ascent_accuracy(mut self, accuracy: f64) -> Self {
        self.params.ascent_accuracy = accuracy;
        self
    }

    /// Ascent rounding base (defaults to 5).
    #[must_use]
    pub fn rounding_base(mut self, base: f64) -> Self {
        self.params.rounding_base = base;
        self
    }

    /// Per-way deviation threshold (defaults to 5).
    #[must_use]
    pub fn max_deviation(mut self, deviation: f64) -> Self {
        self.params.max_deviation = deviation;
        self
    }

    /// Way midpoint spacing (defaults to 20).
    #[must_use]
    pub fn step(mut self, step: f64) -> Self {
        self.params.step = step;
        self
    }

    /// Longest reduced per-way segment (defaults to 1000).
    #[must_use]
    pub fn max_segment_len(mut self, len: f64) -> Self {
        self.params.max_segment_len = len;
        self
    }

    pub fn build(self) -> Result<ProfileParams, ElevationError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

/// Running min/max over non-void elevations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ElevationRange(Option<(f64, f64)>);

impl ElevationRange {
    pub(crate) fn update(&mut self, ele: f64) {
        if ele.is_nan() {
            return;
        }
        self.0 = Some(match self.0 {
            None => (ele, ele),
            Some((min, max)) => (min.min(ele), max.max(ele)),
        });
    }

    pub(crate) fn extend<I: IntoIterator<Item = f64>>(&mut self, elevations: I) {
        elevations.into_iter().for_each(|ele| self.update(ele));
    }

    /// Returns `(floor(min), ceil(max))`, so every sample stays within
    /// the reported range.
    pub(crate) fn rounded(&self) -> Option<(i32, i32)> {
        #[allow(clippy::cast_possible_truncation)]
        self.0
            .map(|(min, max)| (min.floor() as i32, max.ceil() as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::{ElevationRange, ProfileParams};
    use crate::{signal::Window, ElevationError};

    #[test]
    fn test_builder() {
        let params = ProfileParams::builder()
            .smoothing_window(5)
            .window(Window::Flat)
            .step(10.0)
            .max_segment_len(250.0)
            .build()
            .unwrap();
        assert_eq!(params.smoothing_window, 5);
        assert_eq!(params.window, Window::Flat);
        assert_eq!(params.ascent_accuracy, 15.0);
        assert_eq!(params.max_segment_len, 250.0);
    }

    #[test]
    fn test_builder_rejects_invalid() {
        assert!(matches!(
            ProfileParams::builder().step(0.0).build(),
            Err(ElevationError::Parameter("step"))
        ));
        assert!(matches!(
            ProfileParams::builder().step(50.0).max_segment_len(20.0).build(),
            Err(ElevationError::Parameter("max_segment_len"))
        ));
        assert!(matches!(
            ProfileParams::builder().smoothing_window(0).build(),
            Err(ElevationError::Parameter("smoothing_window"))
        ));
    }

    #[test]
    fn test_range() {
        let mut range = ElevationRange::default();
        assert_eq!(range.rounded(), None);
        range.extend([f64::NAN, 1000.4, 999.6, f64::NAN]);
        assert_eq!(range.rounded(), Some((999, 1001)));
        range.update(1000.0);
        assert_eq!(range.rounded(), Some((999, 1001)));
    }
}
