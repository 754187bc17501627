//! Fixed-count profile of a whole route.

use crate::{
    geometry::{distance, path_positions},
    math::linspace,
    profile::{ElevationPoint, ElevationRange, ProfileParams},
    raster::RasterWindow,
    signal::{ascent_descent, fill_voids, sample_bilinear, smooth},
    ElevationError,
};
use geo::geometry::{Coord, LineString};
use log::debug;
use serde::Serialize;

/// Profile of one piece of a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSegment {
    pub elevation: Vec<ElevationPoint>,
}

/// Finished route profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteElevation {
    /// Caller's identifier of the route, passed through unchanged.
    pub id: Option<i64>,

    /// `None` when the route lies entirely in a void.
    pub min_elevation: Option<i32>,
    pub max_elevation: Option<i32>,
    pub ascent: i32,
    pub descent: i32,

    /// Largest position of any point.
    pub end_position: f64,

    pub segments: Vec<RouteSegment>,
}

/// Accumulates smoothed elevation samples for a route.
///
/// Every piece added is sampled, void-filled and smoothed on its own;
/// ascent, descent and the elevation range are summed over all pieces.
pub struct RouteProfile {
    id: Option<i64>,
    window: RasterWindow,
    params: ProfileParams,
    range: ElevationRange,
    ascent: i32,
    descent: i32,
    end_position: f64,
    last_coord: Option<Coord<f64>>,
    segments: Vec<RouteSegment>,
}

impl RouteProfile {
    pub fn new(window: RasterWindow, params: ProfileParams) -> Self {
        Self {
            id: None,
            window,
            params,
            range: ElevationRange::default(),
            ascent: 0,
            descent: 0,
            end_position: 0.0,
            last_coord: None,
            segments: Vec::new(),
        }
    }

    /// Tags the finished profile with the caller's route id.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Adds a piece of the route where `positions[i]` is the route
    /// position of `coords[i]`.
    pub fn add_segment(
        &mut self,
        coords: &[Coord<f64>],
        positions: &[f64],
    ) -> Result<(), ElevationError> {
        if coords.is_empty() {
            return Err(ElevationError::InvalidInput("empty segment"));
        }
        if coords.len() != positions.len() {
            return Err(ElevationError::InvalidInput(
                "coordinate and position counts differ",
            ));
        }

        let (raw, sample_runtime) = {
            let now = std::time::Instant::now();
            let raw = sample_bilinear(&self.window, coords);
            (raw, now.elapsed())
        };

        let (elevations, signal_runtime) = {
            let now = std::time::Instant::now();
            let mut filled = raw;
            let elevations = if fill_voids(&mut filled) {
                let smoothed = smooth(&filled, self.params.smoothing_window, self.params.window);
                let (ascent, descent) = ascent_descent(
                    &smoothed,
                    self.params.ascent_accuracy,
                    self.params.rounding_base,
                );
                self.ascent += ascent;
                self.descent += descent;
                self.range.extend(smoothed.iter().copied());
                smoothed
            } else {
                debug!("segment of {} points lies in a void", coords.len());
                filled
            };
            (elevations, now.elapsed())
        };

        debug!(
            "route segment; len: {}, sample_exec: {:?}, signal_exec: {:?}",
            coords.len(),
            sample_runtime,
            signal_runtime
        );

        let elevation = coords
            .iter()
            .zip(positions)
            .zip(&elevations)
            .map(|((coord, &pos), &ele)| ElevationPoint {
                x: coord.x,
                y: coord.y,
                ele,
                pos,
            })
            .collect();

        self.end_position = positions.iter().copied().fold(self.end_position, f64::max);
        self.last_coord = coords.last().copied();
        self.segments.push(RouteSegment { elevation });
        Ok(())
    }

    /// Adds `points` spread evenly over a path of `length`, continuing
    /// from the current end position.
    pub fn add_interpolated(
        &mut self,
        points: &[Coord<f64>],
        length: f64,
    ) -> Result<(), ElevationError> {
        let start = self.end_position;
        let positions: Vec<f64> = linspace(start, start + length, points.len()).collect();
        self.add_segment(points, &positions)
    }

    /// Adds the vertices of `line` positioned by their distance along it.
    ///
    /// A gap between the end of the previous piece and the start of
    /// `line` counts towards the position.
    pub fn add_path(&mut self, line: &LineString<f64>) -> Result<(), ElevationError> {
        let start = match (self.last_coord, line.0.first()) {
            (Some(prev), Some(&first)) => self.end_position + distance(prev, first),
            _ => self.end_position,
        };
        let positions = path_positions(&line.0, start);
        self.add_segment(&line.0, &positions)
    }

    pub fn end_position(&self) -> f64 {
        self.end_position
    }

    /// Completes the profile.
    ///
    /// Fails with [`NotFound`](ElevationError::NotFound) if no piece was
    /// added. A route entirely in a void has no elevation range, zero
    /// ascent and descent, and `NaN` elevations.
    pub fn finish(self) -> Result<RouteElevation, ElevationError> {
        if self.segments.is_empty() {
            return Err(ElevationError::NotFound);
        }
        let range = self.range.rounded();
        Ok(RouteElevation {
            id: self.id,
            min_elevation: range.map(|(min, _)| min),
            max_elevation: range.map(|(_, max)| max),
            ascent: self.ascent,
            descent: self.descent,
            end_position: self.end_position,
            segments: self.segments,
        })
    }
}
