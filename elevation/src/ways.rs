//! Adaptive profile of a route made of individually identified ways.

use crate::{
    geometry::step_points,
    profile::{ElevationPoint, ElevationRange, ProfileParams},
    raster::RasterWindow,
    signal::{fill_voids, sample_bilinear},
    simplify::adaptive_pivots,
    ElevationError,
};
use geo::geometry::Coord;
use log::{debug, warn};
use serde::{ser::SerializeMap, Serialize, Serializer};
use std::collections::{hash_map::Entry, HashMap};

/// One way of a route.
#[derive(Debug, Clone, PartialEq)]
pub struct WaySegment {
    pub id: i64,

    /// Geometry of the way, in the DEM's projection.
    pub coordinates: Vec<Coord<f64>>,

    /// Real-world length of the way.
    pub length: f64,

    /// Points every `step` along the way, endpoints excluded. Generated
    /// from `coordinates` when absent.
    pub midpoints: Option<Vec<Coord<f64>>>,
}

impl WaySegment {
    pub fn new(id: i64, coordinates: Vec<Coord<f64>>, length: f64) -> Self {
        Self {
            id,
            coordinates,
            length,
            midpoints: None,
        }
    }

    #[must_use]
    pub fn with_midpoints(mut self, midpoints: Vec<Coord<f64>>) -> Self {
        self.midpoints = Some(midpoints);
        self
    }
}

/// Reduced profile of one way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WayElevation {
    pub elevation: Vec<ElevationPoint>,
}

/// Way profiles keyed by way id, in the order the ways were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaySegments {
    ways: Vec<(i64, WayElevation)>,
    index: HashMap<i64, usize>,
}

impl WaySegments {
    pub fn get(&self, id: i64) -> Option<&WayElevation> {
        self.index.get(&id).map(|&idx| &self.ways[idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &WayElevation)> {
        self.ways.iter().map(|(id, way)| (*id, way))
    }

    pub fn len(&self) -> usize {
        self.ways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ways.is_empty()
    }

    /// Stores `points` under `id`, appending when the way was seen
    /// before.
    fn push(&mut self, id: i64, points: Vec<ElevationPoint>) {
        match self.index.entry(id) {
            Entry::Occupied(entry) => self.ways[*entry.get()].1.elevation.extend(points),
            Entry::Vacant(entry) => {
                entry.insert(self.ways.len());
                self.ways.push((id, WayElevation { elevation: points }));
            }
        }
    }
}

impl Serialize for WaySegments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.ways.len()))?;
        for (id, way) in &self.ways {
            map.serialize_entry(id, way)?;
        }
        map.end()
    }
}

/// Finished per-way profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaysElevation {
    /// `None` when every way lies in a void.
    pub min_elevation: Option<i32>,
    pub max_elevation: Option<i32>,
    pub segments: WaySegments,
}

/// Accumulates reduced elevation profiles way by way.
pub struct WayProfile {
    window: RasterWindow,
    params: ProfileParams,
    range: ElevationRange,
    position: f64,
    segments: WaySegments,
}

impl WayProfile {
    pub fn new(window: RasterWindow, params: ProfileParams) -> Self {
        Self {
            window,
            params,
            range: ElevationRange::default(),
            position: 0.0,
            segments: WaySegments::default(),
        }
    }

    /// Samples `way` and keeps the points needed to describe its
    /// profile within the configured deviation.
    ///
    /// Ways with a negative or non-finite length are skipped.
    pub fn add_way(&mut self, way: &WaySegment) -> Result<(), ElevationError> {
        let (Some(&first), Some(&last)) = (way.coordinates.first(), way.coordinates.last())
        else {
            return Err(ElevationError::InvalidInput("way without coordinates"));
        };
        if !(way.length.is_finite() && way.length >= 0.0) {
            warn!("skipping way {} of length {}", way.id, way.length);
            return Ok(());
        }

        let (points, positions) = {
            let start = self.position;
            let end = start + way.length;
            let midpoints = match &way.midpoints {
                Some(midpoints) => midpoints.clone(),
                None => step_points(&way.coordinates, way.length, self.params.step),
            };
            let mut points = Vec::with_capacity(midpoints.len() + 2);
            let mut positions = Vec::with_capacity(midpoints.len() + 2);
            points.push(first);
            positions.push(start);
            for (k, midpoint) in (1..).zip(midpoints) {
                points.push(midpoint);
                positions.push((start + f64::from(k) * self.params.step).min(end));
            }
            if way.coordinates.len() > 1 {
                points.push(last);
                positions.push(end);
            }
            (points, positions)
        };

        let mut elevations = sample_bilinear(&self.window, &points);
        self.range.extend(elevations.iter().copied());
        let pivots = if fill_voids(&mut elevations) {
            adaptive_pivots(
                &positions,
                &elevations,
                self.params.max_deviation,
                self.params.max_segment_len,
            )
        } else {
            debug!("way {} lies in a void", way.id);
            let mut pivots = vec![0];
            if points.len() > 1 {
                pivots.push(points.len() - 1);
            }
            pivots
        };

        debug!(
            "way {}; samples: {}, pivots: {}",
            way.id,
            points.len(),
            pivots.len()
        );

        let elevation = pivots
            .into_iter()
            .map(|idx| ElevationPoint {
                x: points[idx].x,
                y: points[idx].y,
                ele: elevations[idx],
                pos: positions[idx],
            })
            .collect();
        self.segments.push(way.id, elevation);
        self.position += way.length;
        Ok(())
    }

    /// Route position reached after the ways added so far.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Completes the profile.
    ///
    /// Fails with [`NotFound`](ElevationError::NotFound) when no way
    /// was added. Ways lying entirely in voids keep their end points.
    pub fn finish(self) -> Result<WaysElevation, ElevationError> {
        if self.segments.is_empty() {
            return Err(ElevationError::NotFound);
        }
        let range = self.range.rounded();
        Ok(WaysElevation {
            min_elevation: range.map(|(min, _)| min),
            max_elevation: range.map(|(_, max)| max),
            segments: self.segments,
        })
    }
}
