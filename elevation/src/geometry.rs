//! Point placement along route geometry.
//!
//! Distances here are measured in the units of the coordinates, i.e.
//! in the projection the route and the DEM share.

use crate::math::linspace;
use geo::{
    geometry::{Coord, Line, LineString},
    EuclideanLength, LineInterpolatePoint,
};

/// Returns `segments + 1` points evenly spread along `line`, ends
/// included.
pub fn interpolate_line(line: &LineString<f64>, segments: usize) -> Vec<Coord<f64>> {
    if line.0.is_empty() || segments == 0 {
        return Vec::new();
    }
    linspace(0.0, 1.0, segments + 1)
        .map(|fraction| {
            line.line_interpolate_point(fraction)
                .map_or(line.0[0], |point| point.0)
        })
        .collect()
}

/// Returns the distance of every coordinate from the first one along
/// the path, offset by `start`.
pub fn path_positions(coords: &[Coord<f64>], start: f64) -> Vec<f64> {
    let mut position = start;
    let mut positions = Vec::with_capacity(coords.len());
    let mut prev: Option<Coord<f64>> = None;
    for &coord in coords {
        if let Some(prev) = prev {
            position += distance(prev, coord);
        }
        positions.push(position);
        prev = Some(coord);
    }
    positions
}

/// Returns the points strictly inside a way of real-world `length`
/// that lie every `step` along it.
///
/// `length` need not match the length of `coords` in projected units;
/// the points are placed by their fraction of `length`.
pub fn step_points(coords: &[Coord<f64>], length: f64, step: f64) -> Vec<Coord<f64>> {
    if coords.len() < 2 || !(length > 0.0 && step > 0.0) {
        return Vec::new();
    }
    let line = LineString::from(coords.to_vec());
    (1..)
        .map(|k| f64::from(k) * step)
        .take_while(|&offset| offset < length)
        .filter_map(|offset| line.line_interpolate_point(offset / length))
        .map(|point| point.0)
        .collect()
}

pub(crate) fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Line::new(a, b).euclidean_length()
}

#[cfg(test)]
mod tests {
    use super::{interpolate_line, path_positions, step_points};
    use approx::assert_relative_eq;
    use geo::{coord, line_string};

    #[test]
    fn test_interpolate_line() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0), (x: 100.0, y: 100.0)];
        let points = interpolate_line(&line, 4);
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], coord! { x: 0.0, y: 0.0 });
        assert_relative_eq!(points[1].x, 50.0);
        assert_relative_eq!(points[2].x, 100.0);
        assert_relative_eq!(points[3].y, 50.0);
        assert_eq!(points[4], coord! { x: 100.0, y: 100.0 });
        assert!(interpolate_line(&line, 0).is_empty());
    }

    #[test]
    fn test_path_positions() {
        let coords = [
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 3.0, y: 4.0 },
            coord! { x: 3.0, y: 10.0 },
        ];
        assert_eq!(path_positions(&coords, 100.0), vec![100.0, 105.0, 111.0]);
        assert!(path_positions(&[], 0.0).is_empty());
    }

    #[test]
    fn test_step_points() {
        let coords = [coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 0.0 }];
        // A 10 unit way that is 100 m long on the ground.
        let points = step_points(&coords, 100.0, 30.0);
        assert_eq!(points.len(), 3);
        assert_relative_eq!(points[0].x, 3.0);
        assert_relative_eq!(points[2].x, 9.0);

        assert!(step_points(&coords, 100.0, 100.0).is_empty());
        assert!(step_points(&coords, 0.0, 20.0).is_empty());
    }
}
