//! Running bounding box over route coordinates.

use geo::geometry::{Coord, Rect};

/// Smallest axis-aligned box covering everything passed to
/// [`expand`](Self::expand).
///
/// Collecting the bounds of a whole route first lets the raster
/// window be read once per request instead of once per segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsAccumulator {
    min: Coord<f64>,
    max: Coord<f64>,
}

impl Default for BoundsAccumulator {
    fn default() -> Self {
        Self {
            min: Coord {
                x: f64::INFINITY,
                y: f64::INFINITY,
            },
            max: Coord {
                x: f64::NEG_INFINITY,
                y: f64::NEG_INFINITY,
            },
        }
    }
}

impl BoundsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expand(&mut self, minx: f64, miny: f64, maxx: f64, maxy: f64) {
        self.min.x = self.min.x.min(minx);
        self.min.y = self.min.y.min(miny);
        self.max.x = self.max.x.max(maxx);
        self.max.y = self.max.y.max(maxy);
    }

    pub fn expand_coord(&mut self, Coord { x, y }: Coord<f64>) {
        self.expand(x, y, x, y);
    }

    pub fn expand_coords<I>(&mut self, coords: I)
    where
        I: IntoIterator<Item = Coord<f64>>,
    {
        coords.into_iter().for_each(|coord| self.expand_coord(coord));
    }

    pub fn expand_rect(&mut self, rect: Rect<f64>) {
        let (min, max) = (rect.min(), rect.max());
        self.expand(min.x, min.y, max.x, max.y);
    }

    /// Returns `true` until the first expansion.
    pub fn is_empty(&self) -> bool {
        !(self.min.x <= self.max.x && self.min.y <= self.max.y)
    }

    /// Returns the accumulated box, or `None` if nothing was added.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        if self.is_empty() {
            None
        } else {
            Some(Rect::new(self.min, self.max))
        }
    }
}
