use crate::{
    bounds::BoundsAccumulator,
    config::ElevationConfig,
    geometry::interpolate_line,
    profile::ProfileParams,
    raster::{GeoRaster, RasterWindow},
    route::{RouteElevation, RouteProfile},
    ways::{WayProfile, WaySegment, WaysElevation},
    ElevationError,
};
use geo::{
    geometry::{LineString, MultiLineString},
    EuclideanLength,
};
use log::{debug, info, warn};

/// Entry point for elevation requests.
///
/// Built once per process; the DEM is opened on construction and shared
/// by every profile created afterwards.
#[derive(Clone)]
pub struct ElevationContext {
    raster: Option<GeoRaster>,
    params: ProfileParams,
}

impl ElevationContext {
    /// Validates `config` and opens its DEM, if any.
    ///
    /// A missing `dem_file` is not an error, but every request will
    /// then fail with [`Unavailable`](ElevationError::Unavailable).
    pub fn new(config: &ElevationConfig) -> Result<Self, ElevationError> {
        config.profile.validate()?;
        let raster = match &config.dem_file {
            Some(path) => {
                let raster = GeoRaster::open(path, config.load_mode)?;
                let (cols, rows) = raster.dem().dimensions();
                info!("opened DEM {path:?}, {cols}x{rows}, {:?}", config.load_mode);
                Some(raster)
            }
            None => {
                warn!("no DEM configured, elevation profiles unavailable");
                None
            }
        };
        Ok(Self {
            raster,
            params: config.profile,
        })
    }

    /// Returns a context over an already opened raster.
    pub fn with_raster(raster: GeoRaster, params: ProfileParams) -> Result<Self, ElevationError> {
        params.validate()?;
        Ok(Self {
            raster: Some(raster),
            params,
        })
    }

    pub fn is_available(&self) -> bool {
        self.raster.is_some()
    }

    pub fn raster(&self) -> Result<&GeoRaster, ElevationError> {
        self.raster.as_ref().ok_or(ElevationError::Unavailable)
    }

    pub fn params(&self) -> &ProfileParams {
        &self.params
    }

    /// Starts a fixed-count profile over the area of `bounds`.
    pub fn route_profile(
        &self,
        bounds: &BoundsAccumulator,
    ) -> Result<RouteProfile, ElevationError> {
        Ok(RouteProfile::new(self.window(bounds)?, self.params))
    }

    /// Starts a per-way profile over the area of `bounds`.
    pub fn way_profile(&self, bounds: &BoundsAccumulator) -> Result<WayProfile, ElevationError> {
        Ok(WayProfile::new(self.window(bounds)?, self.params))
    }

    fn window(&self, bounds: &BoundsAccumulator) -> Result<RasterWindow, ElevationError> {
        let raster = self.raster()?;
        let bbox = bounds.bounds().ok_or(ElevationError::NotFound)?;
        let window = raster.load_window(bbox)?;
        if window.is_void() {
            debug!("window {:?}..{:?} is void", bbox.min(), bbox.max());
        }
        Ok(window)
    }

    /// Profiles `line` sampled at `segments + 1` evenly spread points.
    pub fn profile_line(
        &self,
        line: &LineString<f64>,
        segments: usize,
    ) -> Result<RouteElevation, ElevationError> {
        let points = interpolate_line(line, segments);
        if points.is_empty() {
            return Err(ElevationError::NotFound);
        }
        let mut bounds = BoundsAccumulator::new();
        bounds.expand_coords(points.iter().copied());
        let mut profile = self.route_profile(&bounds)?;
        profile.add_interpolated(&points, line.euclidean_length())?;
        profile.finish()
    }

    /// Profiles the vertices of every part of `paths`, positioned as one
    /// continuous route.
    pub fn profile_paths(
        &self,
        paths: &MultiLineString<f64>,
    ) -> Result<RouteElevation, ElevationError> {
        let parts: Vec<&LineString<f64>> = paths
            .iter()
            .filter(|line| !line.0.is_empty())
            .collect();
        if parts.is_empty() {
            return Err(ElevationError::NotFound);
        }
        let mut bounds = BoundsAccumulator::new();
        for line in &parts {
            bounds.expand_coords(line.coords().copied());
        }
        let mut profile = self.route_profile(&bounds)?;
        for line in parts {
            profile.add_path(line)?;
        }
        profile.finish()
    }

    /// Profiles a route made of `ways`, reducing each way adaptively.
    pub fn profile_ways(&self, ways: &[WaySegment]) -> Result<WaysElevation, ElevationError> {
        let mut bounds = BoundsAccumulator::new();
        for way in ways {
            bounds.expand_coords(way.coordinates.iter().copied());
            if let Some(midpoints) = &way.midpoints {
                bounds.expand_coords(midpoints.iter().copied());
            }
        }
        let mut profile = self.way_profile(&bounds)?;
        for way in ways {
            profile.add_way(way)?;
        }
        profile.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::ElevationContext;
    use crate::{
        config::ElevationConfig, profile::ProfileParams, raster::tests::raster, ways::WaySegment,
        BoundsAccumulator, ElevationError,
    };
    use geo::{coord, line_string, LineString, MultiLineString};

    fn context() -> ElevationContext {
        // 20 x 20 pixels of 10 units: flat at 100 up to x = 45, rising
        // 1 per unit to 200 at x = 145 and flat again beyond.
        let raster = raster(20, 20, |col, _| (col.clamp(4, 14) - 4) as f32 * 10.0 + 100.0);
        ElevationContext::with_raster(raster, ProfileParams::default()).unwrap()
    }

    #[test]
    fn test_unavailable() {
        let context = ElevationContext::new(&ElevationConfig::default()).unwrap();
        assert!(!context.is_available());
        assert!(matches!(context.raster(), Err(ElevationError::Unavailable)));

        let mut bounds = BoundsAccumulator::new();
        bounds.expand(0.0, 0.0, 1.0, 1.0);
        assert!(matches!(
            context.route_profile(&bounds),
            Err(ElevationError::Unavailable)
        ));
        assert!(matches!(
            context.profile_ways(&[]),
            Err(ElevationError::Unavailable)
        ));
    }

    #[test]
    fn test_missing_dem_file() {
        let config = ElevationConfig {
            dem_file: Some("/nonexistent/N00E000.hgt".into()),
            ..ElevationConfig::default()
        };
        assert!(matches!(
            ElevationContext::new(&config),
            Err(ElevationError::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_params() {
        let config = ElevationConfig {
            profile: ProfileParams {
                rounding_base: 0.0,
                ..ProfileParams::default()
            },
            ..ElevationConfig::default()
        };
        assert!(matches!(
            ElevationContext::new(&config),
            Err(ElevationError::Parameter("rounding_base"))
        ));
    }

    #[test]
    fn test_not_found() {
        let context = context();
        assert!(matches!(
            context.route_profile(&BoundsAccumulator::new()),
            Err(ElevationError::NotFound)
        ));
        assert!(matches!(
            context.profile_ways(&[]),
            Err(ElevationError::NotFound)
        ));
        let far = line_string![(x: 1000.0, y: 1000.0), (x: 2000.0, y: 2000.0)];
        assert!(matches!(
            context.profile_line(&far, 10),
            Err(ElevationError::NotFound)
        ));
    }

    #[test]
    fn test_void_coverage() {
        let raster = raster(10, 10, |col, _| if col < 5 { f32::NAN } else { 1.0 });
        let context = ElevationContext::with_raster(raster, ProfileParams::default()).unwrap();
        let line = line_string![(x: 5.0, y: 5.0), (x: 25.0, y: 45.0)];
        let elevation = context.profile_line(&line, 4).unwrap();
        assert_eq!((elevation.min_elevation, elevation.max_elevation), (None, None));
        assert_eq!((elevation.ascent, elevation.descent), (0, 0));
        assert_eq!(elevation.segments[0].elevation.len(), 5);

        let way = WaySegment::new(
            8,
            vec![coord! { x: 5.0, y: 5.0 }, coord! { x: 5.0, y: 95.0 }],
            90.0,
        );
        let elevation = context.profile_ways(&[way]).unwrap();
        assert_eq!(elevation.max_elevation, None);
        assert_eq!(elevation.segments.get(8).unwrap().elevation.len(), 2);
    }

    #[test]
    fn test_profile_line() {
        let line = line_string![(x: 5.0, y: 100.0), (x: 195.0, y: 100.0)];
        let elevation = context().profile_line(&line, 95).unwrap();
        assert_eq!(elevation.segments.len(), 1);
        assert_eq!(elevation.segments[0].elevation.len(), 96);
        assert_eq!(elevation.end_position, 190.0);
        assert_eq!(elevation.min_elevation, Some(100));
        assert_eq!(elevation.max_elevation, Some(200));
        assert_eq!(elevation.ascent, 100);
        assert_eq!(elevation.descent, 0);
    }

    #[test]
    fn test_profile_paths() {
        let paths = MultiLineString::new(vec![
            line_string![(x: 15.0, y: 20.0), (x: 15.0, y: 50.0)],
            LineString::new(vec![]),
            line_string![(x: 15.0, y: 60.0), (x: 95.0, y: 120.0)],
        ]);
        let elevation = context().profile_paths(&paths).unwrap();
        assert_eq!(elevation.segments.len(), 2);
        assert_eq!(elevation.end_position, 140.0);
        assert_eq!(elevation.segments[1].elevation[0].pos, 40.0);
    }

    #[test]
    fn test_profile_ways() {
        let ways = [
            WaySegment::new(
                42,
                vec![coord! { x: 5.0, y: 50.0 }, coord! { x: 105.0, y: 50.0 }],
                100.0,
            ),
            WaySegment::new(
                43,
                vec![coord! { x: 105.0, y: 50.0 }, coord! { x: 105.0, y: 150.0 }],
                100.0,
            ),
        ];
        let elevation = context().profile_ways(&ways).unwrap();
        assert_eq!(elevation.min_elevation, Some(100));
        assert_eq!(elevation.max_elevation, Some(160));
        let ids: Vec<i64> = elevation.segments.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![42, 43]);
        let last = elevation.segments.get(43).unwrap().elevation.last().unwrap();
        assert_eq!(last.pos, 200.0);
    }
}
