//! Elevation profiles of routes sampled from a DEM.
//!
//! Two kinds of profile are supported. A [`RouteProfile`] samples a
//! fixed number of points along a path and reports smoothed elevations
//! together with accumulated ascent and descent. A [`WayProfile`]
//! samples each way of a route at a regular step and keeps only the
//! points needed to follow the terrain within a given deviation.
//!
//! Both are created through an [`ElevationContext`], which owns the
//! DEM for the lifetime of the process:
//!
//! ```no_run
//! use elevation::{ElevationConfig, ElevationContext};
//! use geo::line_string;
//!
//! let config = ElevationConfig {
//!     dem_file: Some("N46E007.hgt".into()),
//!     ..ElevationConfig::default()
//! };
//! let context = ElevationContext::new(&config)?;
//! let route = line_string![(x: 7.41, y: 46.62), (x: 7.45, y: 46.58)];
//! let profile = context.profile_line(&route, 100)?;
//! println!("ascent: {} m", profile.ascent);
//! # Ok::<(), elevation::ElevationError>(())
//! ```

mod bounds;
mod config;
mod context;
mod error;
pub mod geometry;
mod math;
mod profile;
mod raster;
mod route;
pub mod signal;
pub mod simplify;
mod ways;

pub use crate::{
    bounds::BoundsAccumulator,
    config::ElevationConfig,
    context::ElevationContext,
    error::ElevationError,
    profile::{ElevationPoint, ProfileParams, ProfileParamsBuilder},
    raster::{GeoRaster, RasterWindow},
    route::{RouteElevation, RouteProfile, RouteSegment},
    ways::{WayElevation, WayProfile, WaySegment, WaySegments, WaysElevation},
};
pub use dem;
pub use geo;
