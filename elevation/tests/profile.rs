use byteorder::{BigEndian as BE, WriteBytesExt};
use elevation::{
    dem::{LoadMode, VOID},
    geo::{coord, line_string},
    ElevationConfig, ElevationContext, ElevationError, WaySegment,
};
use std::{fs::File, io::Write, path::PathBuf};
use tempfile::TempDir;

/// Writes a 100 x 100 DEM of 10 m pixels whose upper left corner is at
/// (500000, 5001000). Elevation is 1000 m up to column 10, rises 2 m
/// per pixel eastwards to 1140 m at column 80 and stays there; the last
/// ten columns are void.
fn write_dem(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("valley.hgt");
    let mut file = File::create(&path).unwrap();
    for _row in 0..100 {
        for col in 0..100_i16 {
            let sample = if col >= 90 {
                VOID
            } else {
                1000 + 2 * (col.clamp(10, 80) - 10)
            };
            file.write_i16::<BE>(sample).unwrap();
        }
    }
    let mut world = File::create(dir.path().join("valley.hgw")).unwrap();
    writeln!(world, "10\n0\n0\n-10\n500005\n5000995").unwrap();
    path
}

fn context(dir: &TempDir, load_mode: LoadMode) -> ElevationContext {
    let config = ElevationConfig {
        dem_file: Some(write_dem(dir)),
        load_mode,
        ..ElevationConfig::default()
    };
    ElevationContext::new(&config).unwrap()
}

#[test]
fn test_route_profile_from_file() {
    let dir = tempfile::tempdir().unwrap();
    for load_mode in [LoadMode::InMem, LoadMode::MemMap] {
        let context = context(&dir, load_mode);
        // Pixel centers of columns 0 and 85.
        let route = line_string![(x: 500_005.0, y: 5_000_500.0), (x: 500_855.0, y: 5_000_500.0)];
        let elevation = context.profile_line(&route, 170).unwrap();
        assert_eq!(elevation.min_elevation, Some(1000));
        assert_eq!(elevation.max_elevation, Some(1140));
        assert_eq!(elevation.ascent, 140);
        assert_eq!(elevation.descent, 0);
        assert_eq!(elevation.end_position, 850.0);

        let points = &elevation.segments[0].elevation;
        assert_eq!(points.len(), 171);
        assert!(points.windows(2).all(|p| p[0].pos <= p[1].pos));
    }
}

#[test]
fn test_ways_profile_json() {
    let dir = tempfile::tempdir().unwrap();
    let context = context(&dir, LoadMode::MemMap);
    let ways = [
        WaySegment::new(
            1001,
            vec![
                coord! { x: 500_105.0, y: 5_000_300.0 },
                coord! { x: 500_505.0, y: 5_000_300.0 },
            ],
            400.0,
        ),
        WaySegment::new(
            1002,
            vec![
                coord! { x: 500_505.0, y: 5_000_300.0 },
                coord! { x: 500_505.0, y: 5_000_700.0 },
            ],
            400.0,
        ),
    ];
    let elevation = context.profile_ways(&ways).unwrap();
    assert_eq!(
        (elevation.min_elevation, elevation.max_elevation),
        (Some(1000), Some(1080))
    );

    let json = serde_json::to_value(&elevation).unwrap();
    let first = json["segments"]["1001"]["elevation"].as_array().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[1]["ele"], 1080.0);
    let second = json["segments"]["1002"]["elevation"].as_array().unwrap();
    assert_eq!(second[0]["pos"], 400.0);
    assert_eq!(second.last().unwrap()["pos"], 800.0);
}

#[test]
fn test_void_and_uncovered_routes() {
    let dir = tempfile::tempdir().unwrap();
    let context = context(&dir, LoadMode::InMem);

    let in_void = line_string![(x: 500_910.0, y: 5_000_100.0), (x: 500_990.0, y: 5_000_900.0)];
    let elevation = context.profile_line(&in_void, 20).unwrap();
    assert_eq!((elevation.ascent, elevation.descent), (0, 0));
    let json = serde_json::to_value(&elevation).unwrap();
    assert!(json["min_elevation"].is_null() && json["max_elevation"].is_null());
    assert_eq!(json["segments"][0]["elevation"].as_array().unwrap().len(), 21);

    let elsewhere = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 10.0)];
    assert!(matches!(
        context.profile_line(&elsewhere, 20),
        Err(ElevationError::NotFound)
    ));
}

#[test]
fn test_unavailable_without_dem() {
    let context = ElevationContext::new(&ElevationConfig::default()).unwrap();
    let route = line_string![(x: 500_005.0, y: 5_000_500.0), (x: 500_805.0, y: 5_000_500.0)];
    assert!(matches!(
        context.profile_line(&route, 10),
        Err(ElevationError::Unavailable)
    ));
}
