mod options;

use anyhow::{Context, Error as AnyError};
use clap::Parser;
use elevation::{
    geo::{Coord, LineString, MultiLineString},
    ElevationConfig, ElevationContext, ElevationPoint, RouteElevation, WaySegment,
    WaysElevation,
};
use log::debug;
use options::{Cli, Command as CliCmd, Output};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use textplots::{Chart, Plot, Shape};

fn main() -> Result<(), AnyError> {
    let Cli { dem, config, cmd } = Cli::parse();

    env_logger::init();

    let mut config: ElevationConfig = match config {
        Some(path) => read_json(&path)?,
        None => ElevationConfig::default(),
    };
    if dem.is_some() {
        config.dem_file = dem;
    }
    debug!("{config:?}");
    let context = ElevationContext::new(&config)?;

    match cmd {
        CliCmd::Route {
            geometry,
            samples,
            id,
            output,
        } => {
            let mut profile = match read_json::<RouteInput>(&geometry)? {
                RouteInput::Line(coords) => {
                    context.profile_line(&LineString::from(coords), samples)?
                }
                RouteInput::Parts(parts) => context.profile_paths(&MultiLineString::new(
                    parts.into_iter().map(LineString::from).collect(),
                ))?,
            };
            profile.id = id;
            emit(&profile, &route_rows(&profile), output)
        }
        CliCmd::Ways { geometry, output } => {
            let ways: Vec<WaySegment> = read_json::<Vec<WayInput>>(&geometry)?
                .into_iter()
                .map(WaySegment::from)
                .collect();
            let profile = context.profile_ways(&ways)?;
            emit(&profile, &way_rows(&profile), output)
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AnyError> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RouteInput {
    Line(Vec<[f64; 2]>),
    Parts(Vec<Vec<[f64; 2]>>),
}

#[derive(Deserialize)]
struct WayInput {
    id: i64,
    coordinates: Vec<[f64; 2]>,
    length: f64,
    midpoints: Option<Vec<[f64; 2]>>,
}

impl From<WayInput> for WaySegment {
    fn from(
        WayInput {
            id,
            coordinates,
            length,
            midpoints,
        }: WayInput,
    ) -> Self {
        let to_coords = |pairs: Vec<[f64; 2]>| -> Vec<Coord<f64>> {
            pairs.into_iter().map(Coord::from).collect()
        };
        let way = WaySegment::new(id, to_coords(coordinates), length);
        match midpoints {
            Some(midpoints) => way.with_midpoints(to_coords(midpoints)),
            None => way,
        }
    }
}

/// A profile point labeled with the part of the route it belongs to.
struct Row<'a> {
    part: String,
    point: &'a ElevationPoint,
}

struct Summary {
    min_elevation: Option<i32>,
    max_elevation: Option<i32>,
    ascent_descent: Option<(i32, i32)>,
}

fn route_rows(profile: &RouteElevation) -> (Summary, Vec<Row<'_>>) {
    let rows = profile
        .segments
        .iter()
        .enumerate()
        .flat_map(|(idx, segment)| {
            segment.elevation.iter().map(move |point| Row {
                part: idx.to_string(),
                point,
            })
        })
        .collect();
    let summary = Summary {
        min_elevation: profile.min_elevation,
        max_elevation: profile.max_elevation,
        ascent_descent: Some((profile.ascent, profile.descent)),
    };
    (summary, rows)
}

fn way_rows(profile: &WaysElevation) -> (Summary, Vec<Row<'_>>) {
    let rows = profile
        .segments
        .iter()
        .flat_map(|(id, way)| {
            way.elevation.iter().map(move |point| Row {
                part: id.to_string(),
                point,
            })
        })
        .collect();
    let summary = Summary {
        min_elevation: profile.min_elevation,
        max_elevation: profile.max_elevation,
        ascent_descent: None,
    };
    (summary, rows)
}

fn emit<P: Serialize>(
    profile: &P,
    (summary, rows): &(Summary, Vec<Row<'_>>),
    output: Output,
) -> Result<(), AnyError> {
    match output {
        Output::Display => print_display(summary, rows)?,
        Output::Json => print_json(profile)?,
        Output::Csv => print_csv(rows)?,
        Output::Plot => plot_ascii(rows),
    };
    Ok(())
}

fn print_display(summary: &Summary, rows: &[Row<'_>]) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    match (summary.min_elevation, summary.max_elevation) {
        (Some(min), Some(max)) => writeln!(stdout, "elevation: {min} m .. {max} m")?,
        _ => writeln!(stdout, "elevation: no data")?,
    }
    if let Some((ascent, descent)) = summary.ascent_descent {
        writeln!(stdout, "ascent: {ascent} m, descent: {descent} m")?;
    }
    for Row { part, point } in rows {
        writeln!(
            stdout,
            "{part:>8} {:10.1}: {:8.1} ({}, {})",
            point.pos, point.ele, point.x, point.y
        )?;
    }
    Ok(())
}

/// # Example with gnuplot
///
/// ```sh
/// eleprof --dem=N46E007.hgt route route.json csv | tr ',' ' ' > /tmp/plot && gnuplot -p -e "plot '/tmp/plot' using 2:5 with lines"
/// ```
fn print_csv(rows: &[Row<'_>]) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "Part,Position,X,Y,Elevation")?;
    for Row { part, point } in rows {
        let ElevationPoint { x, y, ele, pos } = point;
        writeln!(stdout, "{part},{pos},{x},{y},{ele}")?;
    }
    Ok(())
}

fn print_json<P: Serialize>(profile: &P) -> Result<(), AnyError> {
    let json = serde_json::to_string(profile)?;
    println!("{json}");
    Ok(())
}

fn plot_ascii(rows: &[Row<'_>]) {
    #[allow(clippy::cast_possible_truncation)]
    let plot_data: Vec<(f32, f32)> = rows
        .iter()
        .filter(|row| !row.point.ele.is_nan())
        .map(|row| (row.point.pos as f32, row.point.ele as f32))
        .collect();
    let end = plot_data.last().map_or(0.0, |(pos, _)| *pos);
    Chart::new(300, 150, 0.0, end)
        .lineplot(&Shape::Lines(&plot_data))
        .display();
}
