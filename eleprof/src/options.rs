use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Generate elevation profiles of routes.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// DEM raster, in the same projection as the route coordinates.
    /// Overrides the DEM named in the config file.
    #[arg(short, long)]
    pub dem: Option<PathBuf>,

    /// JSON file with elevation settings.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Profile a route given as a JSON list of `[x, y]` pairs, or as a
    /// list of such lists for a route made of several parts.
    Route {
        /// Route geometry file.
        geometry: PathBuf,

        /// Number of evenly spread segments to sample a single-part
        /// route with.
        #[arg(short, long, default_value_t = 100)]
        samples: usize,

        /// Identifier of the route, copied into the JSON output.
        #[arg(long)]
        id: Option<i64>,

        #[arg(value_enum, default_value_t = Output::Display)]
        output: Output,
    },

    /// Profile a route given as a JSON list of ways, each
    /// `{"id", "coordinates", "length", "midpoints"?}`.
    Ways {
        /// Ways file.
        geometry: PathBuf,

        #[arg(value_enum, default_value_t = Output::Display)]
        output: Output,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Output {
    /// Print a listing of the profile to stdout.
    Display,

    /// Print the profile as JSON to stdout.
    Json,

    /// Print profile points as CSV to stdout.
    Csv,

    /// Plot to terminal.
    Plot,
}
