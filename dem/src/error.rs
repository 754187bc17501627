use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid HGT name {0}")]
    HgtName(PathBuf),

    #[error("invalid DEM file len {0} for {1}")]
    HgtLen(u64, PathBuf),

    #[error("invalid world file {0}")]
    WorldFile(PathBuf),

    #[error("degenerate affine transform {0:?}")]
    DegenerateTransform([f64; 6]),

    #[error("{len} samples do not fill a {cols}x{rows} grid")]
    Dimensions { cols: usize, rows: usize, len: usize },
}
