use dem::DemError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ElevationError {
    #[error("DEM configuration: {0}")]
    Configuration(#[from] DemError),

    #[error("elevation not available")]
    Unavailable,

    #[error("no elevation data found")]
    NotFound,

    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("invalid parameter '{0}'")]
    Parameter(&'static str),
}
