use crate::profile::ProfileParams;
use dem::LoadMode;
use serde::Deserialize;
use std::path::PathBuf;

/// Process-wide elevation settings.
///
/// Every field has a default, so `{}` is a valid configuration which
/// leaves elevation unavailable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ElevationConfig {
    /// DEM raster in the projection of the routes.
    pub dem_file: Option<PathBuf>,

    #[serde(with = "LoadModeDef")]
    pub load_mode: LoadMode,

    pub profile: ProfileParams,
}

#[derive(Deserialize)]
#[serde(remote = "LoadMode", rename_all = "lowercase")]
enum LoadModeDef {
    InMem,
    MemMap,
}
