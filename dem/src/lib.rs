//! Georeferenced digital elevation model (DEM) rasters.
//!
//! A DEM file is a square grid of big-endian `i16` samples laid out
//! like an SRTM `.hgt` file: row-major, first row first, `-32768`
//! marking voids. Georeferencing comes from an ESRI world file next to
//! the raster (`<stem>.hgw`, falling back to `<stem>.wld`) or, for
//! files following the SRTM naming scheme, from the file name itself.
//!
//! # References
//!
//! 1. [HGT file layout](http://fileformats.archiveteam.org/index.php?title=HGT&oldid=17250)
//! 1. [World files](https://en.wikipedia.org/wiki/World_file)
//! 1. [GDAL geotransform](https://gdal.org/tutorials/geotransforms_tut.html)

mod error;
mod grid;
mod transform;

pub use crate::{error::DemError, grid::Grid, transform::AffineTransform};
use byteorder::{BigEndian as BE, ByteOrder, ReadBytesExt};
use geo::geometry::{Coord, Rect};
use log::debug;
use memmap2::Mmap;
use std::{
    fs::File,
    io::BufReader,
    mem::size_of,
    path::{Path, PathBuf},
};

/// Base floating point type used for all coordinates.
pub type C = f64;

/// Raw sample value marking a void.
pub const VOID: i16 = -32768;

/// An opened DEM raster.
pub struct Dem {
    /// Pixel to geographic mapping.
    transform: AffineTransform,

    /// Number of samples per row.
    cols: usize,

    /// Number of rows.
    rows: usize,

    /// Elevation samples.
    samples: SampleStore,
}

enum SampleStore {
    InMem(Box<[f32]>),
    MemMap(Mmap),
}

impl SampleStore {
    fn get_unchecked(&self, index: usize) -> f32 {
        match self {
            Self::InMem(samples) => samples[index],
            Self::MemMap(raw) => {
                let start = index * size_of::<i16>();
                let end = start + size_of::<i16>();
                to_elevation(BE::read_i16(&raw[start..end]))
            }
        }
    }
}

/// How to load DEM samples.
///
/// The trade off between loading samples into memory versus memory
/// mapping is not obvious, and you should measure both before
/// deciding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Parse the file and load it into memory.
    InMem,

    /// Memory map file contents.
    #[default]
    MemMap,
}

impl Dem {
    /// Opens the DEM at `path` using `mode`.
    pub fn open<P: AsRef<Path>>(path: P, mode: LoadMode) -> Result<Self, DemError> {
        match mode {
            LoadMode::InMem => Self::load(path),
            LoadMode::MemMap => Self::memmap(path),
        }
    }

    /// Returns a DEM read into memory from the file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DemError> {
        let side = extract_side(&path)?;
        let transform = georeference(&path, side)?;
        debug!("loading {:?}, {side}x{side}", path.as_ref());

        let mut file = BufReader::new(File::open(path)?);
        let mut samples = Vec::with_capacity(side * side);
        for _ in 0..(side * side) {
            samples.push(to_elevation(file.read_i16::<BE>()?));
        }

        Ok(Self {
            transform,
            cols: side,
            rows: side,
            samples: SampleStore::InMem(samples.into_boxed_slice()),
        })
    }

    /// Returns a DEM using the memory-mapped file as storage.
    pub fn memmap<P: AsRef<Path>>(path: P) -> Result<Self, DemError> {
        let side = extract_side(&path)?;
        let transform = georeference(&path, side)?;
        debug!("mapping {:?}, {side}x{side}", path.as_ref());

        let samples = {
            let file = File::open(path)?;
            let mmap = unsafe { Mmap::map(&file)? };
            SampleStore::MemMap(mmap)
        };

        Ok(Self {
            transform,
            cols: side,
            rows: side,
            samples,
        })
    }

    /// Returns an in-memory DEM over the given row-major samples.
    pub fn from_grid(transform: AffineTransform, grid: Grid) -> Self {
        let (cols, rows) = (grid.cols(), grid.rows());
        Self {
            transform,
            cols,
            rows,
            samples: SampleStore::InMem(grid.samples().into()),
        }
    }

    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    /// Returns `(cols, rows)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Returns the geographic extent of the raster.
    pub fn extent(&self) -> Rect<C> {
        #[allow(clippy::cast_precision_loss)]
        let (cols, rows) = (self.cols as C, self.rows as C);
        let corners = [(0.0, 0.0), (cols, 0.0), (0.0, rows), (cols, rows)]
            .map(|(col, row)| self.transform.pixel_to_geo(col, row));
        let (mut min, mut max) = (
            Coord {
                x: C::INFINITY,
                y: C::INFINITY,
            },
            Coord {
                x: C::NEG_INFINITY,
                y: C::NEG_INFINITY,
            },
        );
        for (x, y) in corners {
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
        }
        Rect::new(min, max)
    }

    /// Returns the sample at `(col, row)`, or `None` outside the raster.
    ///
    /// Voids are returned as `Some(NaN)`.
    pub fn get(&self, col: isize, row: isize) -> Option<f32> {
        let col = usize::try_from(col).ok().filter(|&c| c < self.cols)?;
        let row = usize::try_from(row).ok().filter(|&r| r < self.rows)?;
        Some(self.samples.get_unchecked(row * self.cols + col))
    }

    /// Reads a `cols` x `rows` block whose first sample is at pixel
    /// `(col_off, row_off)`.
    ///
    /// Pixels of the block lying outside the raster are returned as
    /// voids.
    pub fn read_window(
        &self,
        col_off: isize,
        row_off: isize,
        cols: usize,
        rows: usize,
    ) -> Result<Grid, DemError> {
        let mut samples = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                #[allow(clippy::cast_possible_wrap)]
                let sample = self
                    .get(col_off + col as isize, row_off + row as isize)
                    .unwrap_or(f32::NAN);
                samples.push(sample);
            }
        }
        Grid::new(cols, rows, samples)
    }
}

fn to_elevation(raw: i16) -> f32 {
    if raw == VOID {
        f32::NAN
    } else {
        f32::from(raw)
    }
}

/// Returns the side length of the square grid stored at `path`.
fn extract_side<P: AsRef<Path>>(path: P) -> Result<usize, DemError> {
    let len = path.as_ref().metadata()?.len();
    let mk_err = || DemError::HgtLen(len, path.as_ref().to_owned());
    let samples = usize::try_from(len).map_err(|_| mk_err())? / size_of::<i16>();
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let side = (samples as f64).sqrt().round() as usize;
    if len % 2 == 0 && side >= 2 && side * side == samples {
        Ok(side)
    } else {
        Err(mk_err())
    }
}

/// Finds the transform for the raster at `path`.
fn georeference<P: AsRef<Path>>(path: P, side: usize) -> Result<AffineTransform, DemError> {
    let path = path.as_ref();
    for ext in ["hgw", "wld"] {
        let world_file: PathBuf = path.with_extension(ext);
        if world_file.exists() {
            debug!("georeferencing {path:?} with {world_file:?}");
            return AffineTransform::from_world_file(world_file);
        }
    }

    // SRTM tiles span one degree and share their edge samples with
    // their neighbours.
    let Coord { x, y } = parse_sw_corner(path)?;
    #[allow(clippy::cast_precision_loss)]
    let cell = 1.0 / (side - 1) as C;
    AffineTransform::north_up(
        C::from(x) - cell / 2.0,
        C::from(y) + 1.0 + cell / 2.0,
        cell,
        -cell,
    )
}

fn parse_sw_corner<P: AsRef<Path>>(path: P) -> Result<Coord<i16>, DemError> {
    let mk_err = || DemError::HgtName(path.as_ref().to_owned());
    let name = path
        .as_ref()
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(mk_err)?;
    if name.len() != 7 || !name.is_ascii() {
        return Err(mk_err());
    }
    let lat_sign = match &name[0..1] {
        "N" | "n" => 1,
        "S" | "s" => -1,
        _ => return Err(mk_err()),
    };
    let lat = lat_sign * name[1..3].parse::<i16>().map_err(|_| mk_err())?;
    let lon_sign = match &name[3..4] {
        "E" | "e" => 1,
        "W" | "w" => -1,
        _ => return Err(mk_err()),
    };
    let lon = lon_sign * name[4..7].parse::<i16>().map_err(|_| mk_err())?;
    Ok(Coord { x: lon, y: lat })
}
