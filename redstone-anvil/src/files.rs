use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::warn;
use redstone_nbt::{Document, ParseOpts};

use crate::{Region, Result, REGION_WIDTH};

/// Finds region files in a world's region directory, named `r.X.Z.mca`.
pub struct RegionFileLoader {
    region_dir: PathBuf,
}

impl RegionFileLoader {
    pub fn new(region_dir: PathBuf) -> Self {
        Self { region_dir }
    }

    pub fn region_path(&self, x: isize, z: isize) -> PathBuf {
        self.region_dir.join(format!("r.{}.{}.mca", x, z))
    }

    pub fn has_region(&self, x: isize, z: isize) -> bool {
        self.region_path(x, z).exists()
    }

    /// Open the region at region coordinates `x`, `z`. A region that does not
    /// exist is `None`.
    pub fn region(&self, x: isize, z: isize) -> Result<Option<Region<File>>> {
        let file = match File::open(self.region_path(x, z)) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(Region::from_stream(file)))
    }

    /// Load the chunk at world chunk coordinates `x`, `z`, finding the region
    /// that holds it.
    pub fn chunk(&self, x: isize, z: isize) -> redstone_nbt::Result<Document> {
        self.chunk_with_opts(x, z, ParseOpts::default())
    }

    /// As [`chunk`](Self::chunk), parsing with `opts`. A missing region
    /// file is [`redstone_nbt::Error::ChunkNotFound`], the same as a missing
    /// chunk.
    pub fn chunk_with_opts(
        &self,
        x: isize,
        z: isize,
        opts: ParseOpts,
    ) -> redstone_nbt::Result<Document> {
        let (rx, rz) = (region_coord(x), region_coord(z));
        let mut region = match self.region(rx, rz) {
            Ok(Some(region)) => region,
            Ok(None) => return Err(redstone_nbt::Error::ChunkNotFound),
            Err(e) => return Err(redstone_nbt::Error::IO(e.into())),
        };

        Document::from_chunk_with_opts(&mut region, local_coord(x), local_coord(z), opts)
    }

    /// Coordinates of every non-empty region file in the directory.
    pub fn list(&self) -> Result<Vec<(isize, isize)>> {
        let paths = fs::read_dir(&self.region_dir)?;

        let coords = paths
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.extension().map_or(false, |ext| ext == "mca"))
            .filter(|path| match fs::metadata(path) {
                Ok(meta) => meta.len() > 0,
                Err(e) => {
                    warn!("could not stat {}: {}", path.display(), e);
                    false
                }
            })
            .filter_map(|path| coords_from_region(&path))
            .collect();

        Ok(coords)
    }
}

/// The region a chunk coordinate falls in.
pub fn region_coord(chunk: isize) -> isize {
    chunk.div_euclid(REGION_WIDTH as isize)
}

/// A chunk coordinate relative to its region.
pub fn local_coord(chunk: isize) -> usize {
    chunk.rem_euclid(REGION_WIDTH as isize) as usize
}

fn coords_from_region(region: &Path) -> Option<(isize, isize)> {
    let filename = region.file_name()?.to_str()?;
    let mut parts = filename.split('.').skip(1);
    let x = parts.next()?.parse::<isize>().ok()?;
    let z = parts.next()?.parse::<isize>().ok()?;
    Some((x, z))
}
