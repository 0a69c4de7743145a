//! For handling Minecraft's region format, Anvil.
//!
//! [`Region`] can be given a `Read` and `Seek` type, eg a file, in order to
//! extract chunk data. It implements [`redstone_nbt::ChunkSource`], so chunks
//! can be loaded straight into a [`redstone_nbt::Document`]:
//!
//! ```no_run
//! use redstone_anvil::Region;
//! use redstone_nbt::Document;
//!
//! let file = std::fs::File::open("world/region/r.0.0.mca").unwrap();
//! let mut region = Region::from_stream(file);
//! let chunk = Document::from_chunk(&mut region, 0, 0).unwrap();
//! println!("{:?}", chunk.root().get("Status"));
//! ```
//!
//! With a stream that is also `Write`, chunks can be replaced with
//! [`Region::write_chunk`] and [`Region::write_compressed_chunk`].

mod files;
mod region;

pub use files::*;
pub use region::*;

#[cfg(test)]
mod test;

#[derive(Debug)]
pub enum Error {
    InsufficientData,
    IO(std::io::Error),
    InvalidOffset(isize, isize),
    InvalidChunkMeta,
    ChunkTooLarge,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IO(err)
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> std::io::Error {
        use std::io::ErrorKind;

        let kind = match err {
            Error::IO(e) => return e,
            Error::InvalidOffset(..) | Error::ChunkTooLarge => ErrorKind::InvalidInput,
            Error::InsufficientData | Error::InvalidChunkMeta => ErrorKind::InvalidData,
        };
        std::io::Error::new(kind, err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InsufficientData => f.write_str("insufficient data to parse chunk metadata"),
            Error::IO(e) => f.write_fmt(format_args!("io error: {}", e)),
            Error::InvalidOffset(x, z) => {
                f.write_fmt(format_args!("invalid offset: x = {}, z = {}", x, z))
            }
            Error::InvalidChunkMeta => {
                f.write_str("compression scheme was not recognised for chunk")
            }
            Error::ChunkTooLarge => f.write_str("chunk does not fit in 255 sectors"),
        }
    }
}

impl std::error::Error for Error {}
