use std::borrow::Cow;
use std::io::Read;

use flate2::read::{GzDecoder, ZlibDecoder};

use crate::error::{Error, Result};

/// Compression schemes that NBT data is typically wrapped in. Standalone
/// files such as `level.dat` are usually gzip, chunks in region files are
/// usually zlib.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Zlib,
    Uncompressed,
}

impl Compression {
    /// Guess the compression of `data` from its first bytes. Anything without
    /// a gzip or zlib header is taken to be uncompressed.
    pub fn detect(data: &[u8]) -> Compression {
        match data {
            [0x1f, 0x8b, ..] => Compression::Gzip,
            // CMF of deflate with a 32K window, and check bits making the first
            // two bytes a multiple of 31. Smaller windows are not accepted, a
            // String root with a long name can start with `08 1d` and pass the
            // check. 0x78 is never a tag kind.
            [0x78, flg, ..] if (0x7800 | u16::from(*flg)) % 31 == 0 => Compression::Zlib,
            _ => Compression::Uncompressed,
        }
    }
}

/// Inflate `data` according to `compression`. Uncompressed data is borrowed
/// rather than copied.
///
/// Fails with [`Error::Decompression`] if the data is not valid for the
/// scheme, or if it inflates to nothing.
pub fn decompress(compression: Compression, data: &[u8]) -> Result<Cow<'_, [u8]>> {
    let out = match compression {
        Compression::Uncompressed => Cow::Borrowed(data),
        Compression::Gzip => Cow::Owned(inflate(GzDecoder::new(data))?),
        Compression::Zlib => Cow::Owned(inflate(ZlibDecoder::new(data))?),
    };

    if out.is_empty() {
        return Err(Error::Decompression("no data".to_owned()));
    }
    Ok(out)
}

fn inflate(mut decoder: impl Read) -> Result<Vec<u8>> {
    let mut buf = vec![];
    decoder
        .read_to_end(&mut buf)
        .map_err(|e| Error::Decompression(e.to_string()))?;
    Ok(buf)
}
