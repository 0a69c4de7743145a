use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::ZlibEncoder;
use log::debug;
use num_enum::TryFromPrimitive;
use redstone_nbt::{ChunkSource, Compression, RawChunk};

use crate::{Error, Result};

/// the size in bytes of a 'sector' in a region file. Sectors are Minecraft's size unit
/// for chunks. For example, a chunk might be `3 * SECTOR_SIZE` bytes. The
/// actual compressed bytes of a chunk may be smaller and the exact value is
/// tracking in the chunk header.
pub const SECTOR_SIZE: usize = 4096;

/// the size of the region file header.
pub const REGION_HEADER_SIZE: usize = 2 * SECTOR_SIZE;

/// size of header for each chunk in the region file. This header proceeds the
/// compressed chunk data.
pub const CHUNK_HEADER_SIZE: usize = 5;

/// Number of chunks along each side of a region.
pub const REGION_WIDTH: usize = 32;

/// A Minecraft Region, read lazily from a stream.
pub struct Region<S> {
    stream: S,
}

impl<S> Region<S>
where
    S: Read + Seek,
{
    /// Will assume a seek of zero is the start of the region. This does not
    /// load any region data into memory. Chunks are read from the underlying
    /// stream when needed.
    pub fn from_stream(stream: S) -> Self {
        Self { stream }
    }

    /// Return the inner stream used, for example to get at the bytes of a
    /// region built in memory.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Where the chunk at `x`, `z` is stored, or `None` if the chunk does not
    /// exist. The coordinates are relative to the region and should both be
    /// `0..32`.
    pub fn location(&mut self, x: usize, z: usize) -> Result<Option<ChunkLocation>> {
        check_coords(x, z)?;
        self.stream.seek(SeekFrom::Start(header_pos(x, z)))?;

        let offset = self.stream.read_u24::<BigEndian>()? as u64;
        let sectors = self.stream.read_u8()? as u64;

        if offset == 0 && sectors == 0 {
            Ok(None)
        } else {
            Ok(Some(ChunkLocation { offset, sectors }))
        }
    }

    /// Read the chunk located at the chunk coordindates `x`, `z` without
    /// decompressing it.
    pub fn read_compressed_chunk(&mut self, x: usize, z: usize) -> Result<Option<RawChunk>> {
        let loc = match self.location(x, z)? {
            Some(loc) => loc,
            None => return Ok(None),
        };

        self.stream
            .seek(SeekFrom::Start(loc.offset * SECTOR_SIZE as u64))?;

        let mut buf = [0u8; CHUNK_HEADER_SIZE];
        self.stream.read_exact(&mut buf)?;
        let metadata = ChunkMeta::new(&buf)?;

        let mut data = vec![];
        (&mut self.stream)
            .take(metadata.compressed_len as u64)
            .read_to_end(&mut data)?;

        if data.len() < metadata.compressed_len as usize {
            return Err(Error::InsufficientData);
        }

        debug!(
            "chunk {}, {}: {} bytes {:?} at sector {}",
            x, z, metadata.compressed_len, metadata.compression_scheme, loc.offset
        );

        Ok(Some(RawChunk {
            data,
            compression: metadata.compression_scheme.into(),
        }))
    }

    /// Read the chunk located at the chunk coordindates `x`, `z`. The data
    /// returned is uncompressed NBT.
    pub fn read_chunk(&mut self, x: usize, z: usize) -> Result<Option<Vec<u8>>> {
        match self.read_compressed_chunk(x, z)? {
            Some(chunk) => {
                let data = redstone_nbt::decompress(chunk.compression, &chunk.data)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                Ok(Some(data.into_owned()))
            }
            None => Ok(None),
        }
    }

    /// Coordinates of every chunk present in the region, in header order.
    pub fn present_chunks(&mut self) -> Result<Vec<(usize, usize)>> {
        let mut present = vec![];
        for z in 0..REGION_WIDTH {
            for x in 0..REGION_WIDTH {
                if self.location(x, z)?.is_some() {
                    present.push((x, z));
                }
            }
        }
        Ok(present)
    }
}

impl<S> Region<S>
where
    S: Read + Write + Seek,
{
    /// Create an entirely empty region. The provided stream will be
    /// overwritten, and will assume a seek to 0 is the start of the region.
    pub fn empty(mut stream: S) -> Result<Self> {
        stream.rewind()?;
        stream.write_all(&[0; REGION_HEADER_SIZE])?;
        Ok(Self { stream })
    }

    /// Write the given uncompressed NBT chunk data to the chunk coordinates
    /// `x`, `z`. The data is compressed with zlib, use
    /// [`write_compressed_chunk`](Self::write_compressed_chunk) for more
    /// control.
    pub fn write_chunk(&mut self, x: usize, z: usize, uncompressed_chunk: &[u8]) -> Result<()> {
        let mut buf = vec![];
        let mut enc = ZlibEncoder::new(uncompressed_chunk, flate2::Compression::fast());
        enc.read_to_end(&mut buf)?;
        self.write_compressed_chunk(x, z, CompressionScheme::Zlib, &buf)
    }

    /// Write already compressed chunk data to `x`, `z`, replacing any chunk
    /// there. A chunk that still fits in its sectors is rewritten in place,
    /// otherwise it moves to the end of the region.
    pub fn write_compressed_chunk(
        &mut self,
        x: usize,
        z: usize,
        scheme: CompressionScheme,
        compressed_chunk: &[u8],
    ) -> Result<()> {
        check_coords(x, z)?;

        let required_sectors = div_ceil(CHUNK_HEADER_SIZE + compressed_chunk.len(), SECTOR_SIZE);
        if required_sectors > u8::MAX as usize {
            return Err(Error::ChunkTooLarge);
        }

        let header_sectors = (REGION_HEADER_SIZE / SECTOR_SIZE) as u64;
        let offset = match self.location(x, z)? {
            Some(loc) if loc.offset >= header_sectors && required_sectors as u64 <= loc.sectors => {
                loc.offset
            }
            _ => self.end_of_other_chunks(x, z)?,
        };

        debug!(
            "writing chunk {}, {}: {} bytes {:?} at sector {}",
            x,
            z,
            compressed_chunk.len(),
            scheme,
            offset
        );

        self.set_chunk(offset, scheme, compressed_chunk, required_sectors)?;
        self.set_header(x, z, offset, required_sectors)
    }

    /// The first sector after every chunk other than `x`, `z`. Everything from
    /// there on is free for `x`, `z` to use.
    fn end_of_other_chunks(&mut self, x: usize, z: usize) -> Result<u64> {
        let mut end = (REGION_HEADER_SIZE / SECTOR_SIZE) as u64;
        for (cx, cz) in self.present_chunks()? {
            if (cx, cz) == (x, z) {
                continue;
            }
            if let Some(loc) = self.location(cx, cz)? {
                end = end.max(loc.offset + loc.sectors);
            }
        }
        Ok(end)
    }

    fn set_chunk(
        &mut self,
        offset: u64,
        scheme: CompressionScheme,
        chunk: &[u8],
        sectors: usize,
    ) -> Result<()> {
        self.stream
            .seek(SeekFrom::Start(offset * SECTOR_SIZE as u64))?;

        // size written to disk includes the byte representing the compression
        // scheme, so +1.
        self.stream.write_u32::<BigEndian>(chunk.len() as u32 + 1)?;
        self.stream.write_u8(scheme as u8)?;
        self.stream.write_all(chunk)?;

        // pad to whole sectors so the file length stays sector aligned.
        let padding = sectors * SECTOR_SIZE - CHUNK_HEADER_SIZE - chunk.len();
        self.stream.write_all(&vec![0; padding])?;
        Ok(())
    }

    fn set_header(&mut self, x: usize, z: usize, offset: u64, sectors: usize) -> Result<()> {
        self.stream.seek(SeekFrom::Start(header_pos(x, z)))?;
        self.stream.write_u24::<BigEndian>(offset as u32)?;
        self.stream.write_u8(sectors as u8)?;
        Ok(())
    }
}

impl<S> ChunkSource for Region<S>
where
    S: Read + Seek,
{
    fn chunk(&mut self, x: usize, z: usize) -> io::Result<Option<RawChunk>> {
        Ok(self.read_compressed_chunk(x, z)?)
    }
}

/// Various compression schemes that NBT data is typically compressed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum CompressionScheme {
    Gzip = 1,
    Zlib = 2,
    Uncompressed = 3,
}

impl From<Compression> for CompressionScheme {
    fn from(compression: Compression) -> Self {
        match compression {
            Compression::Gzip => CompressionScheme::Gzip,
            Compression::Zlib => CompressionScheme::Zlib,
            Compression::Uncompressed => CompressionScheme::Uncompressed,
        }
    }
}

impl From<CompressionScheme> for Compression {
    fn from(scheme: CompressionScheme) -> Self {
        match scheme {
            CompressionScheme::Gzip => Compression::Gzip,
            CompressionScheme::Zlib => Compression::Zlib,
            CompressionScheme::Uncompressed => Compression::Uncompressed,
        }
    }
}

fn check_coords(x: usize, z: usize) -> Result<()> {
    if x >= REGION_WIDTH || z >= REGION_WIDTH {
        return Err(Error::InvalidOffset(x as isize, z as isize));
    }
    Ok(())
}

fn div_ceil(lhs: usize, rhs: usize) -> usize {
    (lhs + rhs - 1) / rhs
}

fn header_pos(x: usize, z: usize) -> u64 {
    (4 * (x + z * REGION_WIDTH)) as u64
}

#[derive(Debug, PartialEq, Eq)]
pub struct ChunkLocation {
    /// The offset, in units of 4kiB sectors, into the region file this chunk is
    /// located at. Offset 0 is the start of the file.
    pub offset: u64,

    /// The number of 4 kiB sectors that this chunk occupies in the region file.
    pub sectors: u64,
}

/// Encodes how the NBT-Data is compressed
#[derive(Debug)]
struct ChunkMeta {
    compressed_len: u32,
    compression_scheme: CompressionScheme,
}

impl ChunkMeta {
    fn new(data: &[u8]) -> Result<Self> {
        if data.len() < CHUNK_HEADER_SIZE {
            return Err(Error::InsufficientData);
        }

        let mut buf = &data[..CHUNK_HEADER_SIZE];
        let len = buf.read_u32::<BigEndian>()?;
        let scheme = buf.read_u8()?;
        let scheme = CompressionScheme::try_from(scheme).map_err(|_| Error::InvalidChunkMeta)?;

        // this len includes the compression byte.
        let compressed_len = len.checked_sub(1).ok_or(Error::InvalidChunkMeta)?;

        Ok(Self {
            compressed_len,
            compression_scheme: scheme,
        })
    }
}
