use std::io::{Cursor, Write};

use flate2::write::ZlibEncoder;
use redstone_nbt::{ChunkSource, Compression, Document, ParseOpts, TagKind};

use crate::{
    local_coord, region_coord, ChunkLocation, CompressionScheme, Error, Region, RegionFileLoader,
    CHUNK_HEADER_SIZE, REGION_HEADER_SIZE, SECTOR_SIZE,
};

/// Builder for region files. Chunks are laid out one after the other
/// following the header, each padded to whole sectors.
struct Builder {
    inner: Vec<u8>,
}

impl Builder {
    fn new() -> Self {
        Self {
            inner: vec![0; REGION_HEADER_SIZE],
        }
    }

    fn location(mut self, x: usize, z: usize, offset: u32, sectors: u8) -> Self {
        let pos = 4 * (x + z * 32);
        self.inner[pos..pos + 3].copy_from_slice(&offset.to_be_bytes()[1..4]);
        self.inner[pos + 3] = sectors;
        self
    }

    fn chunk(self, x: usize, z: usize, scheme: u8, data: &[u8]) -> Self {
        let offset = (self.inner.len() / SECTOR_SIZE) as u32;
        let sectors = (CHUNK_HEADER_SIZE + data.len() + SECTOR_SIZE - 1) / SECTOR_SIZE;
        let mut b = self.location(x, z, offset, sectors as u8);

        b.inner
            .extend_from_slice(&(data.len() as u32 + 1).to_be_bytes());
        b.inner.push(scheme);
        b.inner.extend_from_slice(data);

        let padded = (offset as usize + sectors) * SECTOR_SIZE;
        b.inner.resize(padded, 0);
        b
    }

    fn build(self) -> Region<Cursor<Vec<u8>>> {
        Region::from_stream(Cursor::new(self.inner))
    }
}

fn empty_compound() -> Vec<u8> {
    vec![0x0a, 0x00, 0x00, 0x00]
}

fn status_chunk() -> Vec<u8> {
    let mut data = vec![0x0a, 0x00, 0x00];
    data.extend_from_slice(&[0x08, 0x00, 0x06]);
    data.extend_from_slice(b"Status");
    data.extend_from_slice(&[0x00, 0x04]);
    data.extend_from_slice(b"full");
    data.push(0x00);
    data
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(vec![], flate2::Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

#[test]
fn empty_region_has_no_chunks() {
    let mut r = Builder::new().build();

    for x in 0..32 {
        for z in 0..32 {
            assert!(matches!(r.read_compressed_chunk(x, z), Ok(None)));
        }
    }
    assert!(r.present_chunks().unwrap().is_empty());
}

#[test]
fn invalid_offset() {
    let mut r = Builder::new().build();
    assert!(matches!(
        r.read_chunk(32, 0),
        Err(Error::InvalidOffset(32, 0))
    ));
    assert!(matches!(
        r.read_chunk(0, 32),
        Err(Error::InvalidOffset(0, 32))
    ));
}

#[test]
fn truncated_header() {
    let mut r = Region::from_stream(Cursor::new(vec![0u8; 100]));
    match r.location(31, 31) {
        Err(Error::IO(inner)) if inner.kind() == std::io::ErrorKind::UnexpectedEof => {}
        o => panic!("should error {:?}", o),
    }
}

#[test]
fn location_of_chunk() {
    let mut r = Builder::new()
        .chunk(0, 0, 3, &empty_compound())
        .chunk(5, 7, 3, &vec![0; SECTOR_SIZE])
        .build();

    assert_eq!(
        r.location(0, 0).unwrap(),
        Some(ChunkLocation {
            offset: 2,
            sectors: 1
        })
    );
    assert_eq!(
        r.location(5, 7).unwrap(),
        Some(ChunkLocation {
            offset: 3,
            sectors: 2
        })
    );
    assert_eq!(r.present_chunks().unwrap(), [(0, 0), (5, 7)]);
}

#[test]
fn read_uncompressed_chunk() {
    let mut r = Builder::new().chunk(1, 2, 3, &status_chunk()).build();

    let raw = r.read_compressed_chunk(1, 2).unwrap().unwrap();
    assert_eq!(raw.compression, Compression::Uncompressed);
    assert_eq!(raw.data, status_chunk());
    assert_eq!(r.read_chunk(1, 2).unwrap().unwrap(), status_chunk());
}

#[test]
fn read_zlib_chunk() {
    let mut r = Builder::new().chunk(0, 0, 2, &zlib(&status_chunk())).build();

    let raw = r.read_compressed_chunk(0, 0).unwrap().unwrap();
    assert_eq!(raw.compression, Compression::Zlib);
    assert_eq!(r.read_chunk(0, 0).unwrap().unwrap(), status_chunk());
}

#[test]
fn unknown_compression_scheme() {
    let mut r = Builder::new().chunk(0, 0, 9, &status_chunk()).build();
    assert!(matches!(
        r.read_compressed_chunk(0, 0),
        Err(Error::InvalidChunkMeta)
    ));
}

#[test]
fn chunk_length_past_end_of_file() {
    let mut b = Builder::new().chunk(0, 0, 3, &status_chunk());
    b.inner.truncate(REGION_HEADER_SIZE + CHUNK_HEADER_SIZE + 2);
    let mut r = b.build();
    assert!(matches!(
        r.read_compressed_chunk(0, 0),
        Err(Error::InsufficientData)
    ));
}

#[test]
fn document_from_region() {
    let mut r = Builder::new()
        .chunk(3, 4, 2, &zlib(&status_chunk()))
        .build();

    let doc = Document::from_chunk(&mut r, 3, 4).unwrap();
    assert_eq!(doc.root_kind(), TagKind::Compound);
    assert_eq!(doc.root().get("Status").unwrap().to_string_lossy(), "full");

    assert!(matches!(
        Document::from_chunk(&mut r, 0, 0),
        Err(redstone_nbt::Error::ChunkNotFound)
    ));
}

#[test]
fn chunk_source_maps_errors_to_io() {
    let mut r = Builder::new().chunk(0, 0, 9, &status_chunk()).build();
    let err = r.chunk(0, 0).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);

    let err = r.chunk(40, 0).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
}

#[test]
fn chunk_coordinates_split_into_regions() {
    assert_eq!((region_coord(0), local_coord(0)), (0, 0));
    assert_eq!((region_coord(31), local_coord(31)), (0, 31));
    assert_eq!((region_coord(32), local_coord(32)), (1, 0));
    assert_eq!((region_coord(-1), local_coord(-1)), (-1, 31));
    assert_eq!((region_coord(-32), local_coord(-32)), (-1, 0));
    assert_eq!((region_coord(-33), local_coord(-33)), (-2, 31));
}

#[test]
fn loader_finds_regions() {
    let dir = std::env::temp_dir().join(format!("redstone-anvil-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let region = Builder::new().chunk(31, 0, 3, &status_chunk()).inner;
    std::fs::write(dir.join("r.-1.0.mca"), region).unwrap();
    std::fs::write(dir.join("r.5.5.mca"), b"").unwrap();
    std::fs::write(dir.join("notes.txt"), b"hello").unwrap();

    let loader = RegionFileLoader::new(dir.clone());
    assert_eq!(loader.list().unwrap(), [(-1, 0)]);
    assert!(loader.has_region(-1, 0));
    assert!(loader.region(7, 7).unwrap().is_none());

    let doc = loader.chunk(-1, 0).unwrap();
    assert_eq!(doc.root().get("Status").unwrap().to_string_lossy(), "full");

    assert!(matches!(
        loader.chunk(-2, 0),
        Err(redstone_nbt::Error::ChunkNotFound)
    ));
    assert!(matches!(
        loader.chunk(1000, 0),
        Err(redstone_nbt::Error::ChunkNotFound)
    ));

    let opts = ParseOpts::new().max_depth(0);
    assert!(matches!(
        loader.chunk_with_opts(-1, 0, opts),
        Err(redstone_nbt::Error::TooDeep(0))
    ));
    assert!(matches!(
        loader.chunk_with_opts(1000, 0, opts),
        Err(redstone_nbt::Error::ChunkNotFound)
    ));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn write_into_empty_region() {
    let mut r = Region::empty(Cursor::new(vec![])).unwrap();
    assert!(r.present_chunks().unwrap().is_empty());

    r.write_chunk(4, 9, &status_chunk()).unwrap();
    assert_eq!(r.present_chunks().unwrap(), [(4, 9)]);

    let raw = r.read_compressed_chunk(4, 9).unwrap().unwrap();
    assert_eq!(raw.compression, Compression::Zlib);
    assert_eq!(r.read_chunk(4, 9).unwrap().unwrap(), status_chunk());

    let bytes = r.into_inner().into_inner();
    assert_eq!(bytes.len() % SECTOR_SIZE, 0);

    let mut reopened = Region::from_stream(Cursor::new(bytes));
    let doc = Document::from_chunk(&mut reopened, 4, 9).unwrap();
    assert_eq!(doc.root().get("Status").unwrap().to_string_lossy(), "full");
}

#[test]
fn write_keeps_other_chunks() {
    let mut r = Builder::new()
        .chunk(0, 0, 3, &status_chunk())
        .chunk(1, 0, 3, &empty_compound())
        .build();

    r.write_compressed_chunk(2, 0, CompressionScheme::Uncompressed, &empty_compound())
        .unwrap();

    assert_eq!(
        r.location(2, 0).unwrap(),
        Some(ChunkLocation {
            offset: 4,
            sectors: 1
        })
    );
    assert_eq!(r.read_chunk(0, 0).unwrap().unwrap(), status_chunk());
    assert_eq!(r.read_chunk(1, 0).unwrap().unwrap(), empty_compound());
    assert_eq!(r.read_chunk(2, 0).unwrap().unwrap(), empty_compound());
}

#[test]
fn replacing_chunk_that_fits_stays_in_place() {
    let mut r = Builder::new()
        .chunk(0, 0, 3, &status_chunk())
        .chunk(1, 0, 3, &status_chunk())
        .build();

    r.write_compressed_chunk(0, 0, CompressionScheme::Uncompressed, &empty_compound())
        .unwrap();

    assert_eq!(r.location(0, 0).unwrap().unwrap().offset, 2);
    assert_eq!(r.read_chunk(0, 0).unwrap().unwrap(), empty_compound());
    assert_eq!(r.read_chunk(1, 0).unwrap().unwrap(), status_chunk());
}

#[test]
fn replacing_chunk_that_grows_moves_to_end() {
    let mut r = Builder::new()
        .chunk(0, 0, 3, &empty_compound())
        .chunk(1, 0, 3, &status_chunk())
        .build();

    let big = vec![7u8; 2 * SECTOR_SIZE];
    r.write_compressed_chunk(0, 0, CompressionScheme::Uncompressed, &big)
        .unwrap();

    assert_eq!(
        r.location(0, 0).unwrap(),
        Some(ChunkLocation {
            offset: 4,
            sectors: 3
        })
    );
    assert_eq!(r.read_chunk(0, 0).unwrap().unwrap(), big);
    assert_eq!(r.read_chunk(1, 0).unwrap().unwrap(), status_chunk());
}

#[test]
fn write_checks_coordinates_and_size() {
    let mut r = Builder::new().build();
    assert!(matches!(
        r.write_chunk(0, 32, &status_chunk()),
        Err(Error::InvalidOffset(0, 32))
    ));

    let huge = vec![0u8; 256 * SECTOR_SIZE];
    assert!(matches!(
        r.write_compressed_chunk(0, 0, CompressionScheme::Uncompressed, &huge),
        Err(Error::ChunkTooLarge)
    ));
    assert!(r.present_chunks().unwrap().is_empty());
}

#[test]
fn scheme_follows_compression() {
    for c in [Compression::Gzip, Compression::Zlib, Compression::Uncompressed] {
        assert_eq!(Compression::from(CompressionScheme::from(c)), c);
    }
}
