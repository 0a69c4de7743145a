use std::io;
use std::path::Path;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::input::Cursor;
use crate::parse::{consume_kind, parse_tag};
use crate::{decompress, Compression, ParseOpts, Tag, TagKind};

/// The smallest input that can hold a kind byte and a name length.
const MIN_DOCUMENT_LEN: usize = 4;

/// A complete NBT document: a single root tag and the root's name.
///
/// The name is stored outside the tag because NBT names belong to the
/// position a tag is stored at, not the tag itself. For most files the root
/// is a compound and the name is empty.
///
/// ```
/// use redstone_nbt::{Compression, Document, TagKind};
///
/// let doc = Document::parse(&[0x0a, 0x00, 0x00, 0x00], Compression::Uncompressed).unwrap();
/// assert_eq!(doc.name(), b"");
/// assert_eq!(doc.root_kind(), TagKind::Compound);
/// assert!(doc.root().compound().is_empty());
/// ```
#[derive(Debug, PartialEq)]
pub struct Document {
    root_kind: TagKind,
    name: Vec<u8>,
    root: Tag,
}

/// Compressed data of one chunk, as stored by a region file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    pub data: Vec<u8>,
    pub compression: Compression,
}

/// Something that can hand out the raw data of chunks by their coordinates
/// within a region, such as an Anvil region file.
pub trait ChunkSource {
    /// The chunk at `x`, `z`, or `None` if the chunk has not been generated.
    fn chunk(&mut self, x: usize, z: usize) -> io::Result<Option<RawChunk>>;
}

impl Document {
    /// Build a document around an existing tree.
    pub fn new(name: impl AsRef<[u8]>, root: Tag) -> Self {
        Self {
            root_kind: root.kind(),
            name: name.as_ref().to_vec(),
            root,
        }
    }

    /// Load a document from a file. The compression is detected from the
    /// start of the file, so gzipped, zlibbed and plain NBT all work.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_opts(path, ParseOpts::default())
    }

    pub fn open_with_opts(path: impl AsRef<Path>, opts: ParseOpts) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        if data.is_empty() {
            return Err(Error::EmptyFile);
        }

        let compression = Compression::detect(&data);
        debug!("loading {} as {:?}", path.display(), compression);

        Self::parse_with_opts(&data, compression, opts).map_err(|e| {
            warn!("could not parse {}: {}", path.display(), e);
            e
        })
    }

    /// Load the chunk at `x`, `z` from `source`. Missing or empty chunks are
    /// [`Error::ChunkNotFound`].
    pub fn from_chunk<S>(source: &mut S, x: usize, z: usize) -> Result<Self>
    where
        S: ChunkSource + ?Sized,
    {
        Self::from_chunk_with_opts(source, x, z, ParseOpts::default())
    }

    pub fn from_chunk_with_opts<S>(
        source: &mut S,
        x: usize,
        z: usize,
        opts: ParseOpts,
    ) -> Result<Self>
    where
        S: ChunkSource + ?Sized,
    {
        let chunk = match source.chunk(x, z)? {
            Some(chunk) if !chunk.data.is_empty() => chunk,
            _ => return Err(Error::ChunkNotFound),
        };

        debug!(
            "loading chunk {}, {}: {} bytes {:?}",
            x,
            z,
            chunk.data.len(),
            chunk.compression
        );

        Self::parse_with_opts(&chunk.data, chunk.compression, opts).map_err(|e| {
            warn!("could not parse chunk {}, {}: {}", x, z, e);
            e
        })
    }

    /// Parse a document from `data`, decompressing it first.
    ///
    /// The root tag must use up the input exactly. Left over bytes fail with
    /// [`Error::TrailingData`].
    pub fn parse(data: &[u8], compression: Compression) -> Result<Self> {
        Self::parse_with_opts(data, compression, ParseOpts::default())
    }

    pub fn parse_with_opts(data: &[u8], compression: Compression, opts: ParseOpts) -> Result<Self> {
        let data = decompress(compression, data)?;
        if data.len() < MIN_DOCUMENT_LEN {
            return Err(Error::Truncated);
        }

        let mut input = Cursor::new(&data);
        let root_kind = consume_kind(&mut input)?;
        let name = input.read_length_prefixed_string()?.to_vec();
        let root = parse_tag(root_kind, &mut input, &opts)?;

        if !input.is_empty() {
            return Err(Error::TrailingData(input.remaining()));
        }

        debug!(
            "parsed {:?} root {:?} from {} bytes",
            root_kind,
            String::from_utf8_lossy(&name),
            data.len()
        );

        Ok(Self {
            root_kind,
            name,
            root,
        })
    }

    /// The name of the root tag. Usually empty.
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn set_name(&mut self, name: impl AsRef<[u8]>) {
        self.name = name.as_ref().to_vec();
    }

    pub fn root(&self) -> &Tag {
        &self.root
    }

    /// Replace the root tag. The previous root is released, and the root kind
    /// follows the new tag.
    pub fn set_root(&mut self, root: Tag) {
        self.root_kind = root.kind();
        self.root = root;
    }

    /// The kind the root was declared with.
    pub fn root_kind(&self) -> TagKind {
        self.root_kind
    }

    /// Take the root tag out of the document.
    pub fn into_root(self) -> Tag {
        self.root
    }
}
