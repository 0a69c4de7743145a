use std::io::{self, Read, Seek, Write};

use log::info;
use redstone_anvil::{Region, REGION_WIDTH};
use redstone_nbt::{Compression, Document, Error, Tag, TagKind};

/// Write `doc` as an indented tree, one tag per line, in the style of
/// `Kind("name") = value`.
pub fn dump_tree(out: &mut dyn Write, doc: &Document) -> io::Result<()> {
    dump_tag(out, doc.name(), doc.root(), 0)
}

fn dump_tag(out: &mut dyn Write, name: &[u8], tag: &Tag, indent: usize) -> io::Result<()> {
    let name = String::from_utf8_lossy(name);
    let kind = tag.kind();

    match kind {
        TagKind::Compound => {
            let compound = tag.compound();
            writeln!(
                out,
                "{:indent$}{:?}({:?}) {} entries",
                "",
                kind,
                name,
                compound.len(),
                indent = indent
            )?;
            for (key, child) in compound.iter() {
                dump_tag(out, key, child, indent + 4)?;
            }
            Ok(())
        }
        TagKind::String => writeln!(
            out,
            "{:indent$}{:?}({:?}) = {:?}",
            "",
            kind,
            name,
            tag.to_string_lossy(),
            indent = indent
        ),
        kind if kind.is_integer() => writeln!(
            out,
            "{:indent$}{:?}({:?}) = {}",
            "",
            kind,
            name,
            tag.integer(),
            indent = indent
        ),
        _ => writeln!(out, "{:indent$}{:?}({:?})", "", kind, name, indent = indent),
    }
}

/// Parse a `X,Z` coordinate pair.
pub fn parse_coord(coord: &str) -> Option<(isize, isize)> {
    let mut s = coord.split(',');
    let x: isize = s.next()?.trim().parse().ok()?;
    let z: isize = s.next()?.trim().parse().ok()?;
    if s.next().is_some() {
        return None;
    }
    Some((x, z))
}

/// Check that `x`, `z` address a chunk inside a single region.
pub fn local_chunk(x: isize, z: isize) -> Option<(usize, usize)> {
    let width = REGION_WIDTH as isize;
    if (0..width).contains(&x) && (0..width).contains(&z) {
        Some((x as usize, z as usize))
    } else {
        None
    }
}

/// Write the decompressed data of the chunk at `x`, `z` to `out`.
pub fn extract_chunk<S>(
    region: &mut Region<S>,
    x: usize,
    z: usize,
    out: &mut dyn Write,
) -> redstone_nbt::Result<()>
where
    S: Read + Seek,
{
    let data = region
        .read_chunk(x, z)
        .map_err(io::Error::from)?
        .ok_or(Error::ChunkNotFound)?;

    out.write_all(&data)?;
    info!("extracted chunk {}, {}: {} bytes", x, z, data.len());
    Ok(())
}

/// Store `data` as the chunk at `x`, `z`, replacing whatever was there.
///
/// `data` has to parse as a document, so a bad file never ends up in the
/// region. Uncompressed data is stored zlib compressed, gzip or zlib data is
/// stored as given.
pub fn replace_chunk<S>(
    region: &mut Region<S>,
    x: usize,
    z: usize,
    data: &[u8],
) -> redstone_nbt::Result<()>
where
    S: Read + Write + Seek,
{
    let compression = Compression::detect(data);
    let doc = Document::parse(data, compression)?;

    let written = match compression {
        Compression::Uncompressed => region.write_chunk(x, z, data),
        c => region.write_compressed_chunk(x, z, c.into(), data),
    };
    written.map_err(io::Error::from)?;

    info!(
        "replaced chunk {}, {} with {:?} root, {} bytes {:?}",
        x,
        z,
        doc.root_kind(),
        data.len(),
        compression
    );
    Ok(())
}
