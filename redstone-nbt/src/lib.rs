//! redstone-nbt parses NBT data from *Minecraft: Java Edition* into a tree of
//! shared, mutable tags. This format is used by the game to store world
//! chunks, entities and level metadata.
//!
//! * For loading whole documents see [`Document`].
//! * For the tag tree itself see [`Tag`] and [`Compound`].
//! * For the compression schemes NBT is usually wrapped in see
//!   [`Compression`].
//!
//! The parser understands the integer tags, strings and compounds. Other tag
//! kinds (floats, lists and arrays) are recognised but rejected as
//! unsupported.
//!
//! # Quick example
//!
//! ```no_run
//! use redstone_nbt::{Document, Result};
//!
//! fn main() -> Result<()> {
//!     let doc = Document::open("world/level.dat")?;
//!     let data = doc.root().get("Data").expect("level.dat has a Data compound");
//!
//!     if let Some(version) = data.get("DataVersion") {
//!         println!("data version: {}", version.integer());
//!     }
//!
//!     for (key, value) in data.compound().iter() {
//!         println!("{} = {:?}", String::from_utf8_lossy(key), value);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Ownership
//!
//! A [`Tag`] is a reference-counted handle. Cloning it shares the node,
//! dropping the last handle frees the node and, for compounds, every child
//! that is not referenced elsewhere. Handles are not `Send`, so a tree stays on
//! the thread that parsed it.

use serde::Serialize;

pub mod error;

mod compound;
mod compression;
mod document;
mod input;
mod parse;
mod ser;
mod tag;

pub use compound::*;
pub use compression::*;
pub use document::*;
pub use error::{Error, Result};
pub use input::Cursor;
pub use parse::*;
pub use tag::*;

#[cfg(test)]
mod test;

/// An NBT tag kind as found on the wire. This does not carry the value or the
/// name of the data.
#[derive(Serialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[repr(u8)]
pub enum TagKind {
    /// Represents the end of a Compound object.
    End = 0,
    /// Equivalent to i8.
    Byte = 1,
    /// Equivalent to i16.
    Short = 2,
    /// Equivalent to i32.
    Int = 3,
    /// Equivalent to i64
    Long = 4,
    /// Equivalent to f32. Unsupported.
    Float = 5,
    /// Equivalent to f64. Unsupported.
    Double = 6,
    /// Array of Byte (i8). Unsupported.
    ByteArray = 7,
    /// A length-prefixed string.
    String = 8,
    /// List of other objects. Unsupported.
    List = 9,
    /// Represents a struct-like structure.
    Compound = 10,
    /// Array of Int (i32). Unsupported.
    IntArray = 11,
    /// Array of Long (i64). Unsupported.
    LongArray = 12,
}

impl TagKind {
    /// Whether tags of this kind can be created and parsed.
    pub fn is_supported(self) -> bool {
        matches!(
            self,
            TagKind::End
                | TagKind::Byte
                | TagKind::Short
                | TagKind::Int
                | TagKind::Long
                | TagKind::String
                | TagKind::Compound
        )
    }

    /// Whether this kind carries an integer payload.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TagKind::Byte | TagKind::Short | TagKind::Int | TagKind::Long
        )
    }
}

// The kinds will very rarely change, so writing the conversions out by hand
// saves pulling in a derive crate.
impl TryFrom<u8> for TagKind {
    type Error = ();

    fn try_from(value: u8) -> std::result::Result<Self, ()> {
        use TagKind::*;
        Ok(match value {
            0 => End,
            1 => Byte,
            2 => Short,
            3 => Int,
            4 => Long,
            5 => Float,
            6 => Double,
            7 => ByteArray,
            8 => String,
            9 => List,
            10 => Compound,
            11 => IntArray,
            12 => LongArray,
            13..=u8::MAX => return Err(()),
        })
    }
}

impl From<TagKind> for u8 {
    fn from(kind: TagKind) -> Self {
        kind as u8
    }
}
