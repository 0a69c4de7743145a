//! Contains the Error and Result type used when loading NBT.
//!
//! Misuse of the tag tree, such as reading an integer out of a string tag, is
//! not an [`Error`]. Those are programming errors and panic.

/// Various errors that can occur while loading a document.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The input ran out part way through a value.
    Truncated,
    /// A tag kind byte that this parser cannot decode. Contains the byte.
    UnsupportedTag(u8),
    /// The root tag was complete but bytes were left over. Contains the
    /// number of left over bytes.
    TrailingData(usize),
    /// Compounds were nested deeper than the configured limit. Contains the
    /// limit.
    TooDeep(usize),
    /// The compressed input could not be inflated, or inflated to nothing.
    Decompression(String),
    /// The file to load was empty.
    EmptyFile,
    /// The chunk source had no data for the requested chunk.
    ChunkNotFound,
    IO(std::io::Error),
}

/// Convenience type for Result.
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IO(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Truncated => f.write_str("eof: unexpectedly ran out of input"),
            Error::UnsupportedTag(tag) => {
                f.write_fmt(format_args!("unsupported nbt tag value: {}", tag))
            }
            Error::TrailingData(n) => {
                f.write_fmt(format_args!("{} bytes left over after root tag", n))
            }
            Error::TooDeep(limit) => {
                f.write_fmt(format_args!("compounds nested deeper than {}", limit))
            }
            Error::Decompression(msg) => f.write_fmt(format_args!("decompression: {}", msg)),
            Error::EmptyFile => f.write_str("file is empty"),
            Error::ChunkNotFound => f.write_str("chunk not found"),
            Error::IO(e) => f.write_fmt(format_args!("io error: {}", e)),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IO(e) => Some(e),
            _ => None,
        }
    }
}
