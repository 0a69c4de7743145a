use crate::error::{Error, Result};
use crate::input::Cursor;
use crate::tag::Payload;
use crate::{Compound, Tag, TagKind};

/// Options for customising parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOpts {
    pub(crate) max_depth: usize,
}

impl ParseOpts {
    pub fn new() -> Self {
        Default::default()
    }

    /// Maximum number of compounds that may be nested inside each other,
    /// counting the root. Deeper input fails with [`Error::TooDeep`] instead
    /// of exhausting the stack. Default is 512.
    pub fn max_depth(mut self, value: usize) -> Self {
        self.max_depth = value;
        self
    }
}

impl Default for ParseOpts {
    fn default() -> Self {
        Self { max_depth: 512 }
    }
}

/// Parse the payload of a tag of the given kind from `input`. The kind byte
/// and name are expected to have been consumed already.
///
/// Compounds are parsed until their End tag. Running out of input before the
/// End tag is an error rather than an implicit end.
pub fn parse_tag(kind: TagKind, input: &mut Cursor<'_>, opts: &ParseOpts) -> Result<Tag> {
    Parser { input, opts }.tag(kind, 0).map(Tag::from_payload)
}

struct Parser<'a, 'b> {
    input: &'a mut Cursor<'b>,
    opts: &'a ParseOpts,
}

impl Parser<'_, '_> {
    fn tag(&mut self, kind: TagKind, depth: usize) -> Result<Payload> {
        Ok(match kind {
            TagKind::Byte => Payload::Byte(self.input.read_i8()?),
            TagKind::Short => Payload::Short(self.input.read_i16be()?),
            TagKind::Int => Payload::Int(self.input.read_i32be()?),
            TagKind::Long => Payload::Long(self.input.read_i64be()?),
            TagKind::String => Payload::String(self.input.read_length_prefixed_string()?.to_vec()),
            TagKind::Compound => Payload::Compound(self.compound(depth + 1)?),
            _ => return Err(Error::UnsupportedTag(kind.into())),
        })
    }

    fn compound(&mut self, depth: usize) -> Result<Compound> {
        if depth > self.opts.max_depth {
            return Err(Error::TooDeep(self.opts.max_depth));
        }

        // Children are dropped along with `compound` if anything below fails.
        let mut compound = Compound::new();
        loop {
            let kind = consume_kind(self.input)?;
            if kind == TagKind::End {
                return Ok(compound);
            }

            let key = self.input.read_length_prefixed_string()?;
            let value = self.tag(kind, depth)?;
            compound.set(key, Tag::from_payload(value));
        }
    }
}

/// Read a kind byte. Bytes outside the known kinds are reported as
/// unsupported, the same as known kinds this parser can not decode.
pub(crate) fn consume_kind(input: &mut Cursor<'_>) -> Result<TagKind> {
    let b = input.read_u8()?;
    TagKind::try_from(b).map_err(|_| Error::UnsupportedTag(b))
}
