use std::ops::Range;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

/// A read position over an in-memory buffer. Every read is bounds checked and
/// fails with [`Error::Truncated`] if the value does not fit in what is left.
///
/// A failed read leaves the cursor where it was, but callers are expected to
/// abandon the parse rather than retry.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Number of bytes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn consume(&mut self, r: Range<usize>) -> Result<&'a [u8]> {
        if r.end <= self.data.len() {
            let ret = &self.data[r.start..r.end];
            self.data = &self.data[r.end..];
            Ok(ret)
        } else {
            Err(Error::Truncated)
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.consume(0..1)?[0])
    }

    pub fn read_u16be(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.consume(0..2)?))
    }

    pub fn read_u32be(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.consume(0..4)?))
    }

    pub fn read_u64be(&mut self) -> Result<u64> {
        Ok(BigEndian::read_u64(self.consume(0..8)?))
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_i16be(&mut self) -> Result<i16> {
        Ok(self.read_u16be()? as i16)
    }

    pub fn read_i32be(&mut self) -> Result<i32> {
        Ok(self.read_u32be()? as i32)
    }

    pub fn read_i64be(&mut self) -> Result<i64> {
        Ok(self.read_u64be()? as i64)
    }

    /// Read a u16 big-endian length followed by that many bytes. The bytes are
    /// returned as-is, no text decoding happens.
    pub fn read_length_prefixed_string(&mut self) -> Result<&'a [u8]> {
        // Peek the length so a short payload leaves the cursor untouched.
        let mut peek = self.clone();
        let len = peek.read_u16be()? as usize;
        let s = peek.consume(0..len)?;
        *self = peek;
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_big_endian() -> Result<()> {
        let data = [0x01, 0x02, 0x00, 0x00, 0x00, 0x03, 0xff];
        let mut c = Cursor::new(&data);
        assert_eq!(c.read_u16be()?, 0x0102);
        assert_eq!(c.read_u32be()?, 3);
        assert_eq!(c.read_i8()?, -1);
        assert!(c.is_empty());
        Ok(())
    }

    #[test]
    fn u64_reads_all_eight_bytes() -> Result<()> {
        let data = 0x0102030405060708u64.to_be_bytes();
        let mut c = Cursor::new(&data);
        assert_eq!(c.read_u64be()?, 0x0102030405060708);
        Ok(())
    }

    #[test]
    fn signed_reads_reinterpret() -> Result<()> {
        let data = [0xff, 0xfe, 0x80, 0x00, 0x00, 0x00];
        let mut c = Cursor::new(&data);
        assert_eq!(c.read_i16be()?, -2);
        assert_eq!(c.read_i32be()?, i32::MIN);
        Ok(())
    }

    #[test]
    fn short_read_fails_and_does_not_advance() {
        let data = [0x00, 0x01, 0x02];
        let mut c = Cursor::new(&data);
        assert!(matches!(c.read_u32be(), Err(Error::Truncated)));
        assert_eq!(c.remaining(), 3);
    }

    #[test]
    fn string_reads_raw_bytes() -> Result<()> {
        let data = [0x00, 0x03, b'a', 0xff, b'c', 0x42];
        let mut c = Cursor::new(&data);
        assert_eq!(c.read_length_prefixed_string()?, &[b'a', 0xff, b'c']);
        assert_eq!(c.remaining(), 1);
        Ok(())
    }

    #[test]
    fn string_missing_prefix_is_truncated() {
        let mut c = Cursor::new(&[0x00]);
        assert!(matches!(
            c.read_length_prefixed_string(),
            Err(Error::Truncated)
        ));
    }

    #[test]
    fn string_short_payload_is_truncated() {
        let data = [0x00, 0x05, b'a', b'b'];
        let mut c = Cursor::new(&data);
        assert!(matches!(
            c.read_length_prefixed_string(),
            Err(Error::Truncated)
        ));
        assert_eq!(c.remaining(), 4);
    }

    #[test]
    fn empty_string() -> Result<()> {
        let mut c = Cursor::new(&[0x00, 0x00]);
        assert_eq!(c.read_length_prefixed_string()?, b"");
        assert!(c.is_empty());
        Ok(())
    }
}
