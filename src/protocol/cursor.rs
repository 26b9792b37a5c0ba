//! Bounds-checked readers and writers for MT payloads
//!
//! All multi-byte integers on the MT wire are little-endian.

use bytes::{BufMut, Bytes, BytesMut};

use super::{Error, Result};

/// Cursor over a received payload that fails closed on over-read.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    /// Start reading at the beginning of `data`.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Whether every byte has been consumed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `len` bytes.
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(Error::UnexpectedEnd {
                needed: len,
                remaining,
            });
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.data[start..self.offset])
    }

    /// Take everything that is left.
    pub fn rest(&mut self) -> &'a [u8] {
        let start = self.offset;
        self.offset = self.data.len();
        &self.data[start..]
    }

    /// Read a fixed-size array.
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    /// Read one byte.
    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    /// Read one byte as a boolean (any non-zero value is true).
    pub fn bool(&mut self) -> Result<bool> {
        Ok(self.u8()? != 0)
    }

    /// Read a little-endian `u16`.
    pub fn u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    /// Read a little-endian `u32`.
    pub fn u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }
}

/// Growable payload builder.
#[derive(Debug, Default)]
pub struct Writer {
    buf: BytesMut,
}

impl Writer {
    /// Create a writer sized for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Append one byte.
    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.put_u8(value);
        self
    }

    /// Append a boolean as `0` or `1`.
    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.u8(u8::from(value))
    }

    /// Append a little-endian `u16`.
    pub fn u16_le(&mut self, value: u16) -> &mut Self {
        self.buf.put_u16_le(value);
        self
    }

    /// Append a little-endian `u32`.
    pub fn u32_le(&mut self, value: u32) -> &mut Self {
        self.buf.put_u32_le(value);
        self
    }

    /// Append raw bytes.
    pub fn bytes(&mut self, value: &[u8]) -> &mut Self {
        self.buf.put_slice(value);
        self
    }

    /// Bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Freeze into an immutable payload.
    #[must_use]
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_little_endian() {
        let data = [0x01, 0xEF, 0xBE, 0x78, 0x56, 0x34, 0x12];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u8().unwrap(), 0x01);
        assert_eq!(reader.u16_le().unwrap(), 0xBEEF);
        assert_eq!(reader.u32_le().unwrap(), 0x1234_5678);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_reader_fails_closed() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = Reader::new(&data);
        reader.u8().unwrap();
        let err = reader.u32_le().unwrap_err();
        assert_eq!(
            err,
            Error::UnexpectedEnd {
                needed: 4,
                remaining: 2
            }
        );
        // A failed read consumes nothing.
        assert_eq!(reader.remaining(), 2);
        assert_eq!(reader.u16_le().unwrap(), 0x0302);
    }

    #[test]
    fn test_reader_rest() {
        let data = [9, 8, 7, 6];
        let mut reader = Reader::new(&data);
        reader.u8().unwrap();
        assert_eq!(reader.rest(), &[8, 7, 6]);
        assert_eq!(reader.rest(), &[] as &[u8]);
    }

    #[test]
    fn test_writer_layout() {
        let mut writer = Writer::with_capacity(8);
        writer.u8(0xAA).u16_le(0xBEEF).u32_le(1).bool(true);
        assert_eq!(
            writer.finish().as_ref(),
            &[0xAA, 0xEF, 0xBE, 0x01, 0x00, 0x00, 0x00, 0x01]
        );
    }
}
