//! Byte-level read/write primitives.
//!
//! [`ByteCursor`] appends to a growable buffer; [`ByteReader`] walks a
//! borrowed slice and reports short reads as [`DecodeError::UnexpectedEof`]
//! instead of panicking. Multi-byte numbers are little-endian except the
//! 24-bit integer and the 16-bit big-endian count used by arrays.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::DecodeError;

// ---------------------------------------------------------------------------
// ByteCursor
// ---------------------------------------------------------------------------

/// Append-only write buffer.
#[derive(Debug, Default, Clone)]
pub struct ByteCursor {
    buf: Vec<u8>,
}

impl ByteCursor {
    /// Creates an empty cursor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cursor with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Current write offset (bytes written so far).
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Copies the written prefix into an exactly-sized buffer.
    ///
    /// The cursor's own allocation (which may have grown past the written
    /// length) is dropped with it.
    pub fn into_trimmed(self) -> Vec<u8> {
        self.buf.as_slice().to_vec()
    }

    /// Drops everything written after `len`.
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a 16-bit count high byte first.
    pub fn write_u16_be(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes the low 24 bits of `value`, high byte first.
    pub fn write_u24(&mut self, value: u32) {
        let mut raw = [0u8; 3];
        BigEndian::write_u24(&mut raw, value & 0xFF_FFFF);
        self.buf.extend_from_slice(&raw);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes `bytes` into a field of exactly `width` bytes.
    ///
    /// Short input is zero-padded; long input is cut at `width`.
    pub fn write_padded(&mut self, bytes: &[u8], width: usize) {
        let take = bytes.len().min(width);
        self.buf.extend_from_slice(&bytes[..take]);
        self.buf.resize(self.buf.len() + (width - take), 0);
    }
}

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// Bounds-checked reader over a borrowed slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at `offset`.
    pub fn at(buf: &'a [u8], offset: usize) -> Self {
        Self { buf, pos: offset }
    }

    pub fn new(buf: &'a [u8]) -> Self {
        Self::at(buf, 0)
    }

    /// Current read offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the current offset.
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.pos > self.buf.len() || self.remaining() < len {
            return Err(DecodeError::UnexpectedEof {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..self.pos])
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        Ok(self.read_bytes(1)?[0] as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        self.read_bytes(2).map(LittleEndian::read_u16)
    }

    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        self.read_bytes(2).map(LittleEndian::read_i16)
    }

    pub fn read_u16_be(&mut self) -> Result<u16, DecodeError> {
        self.read_bytes(2).map(BigEndian::read_u16)
    }

    pub fn read_u24(&mut self) -> Result<u32, DecodeError> {
        self.read_bytes(3).map(BigEndian::read_u24)
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.read_bytes(4).map(LittleEndian::read_u32)
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        self.read_bytes(4).map(LittleEndian::read_i32)
    }

    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        self.read_bytes(4).map(LittleEndian::read_f32)
    }

    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        self.read_bytes(8).map(LittleEndian::read_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u24_is_big_endian() {
        let mut cursor = ByteCursor::new();
        cursor.write_u24(0x0A0B0C);
        assert_eq!(cursor.as_slice(), &[0x0A, 0x0B, 0x0C]);

        let mut reader = ByteReader::new(cursor.as_slice());
        assert_eq!(reader.read_u24().unwrap(), 0x0A0B0C);
    }

    #[test]
    fn test_u24_keeps_low_bits_only() {
        let mut cursor = ByteCursor::new();
        cursor.write_u24(0xFF01_0203);
        assert_eq!(cursor.as_slice(), &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_u16_byte_orders() {
        let mut cursor = ByteCursor::new();
        cursor.write_u16(0x0102);
        cursor.write_u16_be(0x0102);
        assert_eq!(cursor.as_slice(), &[0x02, 0x01, 0x01, 0x02]);
    }

    #[test]
    fn test_write_padded_pads_and_truncates() {
        let mut cursor = ByteCursor::new();
        cursor.write_padded(b"ab", 4);
        cursor.write_padded(b"abcdef", 4);
        assert_eq!(cursor.as_slice(), b"ab\0\0abcd");
    }

    #[test]
    fn test_reader_reports_short_read() {
        let bytes = [1u8, 2, 3];
        let mut reader = ByteReader::at(&bytes, 2);
        let err = reader.read_u16().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnexpectedEof {
                offset: 2,
                needed: 2,
                available: 1
            }
        ));
        // A failed read doesn't advance.
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_reader_offset_past_end_has_nothing_remaining() {
        let bytes = [0u8; 2];
        let reader = ByteReader::at(&bytes, 10);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_into_trimmed_is_exact() {
        let mut cursor = ByteCursor::with_capacity(4096);
        cursor.write_i32(-5);
        let bytes = cursor.into_trimmed();
        assert_eq!(bytes, (-5i32).to_le_bytes());
    }
}
