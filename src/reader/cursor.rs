//! Forward-only read cursor over an in-memory Avro body.

use super::varint;
use crate::error::DecodeError;

/// A byte buffer plus the offset of the next unread byte.
///
/// The offset only moves forward. Reads that fail leave it where it was, so
/// a failed decode never reports a half-consumed value.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of `buffer`.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The unread tail of the buffer.
    pub fn remaining(&self) -> &'a [u8] {
        &self.buffer[self.offset..]
    }

    /// Number of unread bytes.
    pub fn remaining_len(&self) -> usize {
        self.buffer.len() - self.offset
    }

    /// True once every byte has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.offset == self.buffer.len()
    }

    /// Decode a zigzag varint, returning the value and the bytes consumed.
    pub fn read_zigzag(&mut self) -> Result<(i64, usize), DecodeError> {
        let mut rest = self.remaining();
        let (value, consumed) = varint::decode_zigzag(&mut rest)?;
        self.offset += consumed;
        Ok((value, consumed))
    }

    /// Decode an Avro `long`.
    #[inline]
    pub fn read_long(&mut self) -> Result<i64, DecodeError> {
        self.read_zigzag().map(|(value, _)| value)
    }

    /// Decode an Avro `int`: the low 32 bits of the 64-bit decode.
    #[inline]
    pub fn read_int(&mut self) -> Result<i32, DecodeError> {
        self.read_long().map(|value| value as i32)
    }

    /// Consume a single byte.
    pub fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let byte = *self
            .buffer
            .get(self.offset)
            .ok_or(DecodeError::TruncatedInput)?;
        self.offset += 1;
        Ok(byte)
    }

    /// Consume exactly `len` bytes.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining_len() < len {
            return Err(DecodeError::TruncatedInput);
        }
        let bytes = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }
}
