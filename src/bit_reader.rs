//! Bit-level cursor over an immutable SCTE-35 byte buffer.
//!
//! SCTE-35 packs fields at arbitrary bit widths (single flags, 12-bit
//! lengths, 33-bit timestamps), always most significant bit first. The
//! [`BitCursor`] reads them directly so no caller ever shifts or masks bytes.

use crate::error::{DecodeError, DecodeResult};

/// A forward-only reader that extracts values at the bit level.
///
/// The cursor never mutates its buffer and never moves backwards. A failed
/// read leaves the offset untouched.
#[derive(Debug, Clone)]
pub struct BitCursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> BitCursor<'a> {
    /// Creates a cursor positioned at bit 0 of `buffer`.
    pub fn new(buffer: &'a [u8]) -> Self {
        BitCursor { buffer, offset: 0 }
    }

    /// Reads `num_bits` (at most 64) as an unsigned integer, right-aligned.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::FieldTooWide`] if `num_bits` exceeds 64 and
    /// [`DecodeError::OutOfBits`] if fewer than `num_bits` bits remain.
    pub fn read_bits(&mut self, num_bits: usize) -> DecodeResult<u64> {
        if num_bits > 64 {
            return Err(DecodeError::FieldTooWide { bits: num_bits });
        }
        self.ensure(num_bits)?;

        let mut value: u64 = 0;
        let mut bits_read = 0;

        while bits_read < num_bits {
            let byte = self.buffer[self.offset / 8];
            let bit_offset = self.offset % 8;
            let take = (num_bits - bits_read).min(8 - bit_offset);
            let mask = if take >= 8 { 0xFF } else { (1u8 << take) - 1 };
            let bits = (byte >> (8 - bit_offset - take)) & mask;

            value = (value << take) | u64::from(bits);
            self.offset += take;
            bits_read += take;
        }

        Ok(value)
    }

    /// Reads a single bit as a flag.
    pub fn read_bool(&mut self) -> DecodeResult<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Reads an 8-bit field.
    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Reads a 16-bit field.
    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        Ok(self.read_bits(16)? as u16)
    }

    /// Reads a 32-bit field.
    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        Ok(self.read_bits(32)? as u32)
    }

    /// Advances past `num_bits` reserved bits.
    pub fn skip_bits(&mut self, num_bits: usize) -> DecodeResult<()> {
        self.ensure(num_bits)?;
        self.offset += num_bits;
        Ok(())
    }

    /// Returns the next `num_bits` as a borrowed byte range.
    ///
    /// Both the current offset and `num_bits` must sit on byte boundaries.
    pub fn read_bytes(&mut self, num_bits: usize) -> DecodeResult<&'a [u8]> {
        if !self.offset.is_multiple_of(8) || !num_bits.is_multiple_of(8) {
            return Err(DecodeError::UnalignedRange {
                offset: self.offset,
                bits: num_bits,
            });
        }
        self.ensure(num_bits)?;

        let start = self.offset / 8;
        let end = start + num_bits / 8;
        self.offset += num_bits;
        Ok(&self.buffer[start..end])
    }

    /// Consumes everything that is left as a byte range.
    pub fn read_remaining_bytes(&mut self) -> DecodeResult<&'a [u8]> {
        self.read_bytes(self.remaining())
    }

    /// Current position, in bits from the start of the buffer.
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Bits left to read.
    pub fn remaining(&self) -> usize {
        self.bit_len() - self.offset
    }

    /// Total length of the underlying buffer in bits.
    pub fn bit_len(&self) -> usize {
        self.buffer.len() * 8
    }

    /// Unread part of the buffer starting at the current byte.
    ///
    /// Used to hand nested decoders a view that begins where this cursor is.
    pub fn rest(&self) -> &'a [u8] {
        &self.buffer[(self.offset / 8).min(self.buffer.len())..]
    }

    fn ensure(&self, num_bits: usize) -> DecodeResult<()> {
        let remaining = self.remaining();
        if num_bits > remaining {
            return Err(DecodeError::OutOfBits {
                requested: num_bits,
                remaining,
                offset: self.offset,
            });
        }
        Ok(())
    }
}
