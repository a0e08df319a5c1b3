//! Traits shared by the wire structures.

use crate::bit_reader::BitCursor;
use crate::error::{DecodeError, DecodeResult};

/// Types decoded field-by-field from a [`BitCursor`] without outside context.
pub trait Decodable: Sized {
    /// Decodes the structure starting at the cursor's current position.
    fn decode(cursor: &mut BitCursor<'_>) -> DecodeResult<Self>;

    /// Decodes from the start of `buffer`, returning the value and the number
    /// of bits it occupied.
    fn decode_bytes(buffer: &[u8]) -> DecodeResult<(Self, usize)> {
        let mut cursor = BitCursor::new(buffer);
        let value = Self::decode(&mut cursor)?;
        Ok((value, cursor.position()))
    }
}

/// Wire size of a decoded structure, used to check reconstructed trees.
pub trait WireSize {
    /// Number of bits the structure occupies on the wire.
    fn bit_len(&self) -> usize;

    /// Checks that every field fits its wire width.
    fn validate(&self) -> DecodeResult<()> {
        Ok(())
    }
}

/// Fails with [`DecodeError::InvalidTree`] when `value` needs more than `bits` bits.
pub(crate) fn check_width(field: &'static str, value: u64, bits: u32) -> DecodeResult<()> {
    if bits < 64 && value >> bits != 0 {
        return Err(DecodeError::InvalidTree {
            field,
            reason: "value does not fit its wire width",
        });
    }
    Ok(())
}

/// Fails when a counted list has more entries than its count field can express.
pub(crate) fn check_count(field: &'static str, len: usize, bits: u32) -> DecodeResult<()> {
    check_width(field, len as u64, bits)
}
