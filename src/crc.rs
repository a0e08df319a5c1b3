//! CRC-32/MPEG-2 checks for `splice_info_section` messages.
//!
//! The decoder records `CRC_32` as read. These helpers let callers (or a
//! [`Decoder`](crate::Decoder) with `verify_crc` enabled) check it against
//! the bytes it covers.

#[cfg(feature = "crc-validation")]
use crc::{Crc, CRC_32_MPEG_2};

#[cfg(feature = "crc-validation")]
use crate::error::{DecodeError, DecodeResult};

/// MPEG-2 CRC-32 algorithm used by SCTE-35.
#[cfg(feature = "crc-validation")]
pub const MPEG_2: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// Computes the CRC-32/MPEG-2 of `data`.
///
/// Returns `None` when the `crc-validation` feature is disabled.
#[cfg(feature = "crc-validation")]
pub fn calculate_crc(data: &[u8]) -> Option<u32> {
    Some(MPEG_2.checksum(data))
}

#[cfg(not(feature = "crc-validation"))]
pub fn calculate_crc(_data: &[u8]) -> Option<u32> {
    None
}

/// Whether `expected` is the CRC-32/MPEG-2 of `data`.
///
/// Always `false` when the `crc-validation` feature is disabled.
pub fn validate_crc(data: &[u8], expected: u32) -> bool {
    calculate_crc(data) == Some(expected)
}

/// Checks the trailing 4-byte `CRC_32` of a complete section.
///
/// ```rust
/// use scte35_decoder::crc::validate_message_crc;
/// use data_encoding::BASE64;
///
/// let buffer = BASE64.decode(b"/DAWAAAAAAAAAP/wBQb+Qjo1vQAAuwxz9A==").unwrap();
/// assert!(validate_message_crc(&buffer).is_ok());
/// ```
///
/// # Errors
///
/// [`DecodeError::InsufficientTrailerBits`] when the buffer cannot hold a CRC,
/// and [`DecodeError::CrcMismatch`] when the stored value is wrong.
#[cfg(feature = "crc-validation")]
pub fn validate_message_crc(buffer: &[u8]) -> DecodeResult<()> {
    let Some(split) = buffer.len().checked_sub(4) else {
        return Err(DecodeError::InsufficientTrailerBits {
            required: 32,
            remaining: buffer.len() * 8,
        });
    };
    let (data, crc_bytes) = buffer.split_at(split);
    let stored = u32::from_be_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
    let computed = MPEG_2.checksum(data);
    if stored != computed {
        return Err(DecodeError::CrcMismatch { stored, computed });
    }
    Ok(())
}
