//! Error types returned by the decoder.
//!
//! Every structural inconsistency aborts the whole decode. Variants carry the
//! declared and measured sizes (in bits unless stated otherwise) so a
//! malformed message can be diagnosed without parsing it again.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Reasons a `splice_info_section` (or one of its parts) failed to decode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The cursor ran out of input before a field could be read.
    #[error("out of bits: requested {requested} bit(s) at offset {offset}, {remaining} remaining")]
    OutOfBits {
        requested: usize,
        remaining: usize,
        offset: usize,
    },

    /// A single read asked for more bits than fit in a `u64`.
    #[error("cannot read {bits} bits as one field, at most 64 are supported")]
    FieldTooWide { bits: usize },

    /// The command type byte is not one this decoder knows.
    #[error("unsupported splice command type 0x{0:02x}")]
    UnsupportedCommandType(u8),

    /// The command payload did not consume exactly `splice_command_length` bytes.
    #[error("splice command length mismatch: declared {declared} bits, decoded {actual} bits")]
    CommandLengthMismatch { declared: usize, actual: usize },

    /// The typed descriptor payload ran past the descriptor's declared length.
    #[error(
        "descriptor 0x{tag:02x} length mismatch: declared payload of {declared} bits, payload used {used_by_payload} bits"
    )]
    DescriptorLengthMismatch {
        tag: u8,
        declared: usize,
        used_by_payload: usize,
    },

    /// The descriptor length (in bytes) is too small to hold the 32-bit identifier.
    #[error("descriptor 0x{tag:02x} length {declared} is shorter than its 4-byte identifier")]
    DescriptorLengthUnderflow { tag: u8, declared: u8 },

    /// Descriptors do not add up to `descriptor_loop_length`.
    #[error("descriptor loop overrun: declared {declared} bits, descriptors use {actual} bits")]
    DescriptorLoopOverrun { declared: usize, actual: usize },

    /// Not enough input left for the CRC field(s).
    #[error("insufficient trailer bits: need at least {required}, {remaining} remaining")]
    InsufficientTrailerBits { required: usize, remaining: usize },

    /// Alignment stuffing is not a whole number of bytes.
    #[error("alignment stuffing of {stuffing_bits} bits is not byte aligned")]
    MisalignedStuffing { stuffing_bits: usize },

    /// Decoding finished without consuming the whole input.
    #[error("trailing data mismatch: consumed {consumed} of {total} bits")]
    TrailingDataMismatch { consumed: usize, total: usize },

    /// An opaque byte range was requested at a position that is not byte aligned.
    #[error("byte range of {bits} bits requested at unaligned offset {offset}")]
    UnalignedRange { offset: usize, bits: usize },

    /// The stored CRC_32 does not match the bytes that precede it.
    #[error("CRC-32 mismatch: stored 0x{stored:08x}, computed 0x{computed:08x}")]
    CrcMismatch { stored: u32, computed: u32 },

    /// A textual payload (hex or base64) could not be turned into bytes.
    #[error("invalid {encoding} payload: {reason}")]
    InvalidEncoding {
        encoding: &'static str,
        reason: String,
    },

    /// A value tree handed in from a text document is missing or mistypes a field.
    #[error("malformed splice_info_section tree: {0}")]
    MalformedTree(String),

    /// A reconstructed value tree holds a field that cannot appear on the wire.
    #[error("invalid {field}: {reason}")]
    InvalidTree {
        field: &'static str,
        reason: &'static str,
    },
}
