//! # SCTE-35 splice_info_section decoder
//!
//! Decodes SCTE-35 cue messages (`splice_info_section`) bit by bit into a
//! tree of plain Rust values. Every declared length is checked against what
//! was actually read; any inconsistency rejects the whole message.
//!
//! ```rust
//! use data_encoding::BASE64;
//! use scte35_decoder::{SpliceCommand, decode_splice_info_section};
//!
//! let buffer = BASE64.decode(b"/DAWAAAAAAAAAP/wBQb+Qjo1vQAAuwxz9A==").unwrap();
//! let (section, bits) = decode_splice_info_section(&buffer).unwrap();
//!
//! assert_eq!(bits, buffer.len() * 8);
//! assert_eq!(section.table_id, 0xFC);
//! match section.splice_command {
//!     SpliceCommand::TimeSignal(signal) => assert_eq!(signal.splice_time.pts_time, Some(1_111_111_101)),
//!     other => panic!("unexpected command {other:?}"),
//! }
//! ```
//!
//! Descriptor layouts follow the 2013 revision of the standard unless a
//! [`Decoder`] is configured with [`SchemaVersion::V2017`].
//!
//! ## Features
//!
//! - `crc-validation` (default): CRC-32/MPEG-2 helpers and [`DecoderConfig::verify_crc`].
//! - `serde` (default): `Serialize`/`Deserialize` for the decoded tree, with
//!   opaque bytes as lowercase hex, and [`Decoder::decode_tree`].
//! - `base64`: [`Decoder::decode_hex`] and [`Decoder::decode_base64`].
//! - `cli`: the `scte35-decoder` command line tool.

pub mod bit_reader;
mod codec;
pub mod commands;
mod config;
pub mod crc;
pub mod descriptors;
mod error;
pub mod fmt;
mod section;
#[cfg(feature = "serde")]
mod serde_hex;
pub mod time;
mod types;
pub mod upid;

#[cfg(test)]
mod tests;

pub use bit_reader::BitCursor;
pub use codec::{Decodable, WireSize};
pub use commands::{
    InsertComponent, InsertSplice, PrivateCommand, ScheduleComponent, ScheduleEvent, ScheduleMode,
    ScheduledSplice, SpliceCommand, SpliceCommandType, SpliceInsert, SpliceMode, SpliceSchedule,
    TimeSignal, decode_splice_command,
};
pub use config::{DecoderConfig, SchemaVersion};
pub use descriptors::{
    AvailDescriptor, DeliveryRestrictions, DescriptorPayload, DeviceRestrictions, DtmfDescriptor,
    Segmentation, SegmentationComponent, SegmentationDescriptor, SegmentationScope,
    SpliceDescriptor, SubSegment, TimeDescriptor, decode_splice_descriptor,
};
pub use error::{DecodeError, DecodeResult};
pub use section::{Decoder, EncryptionAlgorithm, SpliceInfoSection};
pub use time::{BreakDuration, SpliceTime};
pub use types::SegmentationType;
pub use upid::SegmentationUpidType;

/// Decodes one `splice_info_section` with the default configuration.
///
/// Returns the section and the number of bits consumed, which always equals
/// `buffer.len() * 8` on success.
pub fn decode_splice_info_section(buffer: &[u8]) -> DecodeResult<(SpliceInfoSection, usize)> {
    Decoder::default().decode(buffer)
}
