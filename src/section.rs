//! The top-level `splice_info_section` and its decoder.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bit_reader::BitCursor;
use crate::codec::{WireSize, check_width};
use crate::commands::{SpliceCommand, decode_splice_command};
use crate::config::{DecoderConfig, SchemaVersion};
use crate::descriptors::{SpliceDescriptor, decode_splice_descriptor};
use crate::error::{DecodeError, DecodeResult};

/// Bits in the fixed header, up to and including `splice_command_type`.
pub const HEADER_BITS: usize = 112;

/// A decoded `splice_info_section`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpliceInfoSection {
    pub table_id: u8,
    pub section_syntax_indicator: bool,
    pub private_indicator: bool,
    pub section_length: u16,
    pub protocol_version: u8,
    pub encrypted_packet: bool,
    pub encryption_algorithm: u8,
    pub pts_adjustment: u64,
    pub cw_index: u8,
    pub tier: u16,
    pub splice_command_length: u16,
    pub splice_command_type: u8,
    pub splice_command: SpliceCommand,
    pub descriptor_loop_length: u16,
    pub splice_descriptors: Vec<SpliceDescriptor>,
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            skip_serializing_if = "Vec::is_empty",
            with = "crate::serde_hex::bytes"
        )
    )]
    pub alignment_stuffing: Vec<u8>,
    /// Present only for encrypted packets.
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            skip_serializing_if = "Option::is_none",
            with = "crate::serde_hex::option_u32_hex"
        )
    )]
    pub e_crc_32: Option<u32>,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_hex::u32_hex"))]
    pub crc_32: u32,
}

/// Values of the 6-bit `encryption_algorithm` field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EncryptionAlgorithm {
    NotEncrypted,
    DesEcb,
    DesCbc,
    TripleDesEde3Ecb,
    /// 4 to 31.
    Reserved(u8),
    /// 32 to 63.
    Private(u8),
}

impl From<u8> for EncryptionAlgorithm {
    fn from(value: u8) -> Self {
        match value {
            0x00 => EncryptionAlgorithm::NotEncrypted,
            0x01 => EncryptionAlgorithm::DesEcb,
            0x02 => EncryptionAlgorithm::DesCbc,
            0x03 => EncryptionAlgorithm::TripleDesEde3Ecb,
            0x04..=0x1F => EncryptionAlgorithm::Reserved(value),
            _ => EncryptionAlgorithm::Private(value),
        }
    }
}

impl fmt::Display for EncryptionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionAlgorithm::NotEncrypted => write!(f, "No encryption"),
            EncryptionAlgorithm::DesEcb => write!(f, "DES - ECB mode"),
            EncryptionAlgorithm::DesCbc => write!(f, "DES - CBC mode"),
            EncryptionAlgorithm::TripleDesEde3Ecb => write!(f, "Triple DES EDE3 - ECB mode"),
            EncryptionAlgorithm::Reserved(value) => write!(f, "Reserved ({value})"),
            EncryptionAlgorithm::Private(value) => write!(f, "User private ({value})"),
        }
    }
}

impl SpliceInfoSection {
    pub fn algorithm(&self) -> EncryptionAlgorithm {
        EncryptionAlgorithm::from(self.encryption_algorithm)
    }

    /// Number of bits this section occupies on the wire.
    pub fn bit_len(&self) -> usize {
        HEADER_BITS
            + self.splice_command.bit_len()
            + 16
            + self.descriptors_bit_len()
            + 8 * self.alignment_stuffing.len()
            + crc_bits(self.e_crc_32.is_some())
    }

    /// Applies the decoder's consistency checks to a tree that was built or
    /// edited without going through [`Decoder::decode`].
    ///
    /// Declared lengths must match the sizes the command and descriptors
    /// would occupy, every field must fit its wire width, and segmentation
    /// sub-segments must be present exactly when `schema` would read them.
    pub fn validate(&self, schema: SchemaVersion) -> DecodeResult<()> {
        check_width("section_length", u64::from(self.section_length), 12)?;
        check_width(
            "encryption_algorithm",
            u64::from(self.encryption_algorithm),
            6,
        )?;
        check_width("pts_adjustment", self.pts_adjustment, 33)?;
        check_width("tier", u64::from(self.tier), 12)?;
        check_width(
            "splice_command_length",
            u64::from(self.splice_command_length),
            12,
        )?;

        if self.splice_command_type != u8::from(self.splice_command.splice_command_type()) {
            return Err(DecodeError::InvalidTree {
                field: "splice_command_type",
                reason: "does not match the splice command",
            });
        }
        self.splice_command.validate()?;
        let declared = self.splice_command_length as usize * 8;
        let actual = self.splice_command.bit_len();
        if declared != actual {
            return Err(DecodeError::CommandLengthMismatch { declared, actual });
        }

        for descriptor in &self.splice_descriptors {
            descriptor.validate()?;
            if let Some(segmentation) = descriptor.segmentation() {
                segmentation.check_schema(schema)?;
            }
        }
        let declared = self.descriptor_loop_length as usize * 8;
        let actual = self.descriptors_bit_len();
        if declared != actual {
            return Err(DecodeError::DescriptorLoopOverrun { declared, actual });
        }

        if self.e_crc_32.is_some() != self.encrypted_packet {
            return Err(DecodeError::InvalidTree {
                field: "e_crc_32",
                reason: "presence does not match encrypted_packet_flag",
            });
        }
        Ok(())
    }

    fn descriptors_bit_len(&self) -> usize {
        self.splice_descriptors.iter().map(WireSize::bit_len).sum()
    }
}

#[cfg(feature = "crc-validation")]
fn verify_crc(buffer: &[u8]) -> DecodeResult<()> {
    crate::crc::validate_message_crc(buffer)
        .inspect_err(|err| debug!(error = %err, "CRC_32 check failed"))
}

#[cfg(not(feature = "crc-validation"))]
fn verify_crc(_buffer: &[u8]) -> DecodeResult<()> {
    Ok(())
}

fn crc_bits(encrypted: bool) -> usize {
    if encrypted { 64 } else { 32 }
}

/// Decodes `splice_info_section` messages.
///
/// A decoder holds only its configuration, so one instance can be shared
/// freely between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Decoder { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes one complete section.
    ///
    /// On success the returned bit count always equals `buffer.len() * 8`.
    /// Any inconsistency aborts the decode; no partial section is returned.
    pub fn decode(&self, buffer: &[u8]) -> DecodeResult<(SpliceInfoSection, usize)> {
        let mut reader = SectionReader::new(buffer, self.config.schema);
        let section = match reader.read() {
            Ok(section) => section,
            Err(err) => {
                debug!(stage = ?reader.stage, error = %err, "rejected splice_info_section");
                return Err(err);
            }
        };

        if self.config.verify_crc {
            verify_crc(buffer)?;
        }

        debug!(
            command = %section.splice_command.splice_command_type(),
            descriptors = section.splice_descriptors.len(),
            bits = reader.cursor.position(),
            "decoded splice_info_section"
        );
        Ok((section, reader.cursor.position()))
    }

    /// Decodes a hex-encoded section (case-insensitive, optional `0x` prefix).
    #[cfg(feature = "base64")]
    pub fn decode_hex(&self, payload: &str) -> DecodeResult<(SpliceInfoSection, usize)> {
        let trimmed = payload.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let buffer = data_encoding::HEXLOWER_PERMISSIVE
            .decode(digits.as_bytes())
            .map_err(|err| DecodeError::InvalidEncoding {
                encoding: "hex",
                reason: err.to_string(),
            })?;
        self.decode(&buffer)
    }

    /// Decodes a base64-encoded section.
    #[cfg(feature = "base64")]
    pub fn decode_base64(&self, payload: &str) -> DecodeResult<(SpliceInfoSection, usize)> {
        let buffer = data_encoding::BASE64
            .decode(payload.trim().as_bytes())
            .map_err(|err| DecodeError::InvalidEncoding {
                encoding: "base64",
                reason: err.to_string(),
            })?;
        self.decode(&buffer)
    }

    /// Rebuilds a section from its structured (JSON) form and checks it the
    /// way [`decode`](Self::decode) checks bytes.
    #[cfg(feature = "serde")]
    pub fn decode_tree(&self, tree: serde_json::Value) -> DecodeResult<SpliceInfoSection> {
        let section: SpliceInfoSection = serde_json::from_value(tree)
            .map_err(|err| DecodeError::MalformedTree(err.to_string()))?;
        section.validate(self.config.schema)?;
        Ok(section)
    }
}

/// Where a [`SectionReader`] is in the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Header,
    CommandDispatch,
    DescriptorLoop,
    Trailer,
    Done,
}

struct Header {
    table_id: u8,
    section_syntax_indicator: bool,
    private_indicator: bool,
    section_length: u16,
    protocol_version: u8,
    encrypted_packet: bool,
    encryption_algorithm: u8,
    pts_adjustment: u64,
    cw_index: u8,
    tier: u16,
    splice_command_length: u16,
    splice_command_type: u8,
}

/// Trailing fields after the descriptor loop.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Trailer {
    pub alignment_stuffing: Vec<u8>,
    pub e_crc_32: Option<u32>,
    pub crc_32: u32,
}

/// Walks one section through its stages, in order, over a single cursor.
struct SectionReader<'a> {
    cursor: BitCursor<'a>,
    schema: SchemaVersion,
    stage: Stage,
}

impl<'a> SectionReader<'a> {
    fn new(buffer: &'a [u8], schema: SchemaVersion) -> Self {
        SectionReader {
            cursor: BitCursor::new(buffer),
            schema,
            stage: Stage::Header,
        }
    }

    fn read(&mut self) -> DecodeResult<SpliceInfoSection> {
        self.stage = Stage::Header;
        let header = self.header()?;

        self.stage = Stage::CommandDispatch;
        let splice_command = self.command(&header)?;

        self.stage = Stage::DescriptorLoop;
        let (descriptor_loop_length, splice_descriptors) =
            self.descriptor_loop(header.encrypted_packet)?;

        self.stage = Stage::Trailer;
        let trailer = decode_trailer(&mut self.cursor, header.encrypted_packet)?;

        self.stage = Stage::Done;
        let consumed = self.cursor.position();
        let total = self.cursor.bit_len();
        if consumed != total {
            return Err(DecodeError::TrailingDataMismatch { consumed, total });
        }

        Ok(SpliceInfoSection {
            table_id: header.table_id,
            section_syntax_indicator: header.section_syntax_indicator,
            private_indicator: header.private_indicator,
            section_length: header.section_length,
            protocol_version: header.protocol_version,
            encrypted_packet: header.encrypted_packet,
            encryption_algorithm: header.encryption_algorithm,
            pts_adjustment: header.pts_adjustment,
            cw_index: header.cw_index,
            tier: header.tier,
            splice_command_length: header.splice_command_length,
            splice_command_type: header.splice_command_type,
            splice_command,
            descriptor_loop_length,
            splice_descriptors,
            alignment_stuffing: trailer.alignment_stuffing,
            e_crc_32: trailer.e_crc_32,
            crc_32: trailer.crc_32,
        })
    }

    fn header(&mut self) -> DecodeResult<Header> {
        let cursor = &mut self.cursor;
        let table_id = cursor.read_u8()?;
        let section_syntax_indicator = cursor.read_bool()?;
        let private_indicator = cursor.read_bool()?;
        cursor.skip_bits(2)?;
        let section_length = cursor.read_bits(12)? as u16;
        let protocol_version = cursor.read_u8()?;
        let encrypted_packet = cursor.read_bool()?;
        let encryption_algorithm = cursor.read_bits(6)? as u8;
        let pts_adjustment = cursor.read_bits(33)?;
        let cw_index = cursor.read_u8()?;
        let tier = cursor.read_bits(12)? as u16;
        let splice_command_length = cursor.read_bits(12)? as u16;
        let splice_command_type = cursor.read_u8()?;

        trace!(
            table_id,
            section_length,
            encrypted_packet,
            splice_command_length,
            splice_command_type,
            "decoded splice_info_section header"
        );

        Ok(Header {
            table_id,
            section_syntax_indicator,
            private_indicator,
            section_length,
            protocol_version,
            encrypted_packet,
            encryption_algorithm,
            pts_adjustment,
            cw_index,
            tier,
            splice_command_length,
            splice_command_type,
        })
    }

    fn command(&mut self, header: &Header) -> DecodeResult<SpliceCommand> {
        let declared = header.splice_command_length as usize * 8;
        let view = self.cursor.read_bytes(declared)?;
        let (command, actual) = decode_splice_command(header.splice_command_type, view)?;
        if actual != declared {
            return Err(DecodeError::CommandLengthMismatch { declared, actual });
        }
        Ok(command)
    }

    /// Reads `descriptor_loop_length` and the descriptors it covers.
    ///
    /// The declared loop plus the CRC field(s) must fit in what is left of the
    /// buffer before any descriptor is read, so a truncated section fails with
    /// [`DecodeError::InsufficientTrailerBits`] rather than a descriptor error.
    fn descriptor_loop(&mut self, encrypted: bool) -> DecodeResult<(u16, Vec<SpliceDescriptor>)> {
        let descriptor_loop_length = self.cursor.read_u16()?;
        let declared = descriptor_loop_length as usize * 8;

        let required = declared + crc_bits(encrypted);
        let remaining = self.cursor.remaining();
        if remaining < required {
            return Err(DecodeError::InsufficientTrailerBits {
                required,
                remaining,
            });
        }

        let mut consumed = 0;
        let mut descriptors = Vec::new();
        while consumed < declared {
            let (descriptor, bits) = decode_splice_descriptor(self.cursor.rest(), self.schema)?;
            consumed += bits;
            if consumed > declared {
                return Err(DecodeError::DescriptorLoopOverrun {
                    declared,
                    actual: consumed,
                });
            }
            self.cursor.skip_bits(bits)?;
            descriptors.push(descriptor);
        }

        Ok((descriptor_loop_length, descriptors))
    }
}

/// Reads alignment stuffing, `E_CRC_32` (when `encrypted`) and `CRC_32`,
/// consuming everything left in `cursor`.
pub(crate) fn decode_trailer(cursor: &mut BitCursor<'_>, encrypted: bool) -> DecodeResult<Trailer> {
    let required = crc_bits(encrypted);
    let remaining = cursor.remaining();
    if remaining < required {
        return Err(DecodeError::InsufficientTrailerBits {
            required,
            remaining,
        });
    }
    let stuffing_bits = remaining - required;
    if !stuffing_bits.is_multiple_of(8) {
        return Err(DecodeError::MisalignedStuffing { stuffing_bits });
    }

    let alignment_stuffing = cursor.read_bytes(stuffing_bits)?.to_vec();
    let e_crc_32 = if encrypted { Some(cursor.read_u32()?) } else { None };
    let crc_32 = cursor.read_u32()?;
    Ok(Trailer {
        alignment_stuffing,
        e_crc_32,
        crc_32,
    })
}
