//! Splice descriptors carried in the descriptor loop.
//!
//! Every descriptor starts with `splice_descriptor_tag`, `descriptor_length`
//! and a 32-bit `identifier`. The remaining `descriptor_length - 4` bytes hold
//! a tag-specific payload; whatever the typed payload leaves unread is kept as
//! private bytes.

mod segmentation;

pub use segmentation::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::bit_reader::BitCursor;
use crate::codec::{Decodable, WireSize, check_width};
use crate::config::SchemaVersion;
use crate::error::{DecodeError, DecodeResult};

/// `"CUEI"`, the identifier registered for SCTE-35 descriptors.
pub const CUEI: u32 = 0x4355_4549;

pub const AVAIL_DESCRIPTOR_TAG: u8 = 0x00;
pub const DTMF_DESCRIPTOR_TAG: u8 = 0x01;
pub const SEGMENTATION_DESCRIPTOR_TAG: u8 = 0x02;
pub const TIME_DESCRIPTOR_TAG: u8 = 0x03;

/// One entry of the descriptor loop.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpliceDescriptor {
    pub descriptor_length: u8,
    pub identifier: u32,
    pub payload: DescriptorPayload,
    /// Bytes inside `descriptor_length` that the typed payload did not use.
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            skip_serializing_if = "Vec::is_empty",
            with = "crate::serde_hex::bytes"
        )
    )]
    pub private_bytes: Vec<u8>,
}

/// The typed part of a descriptor, selected by its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum DescriptorPayload {
    Avail(AvailDescriptor),
    Dtmf(DtmfDescriptor),
    Segmentation(SegmentationDescriptor),
    /// A tag without a typed payload; its contents are all private bytes.
    Unknown { tag: u8 },
}

/// `avail_descriptor()` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AvailDescriptor {
    pub provider_avail_id: u32,
}

/// `DTMF_descriptor()` payload.
///
/// Each character is one byte on the wire, mapped to the `char` with the same
/// code point.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DtmfDescriptor {
    pub preroll: u8,
    pub dtmf_chars: String,
}

/// `time_descriptor()` fields, read on demand from a tag `0x03` descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeDescriptor {
    /// 48-bit TAI seconds.
    pub tai_seconds: u64,
    pub tai_ns: u32,
    pub utc_offset: u16,
}

impl SpliceDescriptor {
    pub fn splice_descriptor_tag(&self) -> u8 {
        match &self.payload {
            DescriptorPayload::Avail(_) => AVAIL_DESCRIPTOR_TAG,
            DescriptorPayload::Dtmf(_) => DTMF_DESCRIPTOR_TAG,
            DescriptorPayload::Segmentation(_) => SEGMENTATION_DESCRIPTOR_TAG,
            DescriptorPayload::Unknown { tag } => *tag,
        }
    }

    pub fn segmentation(&self) -> Option<&SegmentationDescriptor> {
        match &self.payload {
            DescriptorPayload::Segmentation(segmentation) => Some(segmentation),
            _ => None,
        }
    }

    /// Interprets a tag `0x03` descriptor's private bytes as a time descriptor.
    pub fn time_descriptor(&self) -> Option<TimeDescriptor> {
        if self.splice_descriptor_tag() != TIME_DESCRIPTOR_TAG {
            return None;
        }
        TimeDescriptor::decode_bytes(&self.private_bytes)
            .ok()
            .map(|(time, _)| time)
    }

    /// Bits taken by the typed payload, between the identifier and the private bytes.
    fn payload_bit_len(&self) -> usize {
        match &self.payload {
            DescriptorPayload::Avail(avail) => avail.bit_len(),
            DescriptorPayload::Dtmf(dtmf) => dtmf.bit_len(),
            DescriptorPayload::Segmentation(segmentation) => segmentation.bit_len(),
            DescriptorPayload::Unknown { .. } => 0,
        }
    }
}

/// Decodes the descriptor at the start of `view`.
///
/// `view` may extend past the descriptor; the descriptor's own length bounds
/// it. Returns the descriptor and the bits it occupied (`16 + 8 * descriptor_length`).
pub fn decode_splice_descriptor(
    view: &[u8],
    schema: SchemaVersion,
) -> DecodeResult<(SpliceDescriptor, usize)> {
    let mut cursor = BitCursor::new(view);
    let tag = cursor.read_u8()?;
    let descriptor_length = cursor.read_u8()?;
    if descriptor_length < 4 {
        return Err(DecodeError::DescriptorLengthUnderflow {
            tag,
            declared: descriptor_length,
        });
    }
    let identifier = cursor.read_u32()?;

    let declared = (descriptor_length as usize - 4) * 8;
    let start = cursor.position();
    let overrun = |used_by_payload: usize| DecodeError::DescriptorLengthMismatch {
        tag,
        declared,
        used_by_payload,
    };

    let payload = decode_payload(tag, &mut cursor, schema).map_err(|err| match err {
        DecodeError::OutOfBits { requested, offset, .. } => {
            let wanted = offset + requested - start;
            if wanted > declared {
                overrun(wanted)
            } else {
                err
            }
        }
        other => other,
    })?;

    let used = cursor.position() - start;
    if used > declared {
        return Err(overrun(used));
    }
    let private_bytes = cursor.read_bytes(declared - used)?.to_vec();

    trace!(
        tag,
        descriptor_length,
        identifier,
        private_bytes = private_bytes.len(),
        "decoded splice descriptor"
    );

    let descriptor = SpliceDescriptor {
        descriptor_length,
        identifier,
        payload,
        private_bytes,
    };
    Ok((descriptor, cursor.position()))
}

fn decode_payload(
    tag: u8,
    cursor: &mut BitCursor<'_>,
    schema: SchemaVersion,
) -> DecodeResult<DescriptorPayload> {
    Ok(match tag {
        AVAIL_DESCRIPTOR_TAG => DescriptorPayload::Avail(AvailDescriptor::decode(cursor)?),
        DTMF_DESCRIPTOR_TAG => DescriptorPayload::Dtmf(DtmfDescriptor::decode(cursor)?),
        SEGMENTATION_DESCRIPTOR_TAG => {
            DescriptorPayload::Segmentation(SegmentationDescriptor::decode(cursor, schema)?)
        }
        tag => DescriptorPayload::Unknown { tag },
    })
}

impl Decodable for AvailDescriptor {
    fn decode(cursor: &mut BitCursor<'_>) -> DecodeResult<Self> {
        Ok(AvailDescriptor {
            provider_avail_id: cursor.read_u32()?,
        })
    }
}

impl WireSize for AvailDescriptor {
    fn bit_len(&self) -> usize {
        32
    }
}

impl Decodable for DtmfDescriptor {
    fn decode(cursor: &mut BitCursor<'_>) -> DecodeResult<Self> {
        let preroll = cursor.read_u8()?;
        let dtmf_count = cursor.read_bits(3)? as usize;
        cursor.skip_bits(5)?;
        let dtmf_chars = cursor
            .read_bytes(dtmf_count * 8)?
            .iter()
            .map(|&b| char::from(b))
            .collect();
        Ok(DtmfDescriptor {
            preroll,
            dtmf_chars,
        })
    }
}

impl WireSize for DtmfDescriptor {
    fn bit_len(&self) -> usize {
        16 + 8 * self.dtmf_chars.chars().count()
    }

    fn validate(&self) -> DecodeResult<()> {
        let count = self.dtmf_chars.chars().count();
        check_width("dtmf_descriptor.dtmf_count", count as u64, 3)?;
        for c in self.dtmf_chars.chars() {
            check_width("dtmf_descriptor.dtmf_char", u64::from(u32::from(c)), 8)?;
        }
        Ok(())
    }
}

impl Decodable for TimeDescriptor {
    fn decode(cursor: &mut BitCursor<'_>) -> DecodeResult<Self> {
        Ok(TimeDescriptor {
            tai_seconds: cursor.read_bits(48)?,
            tai_ns: cursor.read_u32()?,
            utc_offset: cursor.read_u16()?,
        })
    }
}

impl WireSize for SpliceDescriptor {
    fn bit_len(&self) -> usize {
        48 + self.payload_bit_len() + 8 * self.private_bytes.len()
    }

    /// Checks `descriptor_length` against the payload and private bytes, then
    /// the payload's own fields.
    fn validate(&self) -> DecodeResult<()> {
        let tag = self.splice_descriptor_tag();
        if self.descriptor_length < 4 {
            return Err(DecodeError::DescriptorLengthUnderflow {
                tag,
                declared: self.descriptor_length,
            });
        }
        let untyped = matches!(self.payload, DescriptorPayload::Unknown { .. });
        if untyped && tag <= SEGMENTATION_DESCRIPTOR_TAG {
            return Err(DecodeError::InvalidTree {
                field: "splice_descriptor.payload",
                reason: "tag has a typed payload but none is given",
            });
        }

        let declared = (self.descriptor_length as usize - 4) * 8;
        let used_by_payload = self.payload_bit_len();
        if used_by_payload + 8 * self.private_bytes.len() != declared {
            return Err(DecodeError::DescriptorLengthMismatch {
                tag,
                declared,
                used_by_payload,
            });
        }

        match &self.payload {
            DescriptorPayload::Avail(avail) => avail.validate(),
            DescriptorPayload::Dtmf(dtmf) => dtmf.validate(),
            DescriptorPayload::Segmentation(segmentation) => segmentation.validate(),
            DescriptorPayload::Unknown { .. } => Ok(()),
        }
    }
}
