//! `segmentation_descriptor()` (tag `0x02`).

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bit_reader::BitCursor;
use crate::codec::{WireSize, check_count, check_width};
use crate::config::SchemaVersion;
use crate::error::{DecodeError, DecodeResult};
use crate::time::ticks_to_duration;
use crate::types::SegmentationType;
use crate::upid::SegmentationUpidType;

/// Segmentation descriptor payload.
///
/// `segmentation` is `None` when `segmentation_event_cancel_indicator` is set,
/// in which case nothing follows the event id on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentationDescriptor {
    pub segmentation_event_id: u32,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub segmentation: Option<Segmentation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segmentation {
    /// Present when `delivery_not_restricted_flag` is clear.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub delivery_restrictions: Option<DeliveryRestrictions>,
    pub scope: SegmentationScope,
    /// 40-bit duration in 90 kHz ticks.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub segmentation_duration: Option<u64>,
    pub segmentation_upid_type: u8,
    #[cfg_attr(
        feature = "serde",
        serde(default, with = "crate::serde_hex::bytes")
    )]
    pub segmentation_upid: Vec<u8>,
    pub segmentation_type_id: u8,
    pub segment_num: u8,
    pub segments_expected: u8,
    /// Only carried by the 2017 layout for placement opportunity starts.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub sub_segment: Option<SubSegment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeliveryRestrictions {
    pub web_delivery_allowed_flag: bool,
    pub no_regional_blackout_flag: bool,
    pub archive_allowed_flag: bool,
    pub device_restrictions: DeviceRestrictions,
}

/// The 2-bit `device_restrictions` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DeviceRestrictions {
    /// Restricted for device group 0, defined out of band.
    RestrictGroup0,
    /// Restricted for device group 1, defined out of band.
    RestrictGroup1,
    /// Restricted for device group 2, defined out of band.
    RestrictGroup2,
    /// No device restrictions.
    None,
}

impl From<u8> for DeviceRestrictions {
    fn from(value: u8) -> Self {
        match value & 0b11 {
            0b00 => DeviceRestrictions::RestrictGroup0,
            0b01 => DeviceRestrictions::RestrictGroup1,
            0b10 => DeviceRestrictions::RestrictGroup2,
            _ => DeviceRestrictions::None,
        }
    }
}

impl From<DeviceRestrictions> for u8 {
    fn from(value: DeviceRestrictions) -> Self {
        match value {
            DeviceRestrictions::RestrictGroup0 => 0b00,
            DeviceRestrictions::RestrictGroup1 => 0b01,
            DeviceRestrictions::RestrictGroup2 => 0b10,
            DeviceRestrictions::None => 0b11,
        }
    }
}

/// Whether segmentation applies to the whole program or to listed components.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SegmentationScope {
    Program,
    Components(Vec<SegmentationComponent>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentationComponent {
    pub component_tag: u8,
    pub pts_offset: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubSegment {
    pub sub_segment_num: u8,
    pub sub_segments_expected: u8,
}

impl SegmentationDescriptor {
    pub fn segmentation_event_cancel_indicator(&self) -> bool {
        self.segmentation.is_none()
    }

    /// Decodes the payload that follows the descriptor identifier.
    pub fn decode(cursor: &mut BitCursor<'_>, schema: SchemaVersion) -> DecodeResult<Self> {
        let segmentation_event_id = cursor.read_u32()?;
        let segmentation_event_cancel_indicator = cursor.read_bool()?;
        cursor.skip_bits(7)?;

        if segmentation_event_cancel_indicator {
            return Ok(SegmentationDescriptor {
                segmentation_event_id,
                segmentation: None,
            });
        }

        let program_segmentation_flag = cursor.read_bool()?;
        let segmentation_duration_flag = cursor.read_bool()?;
        let delivery_not_restricted_flag = cursor.read_bool()?;

        let delivery_restrictions = if delivery_not_restricted_flag {
            cursor.skip_bits(5)?;
            None
        } else {
            Some(DeliveryRestrictions {
                web_delivery_allowed_flag: cursor.read_bool()?,
                no_regional_blackout_flag: cursor.read_bool()?,
                archive_allowed_flag: cursor.read_bool()?,
                device_restrictions: DeviceRestrictions::from(cursor.read_bits(2)? as u8),
            })
        };

        let scope = if program_segmentation_flag {
            SegmentationScope::Program
        } else {
            let component_count = cursor.read_u8()?;
            let mut components = Vec::with_capacity(component_count as usize);
            for _ in 0..component_count {
                let component_tag = cursor.read_u8()?;
                cursor.skip_bits(7)?;
                components.push(SegmentationComponent {
                    component_tag,
                    pts_offset: cursor.read_bits(33)?,
                });
            }
            SegmentationScope::Components(components)
        };

        let segmentation_duration = if segmentation_duration_flag {
            Some(cursor.read_bits(40)?)
        } else {
            None
        };

        let segmentation_upid_type = cursor.read_u8()?;
        let segmentation_upid_length = cursor.read_u8()?;
        let upid_bits = segmentation_upid_length as usize * 8;
        let segmentation_upid = cursor.read_bytes(upid_bits)?.to_vec();
        let segmentation_type_id = cursor.read_u8()?;
        let segment_num = cursor.read_u8()?;
        let segments_expected = cursor.read_u8()?;

        let sub_segment = if schema.has_sub_segments(segmentation_type_id) {
            Some(SubSegment {
                sub_segment_num: cursor.read_u8()?,
                sub_segments_expected: cursor.read_u8()?,
            })
        } else {
            None
        };

        Ok(SegmentationDescriptor {
            segmentation_event_id,
            segmentation: Some(Segmentation {
                delivery_restrictions,
                scope,
                segmentation_duration,
                segmentation_upid_type,
                segmentation_upid,
                segmentation_type_id,
                segment_num,
                segments_expected,
                sub_segment,
            }),
        })
    }

    /// Checks that the sub-segment fields are present exactly when `schema`
    /// would have decoded them.
    pub fn check_schema(&self, schema: SchemaVersion) -> DecodeResult<()> {
        match &self.segmentation {
            Some(segmentation)
                if segmentation.sub_segment.is_some()
                    != schema.has_sub_segments(segmentation.segmentation_type_id) =>
            {
                Err(DecodeError::InvalidTree {
                    field: "segmentation_descriptor.sub_segment",
                    reason: "presence does not match the schema version",
                })
            }
            _ => Ok(()),
        }
    }
}

impl Segmentation {
    pub fn program_segmentation_flag(&self) -> bool {
        matches!(self.scope, SegmentationScope::Program)
    }

    pub fn segmentation_duration_flag(&self) -> bool {
        self.segmentation_duration.is_some()
    }

    pub fn delivery_not_restricted_flag(&self) -> bool {
        self.delivery_restrictions.is_none()
    }

    pub fn segmentation_type(&self) -> SegmentationType {
        SegmentationType::from(self.segmentation_type_id)
    }

    pub fn upid_type(&self) -> SegmentationUpidType {
        SegmentationUpidType::from(self.segmentation_upid_type)
    }

    pub fn duration(&self) -> Option<Duration> {
        self.segmentation_duration.map(ticks_to_duration)
    }
}

impl WireSize for SegmentationDescriptor {
    fn bit_len(&self) -> usize {
        let Some(segmentation) = &self.segmentation else {
            return 40;
        };
        let scope = match &segmentation.scope {
            SegmentationScope::Program => 0,
            SegmentationScope::Components(components) => 8 + 48 * components.len(),
        };
        let duration = if segmentation.segmentation_duration_flag() {
            40
        } else {
            0
        };
        let sub_segment = if segmentation.sub_segment.is_some() {
            16
        } else {
            0
        };
        40 + 8 + scope + duration + 16 + 8 * segmentation.segmentation_upid.len() + 24 + sub_segment
    }

    fn validate(&self) -> DecodeResult<()> {
        let Some(segmentation) = &self.segmentation else {
            return Ok(());
        };
        if let SegmentationScope::Components(components) = &segmentation.scope {
            check_count(
                "segmentation_descriptor.component_count",
                components.len(),
                8,
            )?;
            for component in components {
                check_width(
                    "segmentation_descriptor.pts_offset",
                    component.pts_offset,
                    33,
                )?;
            }
        }
        if let Some(duration) = segmentation.segmentation_duration {
            check_width(
                "segmentation_descriptor.segmentation_duration",
                duration,
                40,
            )?;
        }
        check_count(
            "segmentation_descriptor.segmentation_upid_length",
            segmentation.segmentation_upid.len(),
            8,
        )
    }
}
