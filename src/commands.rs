//! Splice commands.
//!
//! A `splice_info_section` carries exactly one command, selected by the
//! `splice_command_type` byte. Each command is decoded from a view that holds
//! exactly `splice_command_length` bytes.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bit_reader::BitCursor;
use crate::codec::{Decodable, WireSize, check_count};
use crate::error::{DecodeError, DecodeResult};
use crate::time::{BreakDuration, SpliceTime};

/// Known values of `splice_command_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpliceCommandType {
    SpliceNull,
    SpliceSchedule,
    SpliceInsert,
    TimeSignal,
    BandwidthReservation,
    PrivateCommand,
    Reserved(u8),
}

impl From<u8> for SpliceCommandType {
    fn from(value: u8) -> SpliceCommandType {
        match value {
            0x00 => SpliceCommandType::SpliceNull,
            0x04 => SpliceCommandType::SpliceSchedule,
            0x05 => SpliceCommandType::SpliceInsert,
            0x06 => SpliceCommandType::TimeSignal,
            0x07 => SpliceCommandType::BandwidthReservation,
            0xff => SpliceCommandType::PrivateCommand,
            _ => SpliceCommandType::Reserved(value),
        }
    }
}

impl From<SpliceCommandType> for u8 {
    fn from(value: SpliceCommandType) -> u8 {
        match value {
            SpliceCommandType::SpliceNull => 0x00,
            SpliceCommandType::SpliceSchedule => 0x04,
            SpliceCommandType::SpliceInsert => 0x05,
            SpliceCommandType::TimeSignal => 0x06,
            SpliceCommandType::BandwidthReservation => 0x07,
            SpliceCommandType::PrivateCommand => 0xff,
            SpliceCommandType::Reserved(value) => value,
        }
    }
}

impl fmt::Display for SpliceCommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpliceCommandType::SpliceNull => write!(f, "Splice Null"),
            SpliceCommandType::SpliceSchedule => write!(f, "Splice Schedule"),
            SpliceCommandType::SpliceInsert => write!(f, "Splice Insert"),
            SpliceCommandType::TimeSignal => write!(f, "Time Signal"),
            SpliceCommandType::BandwidthReservation => write!(f, "Bandwidth Reservation"),
            SpliceCommandType::PrivateCommand => write!(f, "Private Command"),
            SpliceCommandType::Reserved(value) => write!(f, "Reserved (0x{value:02x})"),
        }
    }
}

/// The decoded command payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum SpliceCommand {
    SpliceNull,
    SpliceSchedule(SpliceSchedule),
    SpliceInsert(SpliceInsert),
    TimeSignal(TimeSignal),
    BandwidthReservation,
    PrivateCommand(PrivateCommand),
}

impl SpliceCommand {
    pub fn splice_command_type(&self) -> SpliceCommandType {
        match self {
            SpliceCommand::SpliceNull => SpliceCommandType::SpliceNull,
            SpliceCommand::SpliceSchedule(_) => SpliceCommandType::SpliceSchedule,
            SpliceCommand::SpliceInsert(_) => SpliceCommandType::SpliceInsert,
            SpliceCommand::TimeSignal(_) => SpliceCommandType::TimeSignal,
            SpliceCommand::BandwidthReservation => SpliceCommandType::BandwidthReservation,
            SpliceCommand::PrivateCommand(_) => SpliceCommandType::PrivateCommand,
        }
    }
}

impl WireSize for SpliceCommand {
    fn bit_len(&self) -> usize {
        match self {
            SpliceCommand::SpliceNull | SpliceCommand::BandwidthReservation => 0,
            SpliceCommand::SpliceSchedule(schedule) => schedule.bit_len(),
            SpliceCommand::SpliceInsert(insert) => insert.bit_len(),
            SpliceCommand::TimeSignal(signal) => signal.bit_len(),
            SpliceCommand::PrivateCommand(private) => private.bit_len(),
        }
    }

    fn validate(&self) -> DecodeResult<()> {
        match self {
            SpliceCommand::SpliceNull | SpliceCommand::BandwidthReservation => Ok(()),
            SpliceCommand::SpliceSchedule(schedule) => schedule.validate(),
            SpliceCommand::SpliceInsert(insert) => insert.validate(),
            SpliceCommand::TimeSignal(signal) => signal.validate(),
            SpliceCommand::PrivateCommand(private) => private.validate(),
        }
    }
}

/// Decodes the command selected by `command_type` from `view`.
///
/// `view` must hold exactly the declared command bytes. Returns the command
/// and the number of bits the payload consumed; the caller compares that
/// against the declared length.
pub fn decode_splice_command(
    command_type: u8,
    view: &[u8],
) -> DecodeResult<(SpliceCommand, usize)> {
    let mut cursor = BitCursor::new(view);
    let command = match SpliceCommandType::from(command_type) {
        SpliceCommandType::SpliceNull => SpliceCommand::SpliceNull,
        SpliceCommandType::SpliceSchedule => {
            SpliceCommand::SpliceSchedule(SpliceSchedule::decode(&mut cursor)?)
        }
        SpliceCommandType::SpliceInsert => {
            SpliceCommand::SpliceInsert(SpliceInsert::decode(&mut cursor)?)
        }
        SpliceCommandType::TimeSignal => {
            SpliceCommand::TimeSignal(TimeSignal::decode(&mut cursor)?)
        }
        SpliceCommandType::BandwidthReservation => SpliceCommand::BandwidthReservation,
        SpliceCommandType::PrivateCommand => {
            SpliceCommand::PrivateCommand(PrivateCommand::decode(&mut cursor)?)
        }
        SpliceCommandType::Reserved(value) => {
            return Err(DecodeError::UnsupportedCommandType(value));
        }
    };
    Ok((command, cursor.position()))
}

/// `splice_insert()`.
///
/// `splice` is `None` when `splice_event_cancel_indicator` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpliceInsert {
    pub splice_event_id: u32,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub splice: Option<InsertSplice>,
}

/// The part of a `splice_insert()` present when the event is not cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InsertSplice {
    pub out_of_network_indicator: bool,
    pub mode: SpliceMode,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub break_duration: Option<BreakDuration>,
    pub unique_program_id: u16,
    pub avail_num: u8,
    pub avails_expected: u8,
}

/// How a `splice_insert()` addresses the stream, keyed by
/// `program_splice_flag` and `splice_immediate_flag`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SpliceMode {
    /// Program splice at a signalled time.
    Program(SpliceTime),
    /// Program splice as soon as possible.
    ProgramImmediate,
    /// Per-component splice times.
    Components(Vec<InsertComponent>),
    /// Component tags spliced as soon as possible.
    ComponentsImmediate(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InsertComponent {
    pub component_tag: u8,
    pub splice_time: SpliceTime,
}

impl SpliceInsert {
    pub fn splice_event_cancel_indicator(&self) -> bool {
        self.splice.is_none()
    }
}

impl InsertSplice {
    pub fn program_splice_flag(&self) -> bool {
        matches!(
            self.mode,
            SpliceMode::Program(_) | SpliceMode::ProgramImmediate
        )
    }

    pub fn splice_immediate_flag(&self) -> bool {
        matches!(
            self.mode,
            SpliceMode::ProgramImmediate | SpliceMode::ComponentsImmediate(_)
        )
    }

    pub fn duration_flag(&self) -> bool {
        self.break_duration.is_some()
    }

    /// The program splice time, when splicing the whole program at a given time.
    pub fn splice_time(&self) -> Option<&SpliceTime> {
        match &self.mode {
            SpliceMode::Program(time) => Some(time),
            _ => None,
        }
    }
}

impl Decodable for SpliceInsert {
    fn decode(cursor: &mut BitCursor<'_>) -> DecodeResult<Self> {
        let splice_event_id = cursor.read_u32()?;
        let splice_event_cancel_indicator = cursor.read_bool()?;
        cursor.skip_bits(7)?;

        if splice_event_cancel_indicator {
            return Ok(SpliceInsert {
                splice_event_id,
                splice: None,
            });
        }

        let out_of_network_indicator = cursor.read_bool()?;
        let program_splice_flag = cursor.read_bool()?;
        let duration_flag = cursor.read_bool()?;
        let splice_immediate_flag = cursor.read_bool()?;
        cursor.skip_bits(4)?;

        let mode = match (program_splice_flag, splice_immediate_flag) {
            (true, false) => SpliceMode::Program(SpliceTime::decode(cursor)?),
            (true, true) => SpliceMode::ProgramImmediate,
            (false, false) => {
                let component_count = cursor.read_u8()?;
                let mut components = Vec::with_capacity(component_count as usize);
                for _ in 0..component_count {
                    components.push(InsertComponent {
                        component_tag: cursor.read_u8()?,
                        splice_time: SpliceTime::decode(cursor)?,
                    });
                }
                SpliceMode::Components(components)
            }
            (false, true) => {
                let component_count = cursor.read_u8()?;
                let mut tags = Vec::with_capacity(component_count as usize);
                for _ in 0..component_count {
                    tags.push(cursor.read_u8()?);
                }
                SpliceMode::ComponentsImmediate(tags)
            }
        };

        let break_duration = if duration_flag {
            Some(BreakDuration::decode(cursor)?)
        } else {
            None
        };

        Ok(SpliceInsert {
            splice_event_id,
            splice: Some(InsertSplice {
                out_of_network_indicator,
                mode,
                break_duration,
                unique_program_id: cursor.read_u16()?,
                avail_num: cursor.read_u8()?,
                avails_expected: cursor.read_u8()?,
            }),
        })
    }
}

impl WireSize for SpliceInsert {
    fn bit_len(&self) -> usize {
        let Some(splice) = &self.splice else {
            return 40;
        };
        let mode = match &splice.mode {
            SpliceMode::Program(time) => time.bit_len(),
            SpliceMode::ProgramImmediate => 0,
            SpliceMode::Components(components) => {
                let times: usize = components.iter().map(|c| c.splice_time.bit_len()).sum();
                8 + 8 * components.len() + times
            }
            SpliceMode::ComponentsImmediate(tags) => 8 + 8 * tags.len(),
        };
        let duration = splice.break_duration.map_or(0, |d| d.bit_len());
        40 + 8 + mode + duration + 32
    }

    fn validate(&self) -> DecodeResult<()> {
        let Some(splice) = &self.splice else {
            return Ok(());
        };
        match &splice.mode {
            SpliceMode::Program(time) => time.validate()?,
            SpliceMode::ProgramImmediate => {}
            SpliceMode::Components(components) => {
                check_count("splice_insert.component_count", components.len(), 8)?;
                for component in components {
                    component.splice_time.validate()?;
                }
            }
            SpliceMode::ComponentsImmediate(tags) => {
                check_count("splice_insert.component_count", tags.len(), 8)?;
            }
        }
        match &splice.break_duration {
            Some(duration) => duration.validate(),
            None => Ok(()),
        }
    }
}

/// `splice_schedule()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpliceSchedule {
    pub events: Vec<ScheduleEvent>,
}

impl SpliceSchedule {
    pub fn splice_count(&self) -> usize {
        self.events.len()
    }
}

/// One entry of a `splice_schedule()`.
///
/// `splice` is `None` when `splice_event_cancel_indicator` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleEvent {
    pub splice_event_id: u32,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub splice: Option<ScheduledSplice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduledSplice {
    pub out_of_network_indicator: bool,
    pub mode: ScheduleMode,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub break_duration: Option<BreakDuration>,
    pub unique_program_id: u16,
    pub avail_num: u8,
    pub avails_expected: u8,
}

/// Scheduled splice times, in UTC seconds since 1980-01-06, keyed by
/// `program_splice_flag`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScheduleMode {
    Program { utc_splice_time: u32 },
    Components(Vec<ScheduleComponent>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleComponent {
    pub component_tag: u8,
    pub utc_splice_time: u32,
}

impl ScheduleEvent {
    pub fn splice_event_cancel_indicator(&self) -> bool {
        self.splice.is_none()
    }
}

impl ScheduledSplice {
    pub fn program_splice_flag(&self) -> bool {
        matches!(self.mode, ScheduleMode::Program { .. })
    }

    pub fn duration_flag(&self) -> bool {
        self.break_duration.is_some()
    }
}

impl Decodable for ScheduleEvent {
    fn decode(cursor: &mut BitCursor<'_>) -> DecodeResult<Self> {
        let splice_event_id = cursor.read_u32()?;
        let splice_event_cancel_indicator = cursor.read_bool()?;
        cursor.skip_bits(7)?;

        if splice_event_cancel_indicator {
            return Ok(ScheduleEvent {
                splice_event_id,
                splice: None,
            });
        }

        let out_of_network_indicator = cursor.read_bool()?;
        let program_splice_flag = cursor.read_bool()?;
        let duration_flag = cursor.read_bool()?;
        cursor.skip_bits(5)?;

        let mode = if program_splice_flag {
            ScheduleMode::Program {
                utc_splice_time: cursor.read_u32()?,
            }
        } else {
            let component_count = cursor.read_u8()?;
            let mut components = Vec::with_capacity(component_count as usize);
            for _ in 0..component_count {
                components.push(ScheduleComponent {
                    component_tag: cursor.read_u8()?,
                    utc_splice_time: cursor.read_u32()?,
                });
            }
            ScheduleMode::Components(components)
        };

        let break_duration = if duration_flag {
            Some(BreakDuration::decode(cursor)?)
        } else {
            None
        };

        Ok(ScheduleEvent {
            splice_event_id,
            splice: Some(ScheduledSplice {
                out_of_network_indicator,
                mode,
                break_duration,
                unique_program_id: cursor.read_u16()?,
                avail_num: cursor.read_u8()?,
                avails_expected: cursor.read_u8()?,
            }),
        })
    }
}

impl WireSize for ScheduleEvent {
    fn bit_len(&self) -> usize {
        let Some(splice) = &self.splice else {
            return 40;
        };
        let mode = match &splice.mode {
            ScheduleMode::Program { .. } => 32,
            ScheduleMode::Components(components) => 8 + 40 * components.len(),
        };
        let duration = splice.break_duration.map_or(0, |d| d.bit_len());
        40 + 8 + mode + duration + 32
    }

    fn validate(&self) -> DecodeResult<()> {
        let Some(splice) = &self.splice else {
            return Ok(());
        };
        if let ScheduleMode::Components(components) = &splice.mode {
            check_count("splice_schedule.component_count", components.len(), 8)?;
        }
        match &splice.break_duration {
            Some(duration) => duration.validate(),
            None => Ok(()),
        }
    }
}

impl Decodable for SpliceSchedule {
    fn decode(cursor: &mut BitCursor<'_>) -> DecodeResult<Self> {
        let splice_count = cursor.read_u8()?;
        let mut events = Vec::with_capacity(splice_count as usize);
        for _ in 0..splice_count {
            events.push(ScheduleEvent::decode(cursor)?);
        }
        Ok(SpliceSchedule { events })
    }
}

impl WireSize for SpliceSchedule {
    fn bit_len(&self) -> usize {
        8 + self.events.iter().map(WireSize::bit_len).sum::<usize>()
    }

    fn validate(&self) -> DecodeResult<()> {
        check_count("splice_schedule.splice_count", self.events.len(), 8)?;
        self.events.iter().try_for_each(WireSize::validate)
    }
}

/// `time_signal()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeSignal {
    pub splice_time: SpliceTime,
}

impl Decodable for TimeSignal {
    fn decode(cursor: &mut BitCursor<'_>) -> DecodeResult<Self> {
        Ok(TimeSignal {
            splice_time: SpliceTime::decode(cursor)?,
        })
    }
}

impl WireSize for TimeSignal {
    fn bit_len(&self) -> usize {
        self.splice_time.bit_len()
    }

    fn validate(&self) -> DecodeResult<()> {
        self.splice_time.validate()
    }
}

/// `private_command()`: an identifier followed by opaque bytes.
///
/// The payload runs to the end of the command, so it must be decoded from a
/// view bounded by `splice_command_length`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrivateCommand {
    pub identifier: u32,
    #[cfg_attr(
        feature = "serde",
        serde(default, with = "crate::serde_hex::bytes")
    )]
    pub private_bytes: Vec<u8>,
}

impl Decodable for PrivateCommand {
    fn decode(cursor: &mut BitCursor<'_>) -> DecodeResult<Self> {
        let identifier = cursor.read_u32()?;
        let private_bytes = cursor.read_remaining_bytes()?.to_vec();
        Ok(PrivateCommand {
            identifier,
            private_bytes,
        })
    }
}

impl WireSize for PrivateCommand {
    fn bit_len(&self) -> usize {
        32 + 8 * self.private_bytes.len()
    }
}
