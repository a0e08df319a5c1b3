//! Time structures shared by several splice commands.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bit_reader::BitCursor;
use crate::codec::{Decodable, WireSize, check_width};
use crate::error::DecodeResult;

/// Ticks per second of the 90 kHz MPEG system clock.
pub const TICKS_PER_SECOND: u64 = 90_000;

/// Converts 90 kHz ticks to seconds, rounded up to 6 decimal places.
pub fn ticks_to_secs(value: u64) -> f64 {
    (value as f64 / TICKS_PER_SECOND as f64 * 1_000_000.0).ceil() / 1_000_000.0
}

/// Converts 90 kHz ticks to an exact [`Duration`], truncated to whole nanoseconds.
pub(crate) fn ticks_to_duration(ticks: u64) -> Duration {
    let secs = ticks / TICKS_PER_SECOND;
    let nanos = (ticks % TICKS_PER_SECOND) * 1_000_000_000 / TICKS_PER_SECOND;
    Duration::new(secs, nanos as u32)
}

/// `splice_time()`: an optional 33-bit PTS.
///
/// `time_specified_flag` is implied by `pts_time` being present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpliceTime {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub pts_time: Option<u64>,
}

impl SpliceTime {
    pub fn from_ticks(ticks: u64) -> Self {
        SpliceTime {
            pts_time: Some(ticks),
        }
    }

    pub fn time_specified_flag(&self) -> bool {
        self.pts_time.is_some()
    }

    /// The PTS as a wall-clock offset, if one was specified.
    pub fn to_duration(&self) -> Option<Duration> {
        self.pts_time.map(ticks_to_duration)
    }
}

impl Decodable for SpliceTime {
    fn decode(cursor: &mut BitCursor<'_>) -> DecodeResult<Self> {
        if cursor.read_bool()? {
            cursor.skip_bits(6)?;
            Ok(SpliceTime::from_ticks(cursor.read_bits(33)?))
        } else {
            cursor.skip_bits(7)?;
            Ok(SpliceTime::default())
        }
    }
}

impl WireSize for SpliceTime {
    fn bit_len(&self) -> usize {
        if self.time_specified_flag() { 40 } else { 8 }
    }

    fn validate(&self) -> DecodeResult<()> {
        match self.pts_time {
            Some(pts) => check_width("pts_time", pts, 33),
            None => Ok(()),
        }
    }
}

/// `break_duration()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BreakDuration {
    pub auto_return: bool,
    pub duration: u64,
}

impl BreakDuration {
    pub fn to_duration(&self) -> Duration {
        ticks_to_duration(self.duration)
    }
}

impl From<BreakDuration> for Duration {
    fn from(value: BreakDuration) -> Self {
        value.to_duration()
    }
}

impl Decodable for BreakDuration {
    fn decode(cursor: &mut BitCursor<'_>) -> DecodeResult<Self> {
        let auto_return = cursor.read_bool()?;
        cursor.skip_bits(6)?;
        let duration = cursor.read_bits(33)?;
        Ok(BreakDuration {
            auto_return,
            duration,
        })
    }
}

impl WireSize for BreakDuration {
    fn bit_len(&self) -> usize {
        40
    }

    fn validate(&self) -> DecodeResult<()> {
        check_width("break_duration.duration", self.duration, 33)
    }
}
