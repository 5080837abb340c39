//! Frame-accurate timecodes for playout devices.

use std::fmt;

use chrono::{DateTime, FixedOffset, TimeDelta, Timelike};

/// A duration counted in whole frames at a fixed frame rate.
///
/// Renders as `HH:MM:SS:FF`. Hours are not wrapped at 24.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timecode {
    frames: i64,
    frame_rate: u32,
}

impl Timecode {
    /// Converts a duration to the nearest whole frame.
    pub fn from_duration(duration: TimeDelta, frame_rate: u32) -> Self {
        let frame_rate = frame_rate.max(1);
        let millis = i128::from(duration.num_milliseconds().max(0));
        let frames = (millis * i128::from(frame_rate) + 500) / 1000;
        Self {
            frames: frames as i64,
            frame_rate,
        }
    }

    pub fn frames(&self) -> i64 {
        self.frames
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Converts back to a duration, rounded to the millisecond.
    pub fn to_duration(&self) -> TimeDelta {
        let rate = i64::from(self.frame_rate);
        TimeDelta::milliseconds((self.frames * 1000 + rate / 2) / rate)
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rate = i64::from(self.frame_rate);
        let total_seconds = self.frames / rate;
        let frames = self.frames % rate;
        let hours = total_seconds / 3600;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}:{frames:02}")
    }
}

/// Formats an on-air start as `YYYY-MM-DDTHH:MM:SS:FF` in its own offset.
pub fn format_on_air(start: &DateTime<FixedOffset>, frame_rate: u32) -> String {
    let frame_rate = u64::from(frame_rate.max(1));
    let nanos = u64::from(start.nanosecond() % 1_000_000_000);
    let frame = nanos * frame_rate / 1_000_000_000;
    format!("{}:{frame:02}", start.format("%Y-%m-%dT%H:%M:%S"))
}
