//! Lossless, serializable playlist rows for playout devices.

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::model::{ScheduledSegment, SegmentKind, Timecode, TimeslotRef, format_on_air};

/// One row of a room playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub category: SegmentKind,
    pub title: String,
    pub source: String,
    /// `YYYY-MM-DDTHH:MM:SS:FF` in the slot's local offset
    pub onair_time: String,
    /// `HH:MM:SS:FF`
    pub duration: String,
    pub start: DateTime<FixedOffset>,
    pub duration_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub recording: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_name: Option<String>,
}

impl PlaylistEntry {
    pub fn from_segment(segment: &ScheduledSegment, frame_rate: u32) -> Self {
        let origin = segment.origin.as_ref();
        Self {
            category: segment.kind,
            title: segment.title.clone(),
            source: segment.source.clone(),
            onair_time: format_on_air(&segment.start, frame_rate),
            duration: Timecode::from_duration(segment.duration, frame_rate).to_string(),
            start: segment.start,
            duration_ms: segment.duration.num_milliseconds(),
            event_id: origin.map(|o| o.event_id.clone()),
            slot_id: origin.map(|o| o.slot_id.clone()),
            session_id: origin.map(|o| o.session_id.clone()),
            recording: segment.recording.is_some(),
            recording_name: segment.recording.clone(),
        }
    }

    /// Rebuilds the segment. Asset durations are not part of the row.
    pub fn to_segment(&self) -> ScheduledSegment {
        let origin = match (&self.session_id, &self.event_id, &self.slot_id) {
            (Some(session_id), Some(event_id), Some(slot_id)) => Some(TimeslotRef {
                session_id: session_id.clone(),
                event_id: event_id.clone(),
                slot_id: slot_id.clone(),
            }),
            _ => None,
        };
        let mut segment = ScheduledSegment::new(
            self.category,
            self.title.clone(),
            self.source.clone(),
            self.start,
            TimeDelta::milliseconds(self.duration_ms),
        )
        .with_recording(self.recording_name.clone());
        segment.origin = origin;
        segment
    }
}

/// Everything one room's playout device airs, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPlaylist {
    pub room: String,
    pub frame_rate: u32,
    pub entries: Vec<PlaylistEntry>,
}

impl RoomPlaylist {
    pub fn from_segments(room: impl Into<String>, segments: &[ScheduledSegment], frame_rate: u32) -> Self {
        Self {
            room: room.into(),
            frame_rate,
            entries: segments
                .iter()
                .map(|segment| PlaylistEntry::from_segment(segment, frame_rate))
                .collect(),
        }
    }

    pub fn to_segments(&self) -> Vec<ScheduledSegment> {
        self.entries.iter().map(PlaylistEntry::to_segment).collect()
    }

    /// Total scheduled air time.
    pub fn total_duration(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.entries.iter().map(|e| e.duration_ms).sum())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
