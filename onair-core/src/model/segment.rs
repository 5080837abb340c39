//! Scheduled output segments.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};

use super::session::TimeslotRef;

/// What the playout device does for the length of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Switch to a live or video-conference feed
    #[serde(rename = "LIVE")]
    Live,
    /// Play a pre-recorded asset
    #[serde(rename = "PROGRAM")]
    Prerecorded,
    /// Play the room's filler feed
    #[serde(rename = "FILLER")]
    Filler,
}

impl SegmentKind {
    /// Playout category label.
    pub fn category(self) -> &'static str {
        match self {
            SegmentKind::Live => "LIVE",
            SegmentKind::Prerecorded => "PROGRAM",
            SegmentKind::Filler => "FILLER",
        }
    }
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.category())
    }
}

/// One atomic unit of a room's playlist.
///
/// Created by element scheduling; only the compactor changes `start` and
/// `duration` afterwards. Duration is never negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledSegment {
    pub kind: SegmentKind,
    pub title: String,
    /// Feed id or asset name handed to the playout device
    pub source: String,
    pub start: DateTime<FixedOffset>,
    pub duration: TimeDelta,
    /// Originating slot; `None` for fillers
    pub origin: Option<TimeslotRef>,
    pub recording: Option<String>,
    /// Full running time of the underlying asset, when known
    pub asset_duration: Option<TimeDelta>,
}

/// Per-room segment lists keyed by room name.
pub type RoomSegments = BTreeMap<String, Vec<ScheduledSegment>>;

impl ScheduledSegment {
    /// Creates a segment; negative durations are clamped to zero.
    pub fn new(
        kind: SegmentKind,
        title: impl Into<String>,
        source: impl Into<String>,
        start: DateTime<FixedOffset>,
        duration: TimeDelta,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            source: source.into(),
            start,
            duration: duration.max(TimeDelta::zero()),
            origin: None,
            recording: None,
            asset_duration: None,
        }
    }

    pub fn with_origin(mut self, origin: TimeslotRef) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_recording(mut self, recording: Option<String>) -> Self {
        self.recording = recording;
        self
    }

    pub fn with_asset_duration(mut self, asset_duration: Option<TimeDelta>) -> Self {
        self.asset_duration = asset_duration;
        self
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.start + self.duration
    }

    pub fn session_id(&self) -> Option<&str> {
        self.origin.as_ref().map(|origin| origin.session_id.as_str())
    }

    pub fn slot_id(&self) -> Option<&str> {
        self.origin.as_ref().map(|origin| origin.slot_id.as_str())
    }

    /// Unplayed asset time this segment could still air.
    ///
    /// Only pre-recorded segments with a known asset duration longer than
    /// their allotment have slack.
    pub fn slack(&self) -> TimeDelta {
        match (self.kind, self.asset_duration) {
            (SegmentKind::Prerecorded, Some(asset)) if asset > self.duration => {
                asset - self.duration
            }
            _ => TimeDelta::zero(),
        }
    }

    /// Extends the segment into up to `gap` of following dead air.
    ///
    /// Returns how much was absorbed: `min(gap, slack)`, or zero for live
    /// and filler segments.
    pub fn offer(&mut self, gap: TimeDelta) -> TimeDelta {
        if gap <= TimeDelta::zero() {
            return TimeDelta::zero();
        }
        let absorbed = gap.min(self.slack());
        self.duration += absorbed;
        absorbed
    }

    /// Stable ordering key: start, then end, then slot id.
    ///
    /// Ordering by end before slot id keeps an empty segment ahead of one
    /// that starts at the same instant, whatever the slot ids look like.
    pub fn sort_key(&self) -> (DateTime<FixedOffset>, DateTime<FixedOffset>, &str) {
        (self.start, self.end(), self.slot_id().unwrap_or(""))
    }
}

/// Sorts a room's segments by their stable ordering key.
pub(crate) fn sort_segments(segments: &mut [ScheduledSegment]) {
    segments.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Appends every room list of `from` onto the matching list of `into`.
pub fn merge_room_segments(into: &mut RoomSegments, from: RoomSegments) {
    for (room, segments) in from {
        into.entry(room).or_default().extend(segments);
    }
}
