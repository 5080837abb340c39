//! Non-fatal data-quality warnings collected during a run.
//!
//! Every warning is logged where it is detected and kept for the final report,
//! so fallbacks applied for bad data are surfaced for review instead of being
//! silently dropped.

use std::fmt;

use serde::Serialize;

/// A data problem that was worked around with an air-safe fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// Asset duration unknown and no backup chain; the whole remaining window was used
    UnknownAssetDuration {
        event_id: String,
        slot_id: String,
        fallback_ms: i64,
    },
    /// A segment was scheduled with an empty title
    EmptyTitle { room: String, slot_id: Option<String> },
    /// Two segments in one room overlap
    Overlap {
        room: String,
        first: String,
        second: String,
        overlap_ms: i64,
    },
    /// The same recording name is produced by more than one segment
    DuplicateRecordingName { name: String, occurrences: usize },
    /// Videos on file whose events are never scheduled
    UnscheduledAssets { count: usize },
    /// Scheduled events with no video on file
    UnmappedTimeslots { count: usize },
    /// Session held in a room that is not broadcast
    SkippedSession { session_id: String, room: String },
    /// A broadcast room received no segments at all
    EmptyRoom { room: String },
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAssetDuration {
                event_id,
                slot_id,
                fallback_ms,
            } => write!(
                f,
                "Unknown asset duration for event {event_id} (slot {slot_id}); using the remaining {}s of the slot",
                fallback_ms / 1000
            ),
            Self::EmptyTitle { room, slot_id } => match slot_id {
                Some(slot_id) => write!(f, "Segment for slot {slot_id} in '{room}' has an empty title"),
                None => write!(f, "Segment in '{room}' has an empty title"),
            },
            Self::Overlap {
                room,
                first,
                second,
                overlap_ms,
            } => write!(
                f,
                "Overlapping segments in '{room}': '{first}' runs over '{second}' by {}s",
                overlap_ms / 1000
            ),
            Self::DuplicateRecordingName { name, occurrences } => write!(
                f,
                "Recording name '{name}' is used by {occurrences} segments"
            ),
            Self::UnscheduledAssets { count } => write!(
                f,
                "There are {count} events in the asset mapping that are not scheduled"
            ),
            Self::UnmappedTimeslots { count } => write!(
                f,
                "There are {count} events in the schedule but not in the asset mapping"
            ),
            Self::SkippedSession { session_id, room } => write!(
                f,
                "Session {session_id} in unbroadcast room '{room}' was skipped"
            ),
            Self::EmptyRoom { room } => write!(f, "Room '{room}' has no scheduled segments"),
        }
    }
}

/// Ordered collection of warnings from one scheduling unit or a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    warnings: Vec<DataQualityWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs the warning and keeps it for the report.
    pub fn record(&mut self, warning: DataQualityWarning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Appends warnings that were already logged by another collector.
    pub fn absorb(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    pub fn warnings(&self) -> &[DataQualityWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<DataQualityWarning> {
        self.warnings
    }
}
