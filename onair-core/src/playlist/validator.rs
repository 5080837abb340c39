//! Final per-room playlist checks.
//!
//! Validation is diagnostic only: issues are reported, never corrected.

use std::fmt;

use chrono::{DateTime, FixedOffset, TimeDelta};

use crate::diagnostics::DataQualityWarning;
use crate::model::{RoomSegments, ScheduledSegment, sort_segments};

/// A broadcast invariant violated by a room's playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistIssue {
    /// `second` starts before `first` ends
    Overlap {
        room: String,
        first: String,
        second: String,
        first_end: DateTime<FixedOffset>,
        second_start: DateTime<FixedOffset>,
    },
    /// Nothing is on air between `after` and `before`
    Gap {
        room: String,
        after: String,
        before: String,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },
}

impl PlaylistIssue {
    pub fn room(&self) -> &str {
        match self {
            PlaylistIssue::Overlap { room, .. } | PlaylistIssue::Gap { room, .. } => room,
        }
    }

    /// Length of the overlap or gap.
    pub fn length(&self) -> TimeDelta {
        match self {
            PlaylistIssue::Overlap {
                first_end,
                second_start,
                ..
            } => *first_end - *second_start,
            PlaylistIssue::Gap { start, end, .. } => *end - *start,
        }
    }

    pub fn is_overlap(&self) -> bool {
        matches!(self, PlaylistIssue::Overlap { .. })
    }

    /// Overlaps surface as data-quality warnings; gaps are informational.
    pub fn to_warning(&self) -> Option<DataQualityWarning> {
        match self {
            PlaylistIssue::Overlap {
                room,
                first,
                second,
                ..
            } => Some(DataQualityWarning::Overlap {
                room: room.clone(),
                first: first.clone(),
                second: second.clone(),
                overlap_ms: self.length().num_milliseconds(),
            }),
            PlaylistIssue::Gap { .. } => None,
        }
    }
}

impl fmt::Display for PlaylistIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaylistIssue::Overlap {
                room,
                first,
                second,
                first_end,
                second_start,
            } => write!(
                f,
                "[{room}] overlap: '{first}' ends {first_end} but '{second}' starts {second_start}"
            ),
            PlaylistIssue::Gap {
                room,
                after,
                before,
                start,
                end,
            } => write!(
                f,
                "[{room}] gap of {}s between '{after}' ({start}) and '{before}' ({end})",
                (*end - *start).num_seconds()
            ),
        }
    }
}

/// A check over one room's segments sorted by start.
pub trait PlaylistInvariant: Send + Sync {
    /// Returns every violation in the room.
    fn check(&self, room: &str, segments: &[ScheduledSegment]) -> Vec<PlaylistIssue>;

    /// Returns name of this invariant.
    fn name(&self) -> &str;
}

/// Adjacent segments must not overlap.
pub struct NoOverlapInvariant;

impl PlaylistInvariant for NoOverlapInvariant {
    fn check(&self, room: &str, segments: &[ScheduledSegment]) -> Vec<PlaylistIssue> {
        segments
            .windows(2)
            .filter(|pair| pair[1].start < pair[0].end())
            .map(|pair| PlaylistIssue::Overlap {
                room: room.to_string(),
                first: pair[0].title.clone(),
                second: pair[1].title.clone(),
                first_end: pair[0].end(),
                second_start: pair[1].start,
            })
            .collect()
    }

    fn name(&self) -> &str {
        "NoOverlap"
    }
}

/// Every segment must start by the furthest end seen so far, up to a tolerance.
pub struct NoGapInvariant {
    tolerance: TimeDelta,
}

impl NoGapInvariant {
    /// Creates invariant ignoring gaps no longer than `tolerance`.
    pub fn new(tolerance: TimeDelta) -> Self {
        Self { tolerance }
    }
}

impl PlaylistInvariant for NoGapInvariant {
    fn check(&self, room: &str, segments: &[ScheduledSegment]) -> Vec<PlaylistIssue> {
        let mut issues = Vec::new();
        let Some(mut reach) = segments.first() else {
            return issues;
        };
        for next in &segments[1..] {
            if next.start - reach.end() > self.tolerance {
                issues.push(PlaylistIssue::Gap {
                    room: room.to_string(),
                    after: reach.title.clone(),
                    before: next.title.clone(),
                    start: reach.end(),
                    end: next.start,
                });
            }
            if next.end() > reach.end() {
                reach = next;
            }
        }
        issues
    }

    fn name(&self) -> &str {
        "NoGap"
    }
}

/// Issues found across all rooms, in room order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<PlaylistIssue>,
}

impl ValidationReport {
    pub fn issues(&self) -> &[PlaylistIssue] {
        &self.issues
    }

    pub fn overlaps(&self) -> impl Iterator<Item = &PlaylistIssue> {
        self.issues.iter().filter(|issue| issue.is_overlap())
    }

    pub fn gaps(&self) -> impl Iterator<Item = &PlaylistIssue> {
        self.issues.iter().filter(|issue| !issue.is_overlap())
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.issues.extend(other.issues);
    }
}

/// Runs a set of invariants over every room.
pub struct PlaylistValidator {
    invariants: Vec<Box<dyn PlaylistInvariant>>,
}

impl Default for PlaylistValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaylistValidator {
    /// Validator checking for overlaps and any gap at all.
    pub fn new() -> Self {
        Self::empty()
            .with_invariant(NoOverlapInvariant)
            .with_invariant(NoGapInvariant::new(TimeDelta::zero()))
    }

    /// Validator without invariants.
    pub fn empty() -> Self {
        Self {
            invariants: Vec::new(),
        }
    }

    pub fn with_invariant(mut self, invariant: impl PlaylistInvariant + 'static) -> Self {
        self.invariants.push(Box::new(invariant));
        self
    }

    pub fn invariant_names(&self) -> Vec<&str> {
        self.invariants.iter().map(|inv| inv.name()).collect()
    }

    /// Checks one room; the input order does not matter.
    pub fn validate_room(&self, room: &str, segments: &[ScheduledSegment]) -> ValidationReport {
        let mut sorted = segments.to_vec();
        sort_segments(&mut sorted);

        let issues = self
            .invariants
            .iter()
            .flat_map(|invariant| invariant.check(room, &sorted))
            .collect();
        ValidationReport { issues }
    }

    pub fn validate(&self, rooms: &RoomSegments) -> ValidationReport {
        let mut report = ValidationReport::default();
        for (room, segments) in rooms {
            report.extend(self.validate_room(room, segments));
        }
        report
    }
}
