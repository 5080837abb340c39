//! Filler insertion between sessions.

use std::collections::HashSet;

use chrono::TimeDelta;
use tracing::debug;

use crate::config::{FillerPolicy, PlayoutConfig};
use crate::model::{Room, RoomRegistry, RoomSegments, ScheduledSegment, SegmentKind, sort_segments};

/// Closes dead air with the room's filler feed.
///
/// A gap is filled when it separates two different sessions, or, under
/// [`FillerPolicy::AllGaps`], when it lies inside a session whose track does
/// not compact. Compacted sessions are never filled internally.
#[derive(Debug, Clone)]
pub struct FillerInserter {
    prefix: String,
    policy: FillerPolicy,
    min_gap: TimeDelta,
}

impl FillerInserter {
    pub fn new(config: &PlayoutConfig) -> Self {
        Self {
            prefix: config.filler_prefix.clone(),
            policy: config.filler_policy,
            min_gap: config.min_filler,
        }
    }

    /// Fills one room's segments; returns the number of fillers added.
    pub fn fill_room(
        &self,
        room: &Room,
        segments: &mut Vec<ScheduledSegment>,
        compacted_sessions: &HashSet<String>,
    ) -> usize {
        sort_segments(segments);

        let mut fillers = Vec::new();
        let Some(mut reach) = segments.first() else {
            return 0;
        };
        // Dead air starts where the furthest-reaching earlier segment ends.
        for next in &segments[1..] {
            let gap = next.start - reach.end();
            if gap > self.min_gap && self.may_fill(reach, next, compacted_sessions) {
                debug!(
                    room = %room.name,
                    "Filling {}s of dead air at {}", gap.num_seconds(), reach.end()
                );
                fillers.push(ScheduledSegment::new(
                    SegmentKind::Filler,
                    format!("{}{}", self.prefix, room.name),
                    room.filler.clone(),
                    reach.end(),
                    gap,
                ));
            }
            if next.end() > reach.end() {
                reach = next;
            }
        }

        let added = fillers.len();
        if added > 0 {
            segments.extend(fillers);
            sort_segments(segments);
        }
        added
    }

    /// Fills every room of the registry that has segments.
    pub fn fill(
        &self,
        rooms: &RoomRegistry,
        schedule: &mut RoomSegments,
        compacted_sessions: &HashSet<String>,
    ) -> usize {
        let mut added = 0;
        for (name, segments) in schedule.iter_mut() {
            match rooms.get(name) {
                Some(room) => added += self.fill_room(room, segments, compacted_sessions),
                None => debug!(room = %name, "No filler feed for unregistered room"),
            }
        }
        added
    }

    fn may_fill(
        &self,
        prev: &ScheduledSegment,
        next: &ScheduledSegment,
        compacted_sessions: &HashSet<String>,
    ) -> bool {
        match (prev.session_id(), next.session_id()) {
            (Some(a), Some(b)) if a == b => {
                self.policy == FillerPolicy::AllGaps && !compacted_sessions.contains(a)
            }
            _ => true,
        }
    }
}
