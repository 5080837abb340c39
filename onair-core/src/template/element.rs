//! Schedule elements and the time-advancing scheduling algorithm.
//!
//! Each element consumes part of a timeslot starting at the session-relative
//! cursor `now` and returns the segments it produced per room together with
//! the advanced cursor. Scheduling is pure: the same catalog, rooms, context
//! and cursor always give the same result.

use chrono::{DateTime, FixedOffset, TimeDelta};
use tracing::debug;

use super::context::{ScheduleContext, TitleTemplate};
use crate::Result;
use crate::diagnostics::{DataQualityWarning, Diagnostics};
use crate::error::DataConsistencyError;
use crate::model::{Room, RoomSegments, ScheduledSegment, SegmentKind, merge_room_segments};

/// Where a pre-recorded element takes its title and duration from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrerecordedSource {
    /// Title is the asset name; duration comes from the asset
    Asset,
    /// Rebroadcast of a whole slot; duration is the slot span
    Mirror,
    /// Title rendered from a template; duration comes from the asset
    Titled(TitleTemplate),
}

/// One step of a format template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleElement {
    /// Live feed for the rest of the timeslot
    Live {
        source: TitleTemplate,
        plenary: bool,
        recording: Option<TitleTemplate>,
    },
    /// Pre-recorded video, falling back to `backup` when its length is unknown
    Prerecorded {
        source: PrerecordedSource,
        plenary: bool,
        backup: Vec<ScheduleElement>,
    },
    /// Off air until the end of the timeslot
    NotStreamed,
}

type Cursor = DateTime<FixedOffset>;

impl ScheduleElement {
    pub fn live(source: TitleTemplate) -> Self {
        ScheduleElement::Live {
            source,
            plenary: false,
            recording: None,
        }
    }

    pub fn prerecorded(source: PrerecordedSource) -> Self {
        ScheduleElement::Prerecorded {
            source,
            plenary: false,
            backup: Vec::new(),
        }
    }

    /// Marks a live or pre-recorded element as fanned out to every room.
    pub fn plenary(mut self) -> Self {
        match &mut self {
            ScheduleElement::Live { plenary, .. } | ScheduleElement::Prerecorded { plenary, .. } => {
                *plenary = true
            }
            ScheduleElement::NotStreamed => {}
        }
        self
    }

    /// Sets the recording name template of a live element.
    pub fn recorded_as(mut self, template: TitleTemplate) -> Self {
        if let ScheduleElement::Live { recording, .. } = &mut self {
            *recording = Some(template);
        }
        self
    }

    /// Sets the fallback chain of a pre-recorded element.
    pub fn with_backup(mut self, elements: Vec<ScheduleElement>) -> Self {
        if let ScheduleElement::Prerecorded { backup, .. } = &mut self {
            *backup = elements;
        }
        self
    }

    pub fn is_plenary(&self) -> bool {
        match self {
            ScheduleElement::Live { plenary, .. } | ScheduleElement::Prerecorded { plenary, .. } => {
                *plenary
            }
            ScheduleElement::NotStreamed => false,
        }
    }

    /// Schedules this element at `now`.
    ///
    /// # Errors
    ///
    /// - `DataConsistencyError::UnmappedEvent` - Pre-recorded slot has no asset
    /// - `DataConsistencyError::PlenaryDivergence` - Fan-out rooms disagree on duration
    /// - `DataConsistencyError::UnknownRoom` - Session room is not registered
    /// - `ConfigurationError::MissingZoomBinding` - Title needs an absent zoom instance
    pub fn schedule(
        &self,
        context: &ScheduleContext<'_>,
        now: Cursor,
        diagnostics: &mut Diagnostics,
    ) -> Result<(RoomSegments, Cursor)> {
        match self {
            ScheduleElement::Live {
                source,
                plenary,
                recording,
            } => schedule_live(context, now, source, *plenary, recording.as_ref(), diagnostics),
            ScheduleElement::Prerecorded {
                source,
                plenary,
                backup,
            } => schedule_prerecorded(context, now, source, *plenary, backup, diagnostics),
            ScheduleElement::NotStreamed => {
                debug!(
                    slot_id = %context.timeslot.slot_id,
                    "Not streamed until {}", context.timeslot.end
                );
                Ok((RoomSegments::new(), context.timeslot.end))
            }
        }
    }
}

/// Schedules a list of elements back to back from `now`.
///
/// # Errors
///
/// Propagates the first error of any element.
pub fn schedule_elements(
    elements: &[ScheduleElement],
    context: &ScheduleContext<'_>,
    mut now: Cursor,
    diagnostics: &mut Diagnostics,
) -> Result<(RoomSegments, Cursor)> {
    let mut scheduled = RoomSegments::new();
    for element in elements {
        let (segments, next) = element.schedule(context, now, diagnostics)?;
        merge_room_segments(&mut scheduled, segments);
        now = next;
    }
    Ok((scheduled, now))
}

fn remaining(context: &ScheduleContext<'_>, now: Cursor) -> TimeDelta {
    (context.timeslot.end - now).max(TimeDelta::zero())
}

fn schedule_live(
    context: &ScheduleContext<'_>,
    now: Cursor,
    source: &TitleTemplate,
    plenary: bool,
    recording: Option<&TitleTemplate>,
    diagnostics: &mut Diagnostics,
) -> Result<(RoomSegments, Cursor)> {
    let duration = remaining(context, now);
    let mut recording_name = None;

    fan_out(context, now, plenary, diagnostics, |room, first| {
        // One recording per fan-out group, attached to the first room.
        if first && let Some(template) = recording {
            recording_name = Some(template.render(context, room)?);
        }
        let title = source.render(context, room)?;
        let segment = ScheduledSegment::new(SegmentKind::Live, title, room.live.clone(), now, duration)
            .with_origin(context.timeslot.reference(&context.session.id))
            .with_recording(if first { recording_name.clone() } else { None });
        Ok((segment, now + duration))
    })
}

fn schedule_prerecorded(
    context: &ScheduleContext<'_>,
    now: Cursor,
    source: &PrerecordedSource,
    plenary: bool,
    backup: &[ScheduleElement],
    diagnostics: &mut Diagnostics,
) -> Result<(RoomSegments, Cursor)> {
    let timeslot = context.timeslot;
    let asset = context
        .catalog
        .get(&timeslot.event_id)
        .ok_or_else(|| DataConsistencyError::UnmappedEvent {
            event_id: timeslot.event_id.clone(),
        })?;
    let window = remaining(context, now);

    let duration = match (source, asset.duration) {
        (PrerecordedSource::Mirror, _) => timeslot.span().min(window),
        (_, Some(known)) => known.min(window),
        (_, None) if !backup.is_empty() => {
            debug!(
                event_id = %timeslot.event_id,
                "Asset duration unknown, delegating to {} backup element(s)",
                backup.len()
            );
            return schedule_elements(backup, context, now, diagnostics);
        }
        (_, None) => {
            diagnostics.record(DataQualityWarning::UnknownAssetDuration {
                event_id: timeslot.event_id.clone(),
                slot_id: timeslot.slot_id.clone(),
                fallback_ms: window.num_milliseconds(),
            });
            window
        }
    };

    fan_out(context, now, plenary, diagnostics, |room, _| {
        let title = match source {
            PrerecordedSource::Asset | PrerecordedSource::Mirror => asset.name.clone(),
            PrerecordedSource::Titled(template) => template.render(context, room)?,
        };
        let segment = ScheduledSegment::new(
            SegmentKind::Prerecorded,
            title,
            asset.name.clone(),
            now,
            duration,
        )
        .with_origin(timeslot.reference(&context.session.id))
        .with_asset_duration(asset.duration);
        Ok((segment, now + duration))
    })
}

/// Runs `schedule_one` for every target room and checks plenary consistency.
///
/// Plenary elements target every registered room with the same cursor;
/// others only the session's room. Every room must agree on the duration and
/// the advanced cursor. Segments with no air time are dropped: the cursor
/// still advances, but nothing is emitted.
fn fan_out(
    context: &ScheduleContext<'_>,
    now: Cursor,
    plenary: bool,
    diagnostics: &mut Diagnostics,
    mut schedule_one: impl FnMut(&Room, bool) -> Result<(ScheduledSegment, Cursor)>,
) -> Result<(RoomSegments, Cursor)> {
    let targets: Vec<&Room> = if plenary {
        context.rooms.iter().collect()
    } else {
        vec![context.home_room()?]
    };

    let mut scheduled = RoomSegments::new();
    let mut agreed: Option<(TimeDelta, Cursor)> = None;
    for (index, room) in targets.into_iter().enumerate() {
        let (segment, next) = schedule_one(room, index == 0)?;

        // Callers share one duration across rooms today; this catches a
        // closure that starts resolving durations per room.
        match agreed {
            None => agreed = Some((segment.duration, next)),
            Some((duration, cursor)) if duration != segment.duration || cursor != next => {
                return Err(DataConsistencyError::PlenaryDivergence {
                    event_id: context.timeslot.event_id.clone(),
                    room: room.name.clone(),
                    expected: format!("{duration} until {cursor}"),
                    actual: format!("{} until {next}", segment.duration),
                }
                .into());
            }
            Some(_) => {}
        }

        if segment.duration.is_zero() {
            debug!(
                room = %room.name,
                "Dropping empty {} segment for {} at {}", segment.kind, context.timeslot.slot_id, segment.start
            );
            continue;
        }

        if segment.title.trim().is_empty() {
            diagnostics.record(DataQualityWarning::EmptyTitle {
                room: room.name.clone(),
                slot_id: Some(context.timeslot.slot_id.clone()),
            });
        }

        debug!(
            room = %room.name,
            kind = %segment.kind,
            title = %segment.title,
            "Scheduled {} at {} for {}", context.timeslot.slot_id, segment.start, segment.duration
        );
        scheduled.entry(room.name.clone()).or_default().push(segment);
    }

    let (_, next) = agreed.unwrap_or((TimeDelta::zero(), now));
    Ok((scheduled, next))
}
