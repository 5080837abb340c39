//! Sessions and the timeslots they are made of.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::DataConsistencyError;

/// Smallest nominally scheduled unit: one talk with a fixed start and end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeslot {
    pub event_id: String,
    pub slot_id: String,
    pub subevent_id: Option<String>,
    pub title: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// Explicitly marked as a rebroadcast
    pub mirror: bool,
    pub badges: BTreeSet<String>,
    pub tracks: Vec<String>,
}

impl Timeslot {
    /// Creates a timeslot with no badges, tracks or mirror flag.
    pub fn new(
        event_id: impl Into<String>,
        slot_id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            slot_id: slot_id.into(),
            subevent_id: None,
            title: title.into(),
            start,
            end,
            mirror: false,
            badges: BTreeSet::new(),
            tracks: Vec::new(),
        }
    }

    pub fn with_badge(mut self, badge: impl Into<String>) -> Self {
        self.badges.insert(badge.into());
        self
    }

    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.tracks.push(track.into());
        self
    }

    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn with_subevent(mut self, subevent_id: impl Into<String>) -> Self {
        self.subevent_id = Some(subevent_id.into());
        self
    }

    /// Nominal length of the slot.
    pub fn span(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Checks that the slot ends after it starts.
    ///
    /// # Errors
    ///
    /// - `DataConsistencyError::InvalidTimeslot` - End is not after start
    pub fn validate(&self) -> Result<(), DataConsistencyError> {
        if self.end <= self.start {
            return Err(DataConsistencyError::InvalidTimeslot {
                slot_id: self.slot_id.clone(),
                reason: format!("end {} is not after start {}", self.end, self.start),
            });
        }
        Ok(())
    }

    /// Reference carried by every segment scheduled from this slot.
    pub fn reference(&self, session_id: &str) -> TimeslotRef {
        TimeslotRef {
            session_id: session_id.to_string(),
            event_id: self.event_id.clone(),
            slot_id: self.slot_id.clone(),
        }
    }
}

/// Titled schedule block held in one room and belonging to one or more tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub room: String,
    pub tracks: Vec<String>,
    pub timeslots: Vec<Timeslot>,
}

impl Session {
    pub fn new(id: impl Into<String>, title: impl Into<String>, room: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            room: room.into(),
            tracks: Vec::new(),
            timeslots: Vec::new(),
        }
    }

    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.tracks.push(track.into());
        self
    }

    pub fn with_timeslot(mut self, timeslot: Timeslot) -> Self {
        self.timeslots.push(timeslot);
        self
    }

    /// Earliest start and latest end over all timeslots.
    pub fn window(&self) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        let start = self.timeslots.iter().map(|slot| slot.start).min()?;
        let end = self.timeslots.iter().map(|slot| slot.end).max()?;
        Some((start, end))
    }

    /// Validates every timeslot of the session.
    ///
    /// # Errors
    ///
    /// - `DataConsistencyError::InvalidTimeslot` - A slot ends before it starts
    pub fn validate(&self) -> Result<(), DataConsistencyError> {
        self.timeslots.iter().try_for_each(Timeslot::validate)
    }
}

/// Link from a scheduled segment back to the slot it was produced for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeslotRef {
    pub session_id: String,
    pub event_id: String,
    pub slot_id: String,
}
