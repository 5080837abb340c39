//! Conference-wide scheduling across tracks and sessions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info};

use super::mirror::MirrorWindow;
use super::track::TrackScheduler;
use crate::diagnostics::Diagnostics;
use crate::error::{ConfigurationError, DataConsistencyError};
use crate::model::{AssetCatalog, RoomRegistry, RoomSegments, Session, merge_room_segments, sort_segments};
use crate::{OnairError, Result};

/// One session's contribution to the conference schedule.
#[derive(Debug, Clone)]
pub struct SessionSchedule {
    pub session_id: String,
    pub segments: RoomSegments,
    pub diagnostics: Diagnostics,
    /// Whether the session's track compacted it
    pub compacted: bool,
}

/// Immutable registry of tracks, rooms and assets shared by every worker.
#[derive(Debug)]
pub struct ConferenceScheduler {
    tracks: HashMap<String, TrackScheduler>,
    rooms: RoomRegistry,
    catalog: AssetCatalog,
    mirroring: Option<MirrorWindow>,
}

impl ConferenceScheduler {
    /// Builds the scheduler.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::DuplicateTrack` - Two tracks share a name
    pub fn new(
        tracks: Vec<TrackScheduler>,
        rooms: RoomRegistry,
        catalog: AssetCatalog,
    ) -> std::result::Result<Self, ConfigurationError> {
        let mut registry = HashMap::with_capacity(tracks.len());
        for track in tracks {
            let name = track.name().to_string();
            if registry.contains_key(&name) {
                return Err(ConfigurationError::DuplicateTrack { track: name });
            }
            registry.insert(name, track);
        }

        info!(
            "Conference scheduler ready: {} tracks, {} rooms, {} assets",
            registry.len(),
            rooms.len(),
            catalog.len()
        );
        Ok(Self {
            tracks: registry,
            rooms,
            catalog,
            mirroring: None,
        })
    }

    pub fn with_mirroring(mut self, mirroring: Option<MirrorWindow>) -> Self {
        self.mirroring = mirroring;
        self
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    pub fn mirroring(&self) -> Option<&MirrorWindow> {
        self.mirroring.as_ref()
    }

    pub fn track(&self, name: &str) -> Option<&TrackScheduler> {
        self.tracks.get(name)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// The first of the session's tracks that has a scheduler.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::NoTrackForSession` - None of the session's tracks is registered
    pub fn track_for(
        &self,
        session: &Session,
    ) -> std::result::Result<&TrackScheduler, ConfigurationError> {
        session
            .tracks
            .iter()
            .find_map(|name| self.tracks.get(name))
            .ok_or_else(|| ConfigurationError::NoTrackForSession {
                session_id: session.id.clone(),
                tracks: session.tracks.clone(),
            })
    }

    /// Schedules one session.
    ///
    /// # Errors
    ///
    /// - `DataConsistencyError::InvalidTimeslot` - A slot ends before it starts
    /// - `DataConsistencyError::UnknownRoom` - Session room is not registered
    /// - `ConfigurationError::NoTrackForSession` - No track scheduler applies
    ///
    /// plus any template or element error.
    pub fn schedule(&self, session: &Session) -> Result<SessionSchedule> {
        session.validate()?;
        if !self.rooms.contains(&session.room) {
            return Err(DataConsistencyError::UnknownRoom {
                session_id: session.id.clone(),
                room: session.room.clone(),
            }
            .into());
        }
        let track = self.track_for(session)?;

        let mut diagnostics = Diagnostics::new();
        let segments = track.schedule(
            session,
            &self.rooms,
            &self.catalog,
            self.mirroring.as_ref(),
            &mut diagnostics,
        )?;

        debug!(
            session_id = %session.id,
            track = %track.name(),
            "Scheduled {} timeslots into {} rooms",
            session.timeslots.len(),
            segments.len()
        );
        Ok(SessionSchedule {
            session_id: session.id.clone(),
            segments,
            diagnostics,
            compacted: track.is_compacting(),
        })
    }

    /// Schedules sessions one after another, stopping at the first error.
    ///
    /// # Errors
    ///
    /// The first session error in input order.
    pub fn schedule_all(&self, sessions: &[Session]) -> Result<Vec<SessionSchedule>> {
        sessions.iter().map(|session| self.schedule(session)).collect()
    }

    /// Schedules every session on the blocking pool.
    ///
    /// Results are returned in input order whatever order the workers finish
    /// in. On failure the error of the earliest failing session is returned,
    /// matching [`Self::schedule_all`].
    ///
    /// # Errors
    ///
    /// - `OnairError::Worker` - A worker panicked or was cancelled
    ///
    /// plus the earliest session error.
    pub async fn schedule_all_concurrent(
        self: Arc<Self>,
        sessions: Vec<Session>,
    ) -> Result<Vec<SessionSchedule>> {
        let count = sessions.len();
        let mut workers = JoinSet::new();
        for (index, session) in sessions.into_iter().enumerate() {
            let scheduler = Arc::clone(&self);
            workers.spawn_blocking(move || (index, scheduler.schedule(&session)));
        }

        let mut results: Vec<Option<Result<SessionSchedule>>> =
            std::iter::repeat_with(|| None).take(count).collect();
        while let Some(joined) = workers.join_next().await {
            let (index, result) = joined.map_err(|e| OnairError::Worker {
                reason: e.to_string(),
            })?;
            results[index] = Some(result);
        }

        results
            .into_iter()
            .map(|result| {
                result.unwrap_or_else(|| {
                    Err(OnairError::Worker {
                        reason: "session result missing".to_string(),
                    })
                })
            })
            .collect()
    }

    /// Merges session schedules room by room in stable segment order.
    ///
    /// Diagnostics are concatenated in session order.
    pub fn merge(schedules: Vec<SessionSchedule>) -> (RoomSegments, Diagnostics) {
        let mut rooms = RoomSegments::new();
        let mut diagnostics = Diagnostics::new();
        for schedule in schedules {
            merge_room_segments(&mut rooms, schedule.segments);
            diagnostics.absorb(schedule.diagnostics);
        }
        for segments in rooms.values_mut() {
            sort_segments(segments);
        }
        (rooms, diagnostics)
    }
}
