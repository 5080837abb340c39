//! End-to-end pipeline from sessions to validated room playlists.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::info;

use super::export::RoomPlaylist;
use super::filler::FillerInserter;
use super::validator::{PlaylistValidator, ValidationReport};
use crate::Result;
use crate::config::OnairConfig;
use crate::diagnostics::{DataQualityWarning, Diagnostics};
use crate::error::DataConsistencyError;
use crate::model::{RoomSegments, ScheduledSegment, Session};
use crate::scheduler::{ConferenceScheduler, SessionSchedule};

/// The final per-room schedule with everything learned while building it.
#[derive(Debug, Clone)]
pub struct ConferenceSchedule {
    pub rooms: RoomSegments,
    pub diagnostics: Diagnostics,
    pub validation: ValidationReport,
    /// Filler segments inserted
    pub fillers: usize,
    /// Sessions held in rooms that are not broadcast
    pub skipped_sessions: Vec<String>,
}

impl ConferenceSchedule {
    pub fn room(&self, name: &str) -> Option<&[ScheduledSegment]> {
        self.rooms.get(name).map(Vec::as_slice)
    }

    pub fn segment_count(&self) -> usize {
        self.rooms.values().map(Vec::len).sum()
    }

    pub fn playlists(&self, frame_rate: u32) -> Vec<RoomPlaylist> {
        self.rooms
            .iter()
            .map(|(room, segments)| RoomPlaylist::from_segments(room.clone(), segments, frame_rate))
            .collect()
    }
}

/// Scheduling, merge, filler insertion and validation in one run.
pub struct PlaylistPipeline {
    scheduler: Arc<ConferenceScheduler>,
    config: OnairConfig,
    validator: PlaylistValidator,
}

impl PlaylistPipeline {
    pub fn new(scheduler: ConferenceScheduler, config: OnairConfig) -> Self {
        Self {
            scheduler: Arc::new(scheduler),
            config,
            validator: PlaylistValidator::new(),
        }
    }

    pub fn scheduler(&self) -> &ConferenceScheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &OnairConfig {
        &self.config
    }

    /// Runs concurrently or sequentially as configured.
    ///
    /// # Errors
    ///
    /// Any configuration or data consistency error aborts the run.
    pub async fn execute(&self, sessions: Vec<Session>) -> Result<ConferenceSchedule> {
        if self.config.scheduling.parallel {
            self.run_concurrent(sessions).await
        } else {
            self.run(&sessions)
        }
    }

    /// Schedules sessions one after another.
    ///
    /// # Errors
    ///
    /// Any configuration or data consistency error aborts the run.
    pub fn run(&self, sessions: &[Session]) -> Result<ConferenceSchedule> {
        let (admitted, skipped, diagnostics) = self.admit(sessions.to_vec())?;
        let schedules = self.scheduler.schedule_all(&admitted)?;
        Ok(self.finish(schedules, skipped, diagnostics))
    }

    /// Schedules sessions on worker threads; output equals [`Self::run`].
    ///
    /// # Errors
    ///
    /// Any configuration or data consistency error aborts the run.
    pub async fn run_concurrent(&self, sessions: Vec<Session>) -> Result<ConferenceSchedule> {
        let (admitted, skipped, diagnostics) = self.admit(sessions)?;
        let schedules = Arc::clone(&self.scheduler)
            .schedule_all_concurrent(admitted)
            .await?;
        Ok(self.finish(schedules, skipped, diagnostics))
    }

    /// Reports asset coverage and drops sessions held in unbroadcast rooms.
    fn admit(&self, sessions: Vec<Session>) -> Result<(Vec<Session>, Vec<String>, Diagnostics)> {
        let mut diagnostics = Diagnostics::new();

        let coverage = self.scheduler.catalog().coverage(&sessions);
        if !coverage.unscheduled_assets.is_empty() {
            diagnostics.record(DataQualityWarning::UnscheduledAssets {
                count: coverage.unscheduled_assets.len(),
            });
        }
        if !coverage.unmapped_timeslots.is_empty() {
            diagnostics.record(DataQualityWarning::UnmappedTimeslots {
                count: coverage.unmapped_timeslots.len(),
            });
        }

        let rooms = self.scheduler.rooms();
        let mut admitted = Vec::with_capacity(sessions.len());
        let mut skipped = Vec::new();
        for session in sessions {
            if rooms.contains(&session.room) {
                admitted.push(session);
                continue;
            }
            if self.config.scheduling.reject_unknown_rooms {
                return Err(DataConsistencyError::UnknownRoom {
                    session_id: session.id,
                    room: session.room,
                }
                .into());
            }
            diagnostics.record(DataQualityWarning::SkippedSession {
                session_id: session.id.clone(),
                room: session.room.clone(),
            });
            skipped.push(session.id);
        }

        info!(
            "Scheduling {} sessions ({} skipped)",
            admitted.len(),
            skipped.len()
        );
        Ok((admitted, skipped, diagnostics))
    }

    fn finish(
        &self,
        schedules: Vec<SessionSchedule>,
        skipped_sessions: Vec<String>,
        mut diagnostics: Diagnostics,
    ) -> ConferenceSchedule {
        let compacted: HashSet<String> = schedules
            .iter()
            .filter(|schedule| schedule.compacted)
            .map(|schedule| schedule.session_id.clone())
            .collect();

        let (mut rooms, session_diagnostics) = ConferenceScheduler::merge(schedules);
        diagnostics.absorb(session_diagnostics);

        let fillers = FillerInserter::new(&self.config.playout).fill(
            self.scheduler.rooms(),
            &mut rooms,
            &compacted,
        );

        let validation = self.validator.validate(&rooms);
        for warning in validation.issues().iter().filter_map(|issue| issue.to_warning()) {
            diagnostics.record(warning);
        }
        for gap in validation.gaps() {
            info!("{gap}");
        }

        report_duplicate_recordings(&rooms, &mut diagnostics);
        for room in self.scheduler.rooms().names() {
            if rooms.get(room).is_none_or(Vec::is_empty) {
                diagnostics.record(DataQualityWarning::EmptyRoom {
                    room: room.to_string(),
                });
            }
        }

        let schedule = ConferenceSchedule {
            rooms,
            diagnostics,
            validation,
            fillers,
            skipped_sessions,
        };
        info!(
            "Built {} segments in {} rooms ({} fillers, {} warnings)",
            schedule.segment_count(),
            schedule.rooms.len(),
            schedule.fillers,
            schedule.diagnostics.len()
        );
        schedule
    }
}

fn report_duplicate_recordings(rooms: &RoomSegments, diagnostics: &mut Diagnostics) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in rooms
        .values()
        .flatten()
        .filter_map(|segment| segment.recording.as_deref())
    {
        *counts.entry(name).or_default() += 1;
    }
    for (name, occurrences) in counts {
        if occurrences > 1 {
            diagnostics.record(DataQualityWarning::DuplicateRecordingName {
                name: name.to_string(),
                occurrences,
            });
        }
    }
}
