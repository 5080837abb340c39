//! Per-track scheduling of a session's timeslots.

use tracing::debug;

use super::mirror::MirrorWindow;
use crate::Result;
use crate::diagnostics::Diagnostics;
use crate::error::ConfigurationError;
use crate::model::{AssetCatalog, RoomRegistry, RoomSegments, Session, Timeslot, merge_room_segments};
use crate::playlist::PlaylistCompactor;
use crate::template::{FormatTemplate, ScheduleContext, ZoomBinding};

/// A named track: ordered format templates, zoom bindings and a compaction flag.
#[derive(Debug, Clone)]
pub struct TrackScheduler {
    name: String,
    templates: Vec<FormatTemplate>,
    zoom: Vec<ZoomBinding>,
    compact: bool,
}

impl TrackScheduler {
    pub fn new(name: impl Into<String>, templates: Vec<FormatTemplate>) -> Self {
        Self {
            name: name.into(),
            templates,
            zoom: Vec::new(),
            compact: false,
        }
    }

    pub fn with_zoom(mut self, zoom: Vec<ZoomBinding>) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_compaction(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn templates(&self) -> &[FormatTemplate] {
        &self.templates
    }

    pub fn zoom(&self) -> &[ZoomBinding] {
        &self.zoom
    }

    pub fn is_compacting(&self) -> bool {
        self.compact
    }

    /// First template whose guard holds for the timeslot.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::NoMatchingTemplate` - No guard matches
    pub fn select(
        &self,
        session: &Session,
        timeslot: &Timeslot,
        is_mirror: bool,
    ) -> std::result::Result<&FormatTemplate, ConfigurationError> {
        self.templates
            .iter()
            .find(|template| template.guard.matches(timeslot, is_mirror))
            .ok_or_else(|| ConfigurationError::NoMatchingTemplate {
                event_id: timeslot.event_id.clone(),
                slot_id: timeslot.slot_id.clone(),
                title: timeslot.title.clone(),
                tracks: if timeslot.tracks.is_empty() {
                    session.tracks.clone()
                } else {
                    timeslot.tracks.clone()
                },
            })
    }

    /// Schedules every timeslot of the session, compacting per room if enabled.
    ///
    /// # Errors
    ///
    /// Propagates template selection and element scheduling errors.
    pub fn schedule(
        &self,
        session: &Session,
        rooms: &RoomRegistry,
        catalog: &AssetCatalog,
        mirroring: Option<&MirrorWindow>,
        diagnostics: &mut Diagnostics,
    ) -> Result<RoomSegments> {
        let mut scheduled = RoomSegments::new();

        for timeslot in &session.timeslots {
            let is_mirror = MirrorWindow::is_mirror(mirroring, timeslot);
            let template = self.select(session, timeslot, is_mirror)?;
            debug!(
                track = %self.name,
                slot_id = %timeslot.slot_id,
                mirror = is_mirror,
                "Selected template [{}]", template.guard
            );

            let context = ScheduleContext {
                rooms,
                catalog,
                session,
                timeslot,
                track: &self.name,
                zoom: &self.zoom,
            };
            let (segments, _) = template.schedule(&context, diagnostics)?;
            merge_room_segments(&mut scheduled, segments);
        }

        if self.compact
            && let Some((_, window_end)) = session.window()
        {
            let compactor = PlaylistCompactor::new().with_window_end(window_end);
            for segments in scheduled.values_mut() {
                compactor.compact(segments);
            }
        }

        Ok(scheduled)
    }
}
