//! Onair Core - Conference broadcast playlist scheduling
//!
//! This crate turns a conference timetable, a catalog of pre-recorded assets and
//! a set of per-track format templates into one gapless, non-overlapping
//! playout sequence per physical room: template resolution, element scheduling,
//! compaction, filler insertion and validation.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod input;
pub mod model;
pub mod playlist;
pub mod scheduler;
pub mod template;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::{FillerPolicy, OnairConfig};
pub use diagnostics::{DataQualityWarning, Diagnostics};
pub use error::{ConfigurationError, DataConsistencyError};
pub use input::{ConferencePlan, InputError, PlanDocument};
pub use model::{
    AssetCatalog, AssetRecord, Room, RoomRegistry, RoomSegments, ScheduledSegment, SegmentKind,
    Session, Timecode, Timeslot, TimeslotRef,
};
pub use playlist::{
    ConferenceSchedule, FillerInserter, PlaylistCompactor, PlaylistEntry, PlaylistIssue,
    PlaylistPipeline, PlaylistValidator, RoomPlaylist, ValidationReport,
};
pub use scheduler::{ConferenceScheduler, MirrorWindow, SessionSchedule, TrackScheduler};
pub use template::{
    FormatTemplate, GuardCondition, GuardPredicate, PrerecordedSource, ScheduleElement,
    ZoomBinding,
};

/// Errors that abort a scheduling run.
///
/// A malformed schedule never yields a partial broadcast plan: every variant
/// here stops the run. Recoverable data problems are reported through
/// [`Diagnostics`] instead.
#[derive(Debug, thiserror::Error)]
pub enum OnairError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Data consistency error: {0}")]
    DataConsistency(#[from] DataConsistencyError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scheduling worker failed: {reason}")]
    Worker { reason: String },
}

impl OnairError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            OnairError::Configuration(e) => match e {
                ConfigurationError::NoMatchingTemplate { title, tracks, .. } => {
                    format!("No format template matches '{title}' in tracks {tracks:?}")
                }
                ConfigurationError::NoTrackForSession { session_id, .. } => {
                    format!("Session {session_id} does not belong to any configured track")
                }
                ConfigurationError::DuplicateTrack { track } => {
                    format!("Track '{track}' is defined more than once")
                }
                _ => "Format template configuration is invalid".to_string(),
            },
            OnairError::DataConsistency(DataConsistencyError::UnmappedEvent { event_id }) => {
                format!("Event {event_id} needs a pre-recorded video but has none")
            }
            OnairError::DataConsistency(_) => "Schedule data is inconsistent".to_string(),
            OnairError::Input(e) => format!("Could not read plan: {e}"),
            OnairError::Io(_) => "File system error occurred".to_string(),
            OnairError::Worker { .. } => "Scheduling was interrupted".to_string(),
        }
    }

    /// Checks if this error is caused by the supplied plan rather than a bug.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            OnairError::Configuration(_) | OnairError::DataConsistency(_) | OnairError::Input(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, OnairError>;
