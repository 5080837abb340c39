//! Fatal error taxonomy for template configuration and schedule data.

use thiserror::Error;

/// Problems with the format templates, tracks or rooms supplied at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Track '{track}' is defined more than once")]
    DuplicateTrack { track: String },

    #[error("Room '{room}' is defined more than once")]
    DuplicateRoom { room: String },

    #[error("Unrecognized schedule element type '{kind}' in track '{track}'")]
    UnknownElementType { kind: String, track: String },

    #[error("Live element in track '{track}' is missing its source")]
    MissingLiveSource { track: String },

    #[error(
        "No format template matches timeslot {event_id} (slot {slot_id}, '{title}') in tracks {tracks:?}"
    )]
    NoMatchingTemplate {
        event_id: String,
        slot_id: String,
        title: String,
        tracks: Vec<String>,
    },

    #[error("No track scheduler found for session {session_id} in tracks {tracks:?}")]
    NoTrackForSession {
        session_id: String,
        tracks: Vec<String>,
    },

    #[error("Track '{track}' has no zoom instance for room '{room}'")]
    MissingZoomBinding { track: String, room: String },

    #[error("Invalid title template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Invalid mirroring window: {reason}")]
    InvalidMirrorWindow { reason: String },
}

/// Schedule data that contradicts itself or the asset catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataConsistencyError {
    #[error("Playing a pre-recorded video for unmapped event {event_id}")]
    UnmappedEvent { event_id: String },

    #[error(
        "Plenary scheduling of event {event_id} diverged in room '{room}': expected {expected}, got {actual}"
    )]
    PlenaryDivergence {
        event_id: String,
        room: String,
        expected: String,
        actual: String,
    },

    #[error("Session {session_id} is assigned to unknown room '{room}'")]
    UnknownRoom { session_id: String, room: String },

    #[error("Timeslot {slot_id} is invalid: {reason}")]
    InvalidTimeslot { slot_id: String, reason: String },
}
