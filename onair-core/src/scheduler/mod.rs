//! Track and conference scheduling.
//!
//! Sessions are independent units of work: each is scheduled against the
//! read-only room, asset and track tables, and the per-room results are merged
//! using the stable segment order so worker completion order never matters.

mod conference;
mod mirror;
mod track;

pub use conference::{ConferenceScheduler, SessionSchedule};
pub use mirror::MirrorWindow;
pub use track::TrackScheduler;
