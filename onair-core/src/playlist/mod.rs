//! Post-scheduling stages: compaction, filler insertion, validation and export.

mod compactor;
mod export;
mod filler;
mod pipeline;
mod validator;

pub use compactor::{CompactionReport, PlaylistCompactor};
pub use export::{PlaylistEntry, RoomPlaylist};
pub use filler::FillerInserter;
pub use pipeline::{ConferenceSchedule, PlaylistPipeline};
pub use validator::{
    NoGapInvariant, NoOverlapInvariant, PlaylistInvariant, PlaylistIssue, PlaylistValidator,
    ValidationReport,
};
