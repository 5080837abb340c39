//! Immutable scheduling inputs and the segments produced from them.

mod asset;
mod room;
mod segment;
mod session;
mod timecode;

pub use asset::{AssetCatalog, AssetCoverage, AssetRecord};
pub use room::{Room, RoomRegistry};
pub(crate) use segment::sort_segments;
pub use segment::{RoomSegments, ScheduledSegment, SegmentKind, merge_room_segments};
pub use session::{Session, Timeslot, TimeslotRef};
pub use timecode::{Timecode, format_on_air};
