//! Format templates and the elements they schedule.
//!
//! A track owns an ordered list of [`FormatTemplate`]s. The first whose guard
//! matches a timeslot decides how that slot is filled.

mod context;
mod element;
mod format;
mod guard;

pub use context::{ScheduleContext, TitleTemplate, ZoomBinding};
pub use element::{PrerecordedSource, ScheduleElement, schedule_elements};
pub use format::FormatTemplate;
pub use guard::{GuardCondition, GuardPredicate};
