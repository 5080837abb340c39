//! Format templates: a guard plus the elements that fill a matching timeslot.

use chrono::{DateTime, FixedOffset};

use super::context::ScheduleContext;
use super::element::{ScheduleElement, schedule_elements};
use super::guard::GuardCondition;
use crate::Result;
use crate::diagnostics::Diagnostics;
use crate::model::RoomSegments;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTemplate {
    pub guard: GuardCondition,
    pub elements: Vec<ScheduleElement>,
}

impl FormatTemplate {
    pub fn new(guard: GuardCondition, elements: Vec<ScheduleElement>) -> Self {
        Self { guard, elements }
    }

    /// Schedules the template's elements from the start of the context timeslot.
    ///
    /// Returns the segments per room and the cursor after the last element,
    /// which never passes the end of the slot.
    pub fn schedule(
        &self,
        context: &ScheduleContext<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<(RoomSegments, DateTime<FixedOffset>)> {
        schedule_elements(&self.elements, context, context.timeslot.start, diagnostics)
    }
}
