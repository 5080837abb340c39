//! Guard conditions selecting which format template governs a timeslot.
//!
//! A guard is a flat list of predicates that must all hold. Keeping the
//! predicates as plain values means a template can be printed, compared and
//! tested without running the scheduler.

use std::fmt;

use crate::model::Timeslot;

/// One independently testable condition over a timeslot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardPredicate {
    /// Timeslot title equals the value exactly
    TitleEquals(String),
    /// Timeslot is (or is not) a mirror rebroadcast
    Mirror(bool),
    /// Timeslot carries the badge
    HasBadge(String),
    EventId(String),
    SlotId(String),
    SubeventId(String),
}

impl GuardPredicate {
    /// Evaluates the predicate; `is_mirror` is the resolved mirror status.
    pub fn matches(&self, timeslot: &Timeslot, is_mirror: bool) -> bool {
        match self {
            GuardPredicate::TitleEquals(title) => &timeslot.title == title,
            GuardPredicate::Mirror(expected) => is_mirror == *expected,
            GuardPredicate::HasBadge(badge) => timeslot.badges.contains(badge),
            GuardPredicate::EventId(id) => &timeslot.event_id == id,
            GuardPredicate::SlotId(id) => &timeslot.slot_id == id,
            GuardPredicate::SubeventId(id) => timeslot.subevent_id.as_deref() == Some(id.as_str()),
        }
    }
}

impl fmt::Display for GuardPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardPredicate::TitleEquals(title) => write!(f, "title == {title:?}"),
            GuardPredicate::Mirror(mirror) => write!(f, "mirror == {mirror}"),
            GuardPredicate::HasBadge(badge) => write!(f, "badge {badge:?}"),
            GuardPredicate::EventId(id) => write!(f, "event_id == {id}"),
            GuardPredicate::SlotId(id) => write!(f, "slot_id == {id}"),
            GuardPredicate::SubeventId(id) => write!(f, "subevent_id == {id}"),
        }
    }
}

/// Conjunction of zero or more predicates; the empty guard always matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardCondition {
    predicates: Vec<GuardPredicate>,
}

impl GuardCondition {
    /// A guard that matches every timeslot.
    pub fn always() -> Self {
        Self::default()
    }

    pub fn new(predicates: Vec<GuardPredicate>) -> Self {
        Self { predicates }
    }

    pub fn with(mut self, predicate: GuardPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[GuardPredicate] {
        &self.predicates
    }

    pub fn matches(&self, timeslot: &Timeslot, is_mirror: bool) -> bool {
        self.predicates
            .iter()
            .all(|predicate| predicate.matches(timeslot, is_mirror))
    }
}

impl fmt::Display for GuardCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.predicates.is_empty() {
            return f.write_str("always");
        }
        for (index, predicate) in self.predicates.iter().enumerate() {
            if index > 0 {
                f.write_str(" && ")?;
            }
            write!(f, "{predicate}")?;
        }
        Ok(())
    }
}
