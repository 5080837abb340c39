//! Shared fixtures for onair-core integration tests.

#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone};
use onair_core::template::TitleTemplate;
use onair_core::{
    AssetCatalog, AssetRecord, ConferenceScheduler, FormatTemplate, GuardCondition, Room,
    RoomRegistry, ScheduleElement, Session, Timeslot, TrackScheduler,
};

pub const ROOMS: [&str; 3] = ["Zurich A", "Zurich B", "Zurich C"];

/// Conference-local time on the first day, UTC-5.
pub fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
    FixedOffset::west_opt(5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2021, 10, 19, hour, minute, 0)
        .unwrap()
}

pub fn minutes(count: i64) -> TimeDelta {
    TimeDelta::minutes(count)
}

pub fn rooms() -> RoomRegistry {
    RoomRegistry::new(
        ROOMS
            .iter()
            .map(|name| {
                let id = name.trim_start_matches("Zurich ").to_lowercase();
                Room::new(*name, format!("live-{id}"), format!("filler-{id}"))
            })
            .collect(),
    )
    .unwrap()
}

pub fn template(raw: &str) -> TitleTemplate {
    TitleTemplate::parse(raw).unwrap()
}

pub fn live(source: &str) -> ScheduleElement {
    ScheduleElement::live(template(source))
}

/// Track with a single always-matching template.
pub fn track(name: &str, elements: Vec<ScheduleElement>) -> TrackScheduler {
    TrackScheduler::new(
        name,
        vec![FormatTemplate::new(GuardCondition::always(), elements)],
    )
}

pub fn catalog(assets: &[(&str, Option<i64>)]) -> AssetCatalog {
    AssetCatalog::from_records(assets.iter().map(|(event_id, length)| {
        (
            event_id.to_string(),
            AssetRecord::new(format!("{event_id}-video"), length.map(TimeDelta::minutes)),
        )
    }))
}

pub fn slot(event_id: &str, start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Timeslot {
    Timeslot::new(event_id, format!("slot-{event_id}"), event_id, start, end)
}

pub fn session(id: &str, room: &str, track: &str, timeslots: Vec<Timeslot>) -> Session {
    timeslots.into_iter().fold(
        Session::new(id, format!("Session {id}"), room).with_track(track),
        Session::with_timeslot,
    )
}

pub fn scheduler(tracks: Vec<TrackScheduler>, catalog: AssetCatalog) -> ConferenceScheduler {
    ConferenceScheduler::new(tracks, rooms(), catalog).unwrap()
}
