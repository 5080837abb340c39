//! Plan document loading.
//!
//! A plan is a single JSON document holding rooms, sessions, the asset
//! mapping with probed durations, track definitions and the optional
//! mirroring window. Loading turns it into the typed, immutable tables the
//! scheduler works on.

mod tracks;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub use tracks::{ElementDocument, FormatDocument, GuardDocument, TrackDocument};

use crate::Result;
use crate::model::{AssetCatalog, Room, RoomRegistry, Session, Timeslot};
use crate::scheduler::{ConferenceScheduler, MirrorWindow, TrackScheduler};

/// Naive timestamp layouts accepted besides RFC 3339.
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y/%m/%d %H:%M"];

/// Problems reading the plan document itself.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Malformed plan document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid timestamp '{value}': expected RFC 3339 or YYYY-MM-DDTHH:MM[:SS]")]
    InvalidTimestamp { value: String },

    #[error("Invalid duration '{value}' for asset '{asset}': expected H:MM:SS[.ffffff]")]
    InvalidDuration { asset: String, value: String },

    #[error("Invalid timezone offset '{value}': expected +HH:MM, -HH:MM or UTC")]
    InvalidTimezone { value: String },

    #[error("Invalid time of day '{value}': expected HH:MM[:SS]")]
    InvalidTime { value: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanDocument {
    /// Offset applied to naive timestamps; UTC when absent
    #[serde(default)]
    pub timezone: Option<String>,
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub sessions: Vec<SessionDocument>,
    #[serde(default)]
    pub assets: AssetsDocument,
    #[serde(default)]
    pub tracks: Vec<TrackDocument>,
    #[serde(default)]
    pub mirroring: Option<MirroringDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionDocument {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub room: String,
    #[serde(default)]
    pub tracks: Vec<String>,
    #[serde(default)]
    pub timeslots: Vec<TimeslotDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeslotDocument {
    pub event_id: String,
    pub slot_id: String,
    #[serde(default)]
    pub subevent_id: Option<String>,
    #[serde(default)]
    pub title: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub mirror: bool,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub tracks: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetsDocument {
    /// Event id to asset id
    #[serde(default)]
    pub mappings: BTreeMap<String, String>,
    /// Video file name to probed running time
    #[serde(default)]
    pub durations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MirroringDocument {
    pub start: String,
    pub end: String,
}

/// Typed scheduling inputs built from a plan document.
#[derive(Debug, Clone)]
pub struct ConferencePlan {
    pub rooms: RoomRegistry,
    pub sessions: Vec<Session>,
    pub catalog: AssetCatalog,
    pub tracks: Vec<TrackScheduler>,
    pub mirroring: Option<MirrorWindow>,
}

impl PlanDocument {
    pub fn from_json(json: &str) -> std::result::Result<Self, InputError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Converts the document into typed tables.
    ///
    /// # Errors
    ///
    /// - `InputError` - Unparseable timestamp, duration, offset or time of day
    /// - `ConfigurationError` - Duplicate room, bad track definition or mirroring window
    pub fn into_plan(self) -> Result<ConferencePlan> {
        let offset = match &self.timezone {
            Some(value) => parse_offset(value)?,
            None => FixedOffset::east_opt(0).ok_or_else(|| InputError::InvalidTimezone {
                value: "UTC".to_string(),
            })?,
        };

        let rooms = RoomRegistry::new(self.rooms)?;

        let sessions = self
            .sessions
            .into_iter()
            .map(|session| session.into_session(offset))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let durations = self
            .assets
            .durations
            .iter()
            .map(|(asset, value)| Ok((asset.clone(), parse_asset_duration(asset, value)?)))
            .collect::<std::result::Result<HashMap<_, _>, InputError>>()?;
        let catalog = AssetCatalog::from_sources(&self.assets.mappings, &durations);

        let tracks = self
            .tracks
            .into_iter()
            .map(TrackDocument::into_scheduler)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mirroring = match self.mirroring {
            Some(window) => Some(MirrorWindow::new(
                parse_time_of_day(&window.start)?,
                parse_time_of_day(&window.end)?,
            )?),
            None => None,
        };

        info!(
            "Loaded plan: {} rooms, {} sessions, {} assets, {} tracks",
            rooms.len(),
            sessions.len(),
            catalog.len(),
            tracks.len()
        );
        Ok(ConferencePlan {
            rooms,
            sessions,
            catalog,
            tracks,
            mirroring,
        })
    }
}

impl SessionDocument {
    /// Session tracks are the declared ones followed by any only named on timeslots.
    fn into_session(self, offset: FixedOffset) -> std::result::Result<Session, InputError> {
        let mut session = Session::new(self.id, self.title, self.room);
        session.tracks = self.tracks;

        for slot in self.timeslots {
            for track in &slot.tracks {
                if !session.tracks.contains(track) {
                    session.tracks.push(track.clone());
                }
            }
            let mut timeslot = Timeslot::new(
                slot.event_id,
                slot.slot_id,
                slot.title,
                parse_timestamp(&slot.start, offset)?,
                parse_timestamp(&slot.end, offset)?,
            )
            .with_mirror(slot.mirror);
            timeslot.subevent_id = slot.subevent_id;
            timeslot.badges = slot.badges.into_iter().collect();
            timeslot.tracks = slot.tracks;
            session.timeslots.push(timeslot);
        }
        session.timeslots.sort_by_key(|slot| slot.start);
        Ok(session)
    }
}

impl ConferencePlan {
    /// Reads and converts a plan document.
    ///
    /// # Errors
    ///
    /// - `OnairError::Io` - File cannot be read
    ///
    /// plus every error of [`PlanDocument::into_plan`].
    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// # Errors
    ///
    /// Every error of [`PlanDocument::into_plan`].
    pub fn from_json(json: &str) -> Result<Self> {
        PlanDocument::from_json(json)?.into_plan()
    }

    /// Builds the scheduler, handing back the sessions to schedule.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::DuplicateTrack` - Two tracks share a name
    pub fn build_scheduler(self) -> Result<(ConferenceScheduler, Vec<Session>)> {
        let scheduler = ConferenceScheduler::new(self.tracks, self.rooms, self.catalog)?
            .with_mirroring(self.mirroring);
        Ok((scheduler, self.sessions))
    }
}

/// Parses an RFC 3339 timestamp, or a naive one placed at `offset`.
pub fn parse_timestamp(
    value: &str,
    offset: FixedOffset,
) -> std::result::Result<DateTime<FixedOffset>, InputError> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp);
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .ok_or_else(|| InputError::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// Parses `+HH:MM`, `-HH:MM`, `Z` or `UTC`.
pub fn parse_offset(value: &str) -> std::result::Result<FixedOffset, InputError> {
    let invalid = || InputError::InvalidTimezone {
        value: value.to_string(),
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match trimmed.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..60).contains(&minutes) {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Parses a probed running time `H:MM:SS[.ffffff]`.
pub fn parse_asset_duration(asset: &str, value: &str) -> std::result::Result<TimeDelta, InputError> {
    let invalid = || InputError::InvalidDuration {
        asset: asset.to_string(),
        value: value.to_string(),
    };

    let mut parts = value.trim().split(':');
    let (Some(hours), Some(minutes), Some(seconds), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    let hours: i64 = hours.parse().map_err(|_| invalid())?;
    let minutes: i64 = minutes.parse().map_err(|_| invalid())?;
    let (whole, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));
    let seconds: i64 = whole.parse().map_err(|_| invalid())?;
    if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return Err(invalid());
    }

    let micros = if fraction.is_empty() {
        0
    } else {
        if fraction.len() > 6 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let padded = format!("{fraction:0<6}");
        padded.parse::<i64>().map_err(|_| invalid())?
    };

    Ok(TimeDelta::hours(hours)
        + TimeDelta::minutes(minutes)
        + TimeDelta::seconds(seconds)
        + TimeDelta::microseconds(micros))
}

/// Parses a time of day `HH:MM[:SS]`.
pub fn parse_time_of_day(value: &str) -> std::result::Result<NaiveTime, InputError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| InputError::InvalidTime {
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigurationError, OnairError};

    const PLAN: &str = r#"{
        "timezone": "-05:00",
        "rooms": [
            {"name": "Zurich A", "live": "live-a", "filler": "filler-a"},
            {"name": "Zurich B", "live": "live-b", "filler": "filler-b"}
        ],
        "sessions": [{
            "id": "s-1",
            "title": "OOPSLA 1",
            "room": "Zurich A",
            "timeslots": [
                {"event_id": "ev-2", "slot_id": "slot-2", "title": "Second",
                 "start": "2021-10-19T10:15", "end": "2021-10-19T10:30", "tracks": ["OOPSLA"]},
                {"event_id": "ev-1", "slot_id": "slot-1", "title": "First",
                 "start": "2021/10/19 10:00", "end": "2021-10-19T10:15:00-05:00",
                 "badges": ["Virtual"], "mirror": true, "subevent_id": "main"}
            ]
        }],
        "assets": {
            "mappings": {"ev-1": "OOPSLA21-P1", "ev-2": "oopsla21-p2"},
            "durations": {"oopsla21-p1-video": "0:08:30.500000"}
        },
        "tracks": [{"name": "OOPSLA", "formats": [{"elements": [{"type": "prerecorded"}]}]}],
        "mirroring": {"start": "08:00", "end": "20:00:00"}
    }"#;

    #[test]
    fn test_plan_conversion() {
        let plan = ConferencePlan::from_json(PLAN).unwrap();
        assert_eq!(plan.rooms.len(), 2);
        assert_eq!(plan.tracks.len(), 1);
        assert!(plan.mirroring.is_some());

        let session = &plan.sessions[0];
        assert_eq!(session.tracks, vec!["OOPSLA".to_string()]);
        assert_eq!(session.timeslots[0].slot_id, "slot-1");
        assert_eq!(session.timeslots[0].span(), TimeDelta::minutes(15));
        assert!(session.timeslots[0].mirror);
        assert!(session.timeslots[0].badges.contains("Virtual"));
        assert_eq!(session.timeslots[0].subevent_id.as_deref(), Some("main"));
        assert_eq!(
            session.timeslots[1].start.to_rfc3339(),
            "2021-10-19T10:15:00-05:00"
        );

        let first = plan.catalog.get("ev-1").unwrap();
        assert_eq!(first.name, "OOPSLA21-P1");
        assert_eq!(
            first.duration,
            Some(TimeDelta::seconds(8 * 60 + 30) + TimeDelta::milliseconds(500))
        );
        assert_eq!(plan.catalog.get("ev-2").unwrap().duration, None);
    }

    #[test]
    fn test_build_scheduler_rejects_duplicate_tracks() {
        let json = PLAN.replace(
            r#""tracks": [{"name": "OOPSLA", "formats": [{"elements": [{"type": "prerecorded"}]}]}]"#,
            r#""tracks": [{"name": "OOPSLA"}, {"name": "OOPSLA"}]"#,
        );
        let plan = ConferencePlan::from_json(&json).unwrap();
        assert!(matches!(
            plan.build_scheduler(),
            Err(OnairError::Configuration(ConfigurationError::DuplicateTrack { .. }))
        ));
    }

    #[test]
    fn test_bad_timestamp_is_input_error() {
        let json = PLAN.replace("2021/10/19 10:00", "yesterday");
        assert!(matches!(
            ConferencePlan::from_json(&json),
            Err(OnairError::Input(InputError::InvalidTimestamp { value })) if value == "yesterday"
        ));
    }

    #[test]
    fn test_parse_asset_duration() {
        assert_eq!(
            parse_asset_duration("a", "1:02:03").unwrap(),
            TimeDelta::seconds(3723)
        );
        assert_eq!(
            parse_asset_duration("a", "0:00:01.25").unwrap(),
            TimeDelta::milliseconds(1250)
        );
        assert!(parse_asset_duration("a", "12:03").is_err());
        assert!(parse_asset_duration("a", "0:61:00").is_err());
        assert!(parse_asset_duration("a", "0:00:01.x").is_err());
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("-05:00").unwrap().local_minus_utc(), -5 * 3600);
        assert_eq!(parse_offset("+05:30").unwrap().local_minus_utc(), 5 * 3600 + 1800);
        assert_eq!(parse_offset("UTC").unwrap().local_minus_utc(), 0);
        assert!(parse_offset("America/Chicago").is_err());
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(
            parse_time_of_day("08:30").unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap()
        );
        assert!(parse_time_of_day("25:00").is_err());
    }
}
