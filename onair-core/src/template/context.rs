//! Scheduling context and title templates.
//!
//! Titles and recording names are written as templates such as
//! `"{room.live}"` or `"{zoom.stream} - {timeslot.title}"` and rendered once per
//! target room.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, DataConsistencyError};
use crate::model::{AssetCatalog, Room, RoomRegistry, Session, Timeslot};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([a-z_]+(?:\.[a-z_]+)?)\}").expect("placeholder pattern is valid")
});

/// Video-conference instance bound to a track, optionally to a single room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomBinding {
    /// Room this instance serves; `None` serves every room
    #[serde(default)]
    pub room: Option<String>,
    pub url: String,
    pub stream: String,
}

/// Value substituted for a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    RoomName,
    RoomLive,
    RoomFiller,
    ZoomUrl,
    ZoomStream,
    TimeslotTitle,
    EventId,
    SlotId,
    SessionId,
    SessionTitle,
    Track,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        let field = match name {
            "room" | "room.name" => Field::RoomName,
            "room.live" => Field::RoomLive,
            "room.filler" => Field::RoomFiller,
            "zoom.url" => Field::ZoomUrl,
            "zoom.stream" => Field::ZoomStream,
            "timeslot.title" | "title" => Field::TimeslotTitle,
            "timeslot.event_id" | "event_id" => Field::EventId,
            "timeslot.slot_id" | "slot_id" => Field::SlotId,
            "session.id" => Field::SessionId,
            "session.title" => Field::SessionTitle,
            "track" => Field::Track,
            _ => return None,
        };
        Some(field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplatePart {
    Literal(String),
    Field(Field),
}

/// A parsed title template. Unknown placeholders are rejected at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleTemplate {
    raw: String,
    parts: Vec<TemplatePart>,
}

impl TitleTemplate {
    /// Parses a template string.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::InvalidTemplate` - Unknown placeholder or stray brace
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidTemplate {
            template: raw.to_string(),
            reason,
        };

        let mut parts = Vec::new();
        let mut cursor = 0;
        for captures in PLACEHOLDER.captures_iter(raw) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            push_literal(&mut parts, &raw[cursor..whole.start()]).map_err(&invalid)?;
            let field = Field::parse(name.as_str())
                .ok_or_else(|| invalid(format!("unknown placeholder {{{}}}", name.as_str())))?;
            parts.push(TemplatePart::Field(field));
            cursor = whole.end();
        }
        push_literal(&mut parts, &raw[cursor..]).map_err(&invalid)?;

        Ok(Self {
            raw: raw.to_string(),
            parts,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when rendering needs a zoom binding for the room.
    pub fn uses_zoom(&self) -> bool {
        self.parts.iter().any(|part| {
            matches!(
                part,
                TemplatePart::Field(Field::ZoomUrl) | TemplatePart::Field(Field::ZoomStream)
            )
        })
    }

    /// Renders the template for one room of the context.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::MissingZoomBinding` - Template uses zoom fields but the track has no instance for the room
    pub fn render(
        &self,
        context: &ScheduleContext<'_>,
        room: &Room,
    ) -> Result<String, ConfigurationError> {
        let zoom = if self.uses_zoom() {
            context.zoom_for(room)?
        } else {
            None
        };
        let missing_zoom = || ConfigurationError::MissingZoomBinding {
            track: context.track.to_string(),
            room: room.name.clone(),
        };

        let mut rendered = String::with_capacity(self.raw.len());
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => rendered.push_str(text),
                TemplatePart::Field(field) => match field {
                    Field::RoomName => rendered.push_str(&room.name),
                    Field::RoomLive => rendered.push_str(&room.live),
                    Field::RoomFiller => rendered.push_str(&room.filler),
                    Field::ZoomUrl => rendered.push_str(&zoom.ok_or_else(missing_zoom)?.url),
                    Field::ZoomStream => {
                        rendered.push_str(&zoom.ok_or_else(missing_zoom)?.stream)
                    }
                    Field::TimeslotTitle => rendered.push_str(&context.timeslot.title),
                    Field::EventId => rendered.push_str(&context.timeslot.event_id),
                    Field::SlotId => rendered.push_str(&context.timeslot.slot_id),
                    Field::SessionId => rendered.push_str(&context.session.id),
                    Field::SessionTitle => rendered.push_str(&context.session.title),
                    Field::Track => rendered.push_str(context.track),
                },
            }
        }
        Ok(rendered)
    }
}

fn push_literal(parts: &mut Vec<TemplatePart>, text: &str) -> Result<(), String> {
    if text.contains(['{', '}']) {
        return Err(format!("unbalanced brace in {text:?}"));
    }
    if !text.is_empty() {
        parts.push(TemplatePart::Literal(text.to_string()));
    }
    Ok(())
}

/// Read-only inputs every element sees while scheduling one timeslot.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleContext<'a> {
    pub rooms: &'a RoomRegistry,
    pub catalog: &'a AssetCatalog,
    pub session: &'a Session,
    pub timeslot: &'a Timeslot,
    pub track: &'a str,
    pub zoom: &'a [ZoomBinding],
}

impl<'a> ScheduleContext<'a> {
    /// The room the session is held in.
    ///
    /// # Errors
    ///
    /// - `DataConsistencyError::UnknownRoom` - Session room is not registered
    pub fn home_room(&self) -> Result<&'a Room, DataConsistencyError> {
        self.rooms
            .get(&self.session.room)
            .ok_or_else(|| DataConsistencyError::UnknownRoom {
                session_id: self.session.id.clone(),
                room: self.session.room.clone(),
            })
    }

    /// Zoom instance serving `room`: the first binding for that room or for all rooms.
    ///
    /// Tracks without bindings yield `None`; a track with bindings that leave
    /// the room uncovered is a configuration error.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::MissingZoomBinding` - No binding covers the room
    pub fn zoom_for(&self, room: &Room) -> Result<Option<&'a ZoomBinding>, ConfigurationError> {
        if self.zoom.is_empty() {
            return Ok(None);
        }
        self.zoom
            .iter()
            .find(|binding| {
                binding
                    .room
                    .as_deref()
                    .is_none_or(|bound| bound == room.name)
            })
            .map(Some)
            .ok_or_else(|| ConfigurationError::MissingZoomBinding {
                track: self.track.to_string(),
                room: room.name.clone(),
            })
    }
}
