//! Physical rooms and their playout feeds.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// A physical room with its own broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    /// Feed identifier switched to for live segments
    pub live: String,
    /// Feed identifier played while nothing is scheduled
    pub filler: String,
}

impl Room {
    /// Creates a room from its name and feed identifiers.
    pub fn new(name: impl Into<String>, live: impl Into<String>, filler: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            live: live.into(),
            filler: filler.into(),
        }
    }
}

/// Ordered set of rooms loaded once per run.
///
/// Declaration order is the plenary fan-out order, so it decides which room
/// receives the recording name of a mirrored live feed.
#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    rooms: Vec<Room>,
}

impl RoomRegistry {
    /// Builds the registry, rejecting duplicate room names.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::DuplicateRoom` - Two rooms share a name
    pub fn new(rooms: Vec<Room>) -> Result<Self, ConfigurationError> {
        for (index, room) in rooms.iter().enumerate() {
            if rooms[..index].iter().any(|other| other.name == room.name) {
                return Err(ConfigurationError::DuplicateRoom {
                    room: room.name.clone(),
                });
            }
        }
        Ok(Self { rooms })
    }

    pub fn get(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rooms.iter().map(|room| room.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
