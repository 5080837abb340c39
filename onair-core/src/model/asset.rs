//! Catalog of pre-recorded talk videos keyed by event id.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::TimeDelta;

use super::session::Session;

/// A pre-recorded video and, when probed, its running time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub name: String,
    pub duration: Option<TimeDelta>,
}

impl AssetRecord {
    pub fn new(name: impl Into<String>, duration: Option<TimeDelta>) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// Event id to asset lookup shared read-only by every scheduling worker.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    records: HashMap<String, AssetRecord>,
}

/// How well the catalog lines up with the timetable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetCoverage {
    /// Events with a video that no timeslot schedules
    pub unscheduled_assets: Vec<String>,
    /// Scheduled events with no video on file
    pub unmapped_timeslots: Vec<String>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from `(event id, record)` pairs; later pairs win.
    pub fn from_records(records: impl IntoIterator<Item = (String, AssetRecord)>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Joins an event-to-asset mapping with probed asset durations.
    ///
    /// Video files are named after the lowercased asset id with a `-video`
    /// suffix; events without a probed file keep an unknown duration.
    /// Mappings with an empty asset id are skipped.
    pub fn from_sources(
        mappings: &BTreeMap<String, String>,
        durations: &HashMap<String, TimeDelta>,
    ) -> Self {
        let records = mappings
            .iter()
            .filter(|(_, asset_id)| !asset_id.trim().is_empty())
            .map(|(event_id, asset_id)| {
                let file_name = format!("{}-video", asset_id.to_lowercase());
                let duration = durations.get(&file_name).copied();
                (event_id.clone(), AssetRecord::new(asset_id.clone(), duration))
            });
        Self::from_records(records)
    }

    pub fn insert(&mut self, event_id: impl Into<String>, record: AssetRecord) {
        self.records.insert(event_id.into(), record);
    }

    pub fn get(&self, event_id: &str) -> Option<&AssetRecord> {
        self.records.get(event_id)
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.records.contains_key(event_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Compares the catalog against the events the timetable schedules.
    ///
    /// Event ids repeat for mirrored slots, so both sides are compared as sets.
    pub fn coverage(&self, sessions: &[Session]) -> AssetCoverage {
        let scheduled: BTreeSet<&str> = sessions
            .iter()
            .flat_map(|session| session.timeslots.iter())
            .map(|slot| slot.event_id.as_str())
            .collect();
        let mapped: BTreeSet<&str> = self.records.keys().map(String::as_str).collect();

        AssetCoverage {
            unscheduled_assets: mapped
                .difference(&scheduled)
                .map(|id| id.to_string())
                .collect(),
            unmapped_timeslots: scheduled
                .difference(&mapped)
                .map(|id| id.to_string())
                .collect(),
        }
    }
}
