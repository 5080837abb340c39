//! Track definitions in the plan document.

use serde::Deserialize;

use crate::error::ConfigurationError;
use crate::scheduler::TrackScheduler;
use crate::template::{
    FormatTemplate, GuardCondition, GuardPredicate, PrerecordedSource, ScheduleElement,
    TitleTemplate, ZoomBinding,
};

/// Source value that switches a pre-recorded element to mirror mode.
const MIRROR_SOURCE: &str = "mirror";

#[derive(Debug, Clone, Deserialize)]
pub struct TrackDocument {
    pub name: String,
    #[serde(default)]
    pub compact: bool,
    #[serde(default)]
    pub zoom: Vec<ZoomBinding>,
    #[serde(default)]
    pub formats: Vec<FormatDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormatDocument {
    #[serde(default)]
    pub guard: GuardDocument,
    #[serde(default)]
    pub elements: Vec<ElementDocument>,
}

/// Optional guard attributes; every present attribute must hold.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuardDocument {
    pub title: Option<String>,
    pub mirror: Option<bool>,
    pub badge: Option<String>,
    pub event_id: Option<String>,
    pub slot_id: Option<String>,
    pub subevent_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementDocument {
    #[serde(rename = "type")]
    pub kind: String,
    pub source: Option<String>,
    #[serde(default)]
    pub plenary: bool,
    pub record: Option<String>,
    #[serde(default)]
    pub backup: Vec<ElementDocument>,
}

impl TrackDocument {
    /// Builds the track scheduler, parsing every title template.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::UnknownElementType` - Element type is not live, prerecorded or notstreamed
    /// - `ConfigurationError::MissingLiveSource` - Live element without a source
    /// - `ConfigurationError::InvalidTemplate` - Malformed title template
    pub fn into_scheduler(self) -> Result<TrackScheduler, ConfigurationError> {
        let templates = self
            .formats
            .iter()
            .map(|format| {
                let elements = build_elements(&format.elements, &self.name)?;
                Ok(FormatTemplate::new(format.guard.to_condition(), elements))
            })
            .collect::<Result<Vec<_>, ConfigurationError>>()?;

        Ok(TrackScheduler::new(self.name, templates)
            .with_zoom(self.zoom)
            .with_compaction(self.compact))
    }
}

impl GuardDocument {
    pub fn to_condition(&self) -> GuardCondition {
        let mut guard = GuardCondition::always();
        if let Some(title) = &self.title {
            guard = guard.with(GuardPredicate::TitleEquals(title.clone()));
        }
        if let Some(mirror) = self.mirror {
            guard = guard.with(GuardPredicate::Mirror(mirror));
        }
        if let Some(badge) = &self.badge {
            guard = guard.with(GuardPredicate::HasBadge(badge.clone()));
        }
        if let Some(id) = &self.event_id {
            guard = guard.with(GuardPredicate::EventId(id.clone()));
        }
        if let Some(id) = &self.slot_id {
            guard = guard.with(GuardPredicate::SlotId(id.clone()));
        }
        if let Some(id) = &self.subevent_id {
            guard = guard.with(GuardPredicate::SubeventId(id.clone()));
        }
        guard
    }
}

fn build_elements(
    documents: &[ElementDocument],
    track: &str,
) -> Result<Vec<ScheduleElement>, ConfigurationError> {
    documents
        .iter()
        .map(|document| build_element(document, track))
        .collect()
}

fn build_element(
    document: &ElementDocument,
    track: &str,
) -> Result<ScheduleElement, ConfigurationError> {
    let element = match document.kind.to_lowercase().as_str() {
        "live" => {
            let source = document
                .source
                .as_deref()
                .ok_or_else(|| ConfigurationError::MissingLiveSource {
                    track: track.to_string(),
                })?;
            let mut live = ScheduleElement::live(TitleTemplate::parse(source)?);
            if let Some(record) = &document.record {
                live = live.recorded_as(TitleTemplate::parse(record)?);
            }
            live
        }
        "prerecorded" => {
            let source = match document.source.as_deref() {
                None => PrerecordedSource::Asset,
                Some(MIRROR_SOURCE) => PrerecordedSource::Mirror,
                Some(template) => PrerecordedSource::Titled(TitleTemplate::parse(template)?),
            };
            ScheduleElement::prerecorded(source)
                .with_backup(build_elements(&document.backup, track)?)
        }
        "notstreamed" => ScheduleElement::NotStreamed,
        _ => {
            return Err(ConfigurationError::UnknownElementType {
                kind: document.kind.clone(),
                track: track.to_string(),
            });
        }
    };

    Ok(if document.plenary {
        element.plenary()
    } else {
        element
    })
}
