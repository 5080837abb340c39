//! Scheduling scenarios over the public scheduler API.
//!
//! Covers the reference broadcast situations: a single live slot, an unknown
//! recording length, dead air between sessions, compaction of a short
//! recording, plenary fan-out and the fatal configuration and data errors.

mod common;

use chrono::NaiveTime;
use common::*;
use onair_core::{
    ConferenceScheduler, ConfigurationError, DataConsistencyError, DataQualityWarning,
    FormatTemplate, GuardCondition, GuardPredicate, MirrorWindow, OnairConfig, OnairError,
    PlaylistPipeline, PrerecordedSource, ScheduleElement, SegmentKind, Timeslot, TrackScheduler,
};

fn prerecorded() -> ScheduleElement {
    ScheduleElement::prerecorded(PrerecordedSource::Asset)
}

#[test]
fn test_scenario_single_live_slot() {
    let scheduler = scheduler(vec![track("AMA", vec![live("{room}")])], catalog(&[]));
    let session = session(
        "ama",
        "Zurich A",
        "AMA",
        vec![slot("ev-ama", at(18, 20), at(18, 50))],
    );

    let schedule = scheduler.schedule(&session).unwrap();

    assert_eq!(schedule.segments.len(), 1);
    let segments = &schedule.segments["Zurich A"];
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].kind, SegmentKind::Live);
    assert_eq!(segments[0].title, "Zurich A");
    assert_eq!(segments[0].start, at(18, 20));
    assert_eq!(segments[0].duration, minutes(30));
    assert!(!schedule.segments.contains_key("Zurich B"));
    assert!(schedule.diagnostics.is_empty());
}

#[test]
fn test_scenario_unknown_duration_consumes_window() {
    let scheduler = scheduler(
        vec![track("OOPSLA", vec![prerecorded()])],
        catalog(&[("ev-1", None)]),
    );
    let session = session(
        "s-1",
        "Zurich B",
        "OOPSLA",
        vec![slot("ev-1", at(10, 0), at(10, 15))],
    );

    let schedule = scheduler.schedule(&session).unwrap();

    let segment = &schedule.segments["Zurich B"][0];
    assert_eq!(segment.kind, SegmentKind::Prerecorded);
    assert_eq!(segment.duration, minutes(15));
    assert_eq!(
        schedule.diagnostics.warnings(),
        &[DataQualityWarning::UnknownAssetDuration {
            event_id: "ev-1".to_string(),
            slot_id: "slot-ev-1".to_string(),
            fallback_ms: 15 * 60 * 1000,
        }]
    );
}

#[test]
fn test_scenario_filler_between_sessions() {
    let scheduler = scheduler(vec![track("OOPSLA", vec![live("{room.live}")])], catalog(&[]));
    let sessions = vec![
        session(
            "s-1",
            "Zurich A",
            "OOPSLA",
            vec![slot("ev-1", at(10, 0), at(10, 30))],
        ),
        session(
            "s-2",
            "Zurich A",
            "OOPSLA",
            vec![slot("ev-2", at(10, 35), at(11, 0))],
        ),
    ];

    let schedule = PlaylistPipeline::new(scheduler, OnairConfig::for_testing())
        .run(&sessions)
        .unwrap();

    let room = schedule.room("Zurich A").unwrap();
    assert_eq!(room.len(), 3);
    assert_eq!(room[1].kind, SegmentKind::Filler);
    assert_eq!(room[1].start, room[0].end());
    assert_eq!(room[1].duration, minutes(5));
    assert_eq!(room[1].source, "filler-a");
    assert!(room[1].origin.is_none());
    assert!(schedule.validation.is_clean());
}

#[test]
fn test_scenario_compaction_pulls_next_slot_forward() {
    let compacting = track("OOPSLA", vec![prerecorded(), ScheduleElement::NotStreamed])
        .with_compaction(true);
    let scheduler = scheduler(
        vec![compacting],
        catalog(&[("ev-1", Some(8)), ("ev-2", Some(10))]),
    );
    let session = session(
        "s-1",
        "Zurich A",
        "OOPSLA",
        vec![
            slot("ev-1", at(10, 0), at(10, 12)),
            slot("ev-2", at(10, 12), at(10, 24)),
        ],
    );

    let schedule = scheduler.schedule(&session).unwrap();
    assert!(schedule.compacted);

    let room = &schedule.segments["Zurich A"];
    assert_eq!(room[0].duration, minutes(8));
    // Nominally at 10:12, pulled back to the end of the 8 minute talk.
    assert_eq!(room[1].start, at(10, 8));
    assert_eq!(room[1].end(), at(10, 24));
    let total = room[0].duration + room[1].duration;
    assert_eq!(total, minutes(24));
}

#[test]
fn test_compacted_session_is_not_filled_internally() {
    let compacting = track("OOPSLA", vec![prerecorded(), ScheduleElement::NotStreamed])
        .with_compaction(true);
    let sessions = vec![session(
        "s-1",
        "Zurich A",
        "OOPSLA",
        vec![
            slot("ev-1", at(10, 0), at(10, 12)),
            slot("ev-2", at(10, 12), at(10, 24)),
        ],
    )];
    let mut config = OnairConfig::for_testing();
    config.playout.filler_policy = onair_core::FillerPolicy::AllGaps;

    let schedule = PlaylistPipeline::new(
        scheduler(
            vec![compacting],
            catalog(&[("ev-1", Some(8)), ("ev-2", Some(5))]),
        ),
        config,
    )
    .run(&sessions)
    .unwrap();

    assert_eq!(schedule.fillers, 0);
    assert!(
        schedule
            .room("Zurich A")
            .unwrap()
            .iter()
            .all(|segment| segment.kind == SegmentKind::Prerecorded)
    );
}

#[test]
fn test_plenary_fan_out_is_identical_across_rooms() {
    let keynote = track(
        "Keynotes",
        vec![
            live("{room.live}")
                .plenary()
                .recorded_as(template("keynote-{timeslot.title}")),
        ],
    );
    let scheduler = scheduler(vec![keynote], catalog(&[]));
    let session = session(
        "kn",
        "Zurich A",
        "Keynotes",
        vec![slot("opening", at(9, 0), at(10, 0))],
    );

    let schedule = scheduler.schedule(&session).unwrap();

    assert_eq!(schedule.segments.len(), ROOMS.len());
    for room in ROOMS {
        let segment = &schedule.segments[room][0];
        assert_eq!(segment.start, at(9, 0));
        assert_eq!(segment.duration, minutes(60));
    }
    let recorded: Vec<_> = ROOMS
        .iter()
        .filter_map(|room| schedule.segments[*room][0].recording.as_deref())
        .collect();
    assert_eq!(recorded, vec!["keynote-opening"]);
}

#[test]
fn test_mirror_window_selects_rebroadcast_template() {
    let track = TrackScheduler::new(
        "OOPSLA",
        vec![
            FormatTemplate::new(
                GuardCondition::always().with(GuardPredicate::Mirror(true)),
                vec![ScheduleElement::prerecorded(PrerecordedSource::Mirror)],
            ),
            FormatTemplate::new(GuardCondition::always(), vec![live("{room.live}")]),
        ],
    );
    let window = MirrorWindow::new(
        NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
    )
    .unwrap();
    let scheduler = ConferenceScheduler::new(vec![track], rooms(), catalog(&[("ev-1", Some(5))]))
        .unwrap()
        .with_mirroring(Some(window));

    let main = session(
        "main",
        "Zurich C",
        "OOPSLA",
        vec![slot("ev-1", at(10, 0), at(10, 20))],
    );
    let mirror = session(
        "mirror",
        "Zurich C",
        "OOPSLA",
        vec![slot("ev-1", at(21, 0), at(21, 20))],
    );

    let main = scheduler.schedule(&main).unwrap();
    assert_eq!(main.segments["Zurich C"][0].kind, SegmentKind::Live);

    let mirror = scheduler.schedule(&mirror).unwrap();
    let rebroadcast = &mirror.segments["Zurich C"][0];
    assert_eq!(rebroadcast.kind, SegmentKind::Prerecorded);
    assert_eq!(rebroadcast.duration, minutes(20));
}

#[test]
fn test_no_matching_template_aborts() {
    let guarded = TrackScheduler::new(
        "OOPSLA",
        vec![FormatTemplate::new(
            GuardCondition::always().with(GuardPredicate::HasBadge("Keynote".into())),
            vec![live("{room}")],
        )],
    );
    let scheduler = scheduler(vec![guarded], catalog(&[]));
    let session = session(
        "s-1",
        "Zurich A",
        "OOPSLA",
        vec![slot("ev-1", at(10, 0), at(10, 30))],
    );

    let error = scheduler.schedule(&session).unwrap_err();
    assert!(matches!(
        error,
        OnairError::Configuration(ConfigurationError::NoMatchingTemplate { ref event_id, .. })
            if event_id == "ev-1"
    ));
    assert!(error.is_user_error());
}

#[test]
fn test_unmapped_prerecorded_event_aborts_pipeline() {
    let scheduler = scheduler(vec![track("OOPSLA", vec![prerecorded()])], catalog(&[]));
    let sessions = vec![session(
        "s-1",
        "Zurich A",
        "OOPSLA",
        vec![slot("ev-missing", at(10, 0), at(10, 30))],
    )];

    let result = PlaylistPipeline::new(scheduler, OnairConfig::for_testing()).run(&sessions);
    assert!(matches!(
        result,
        Err(OnairError::DataConsistency(DataConsistencyError::UnmappedEvent { .. }))
    ));
}

#[test]
fn test_session_without_registered_track_aborts() {
    let scheduler = scheduler(vec![track("OOPSLA", vec![live("{room}")])], catalog(&[]));
    let session = session(
        "s-1",
        "Zurich A",
        "Onward!",
        vec![slot("ev-1", at(10, 0), at(10, 30))],
    );

    assert!(matches!(
        scheduler.schedule(&session),
        Err(OnairError::Configuration(ConfigurationError::NoTrackForSession { .. }))
    ));
}

#[test]
fn test_inverted_timeslot_is_rejected() {
    let scheduler = scheduler(vec![track("OOPSLA", vec![live("{room}")])], catalog(&[]));
    let session = session(
        "s-1",
        "Zurich A",
        "OOPSLA",
        vec![slot("ev-1", at(10, 30), at(10, 0))],
    );

    assert!(matches!(
        scheduler.schedule(&session),
        Err(OnairError::DataConsistency(DataConsistencyError::InvalidTimeslot { .. }))
    ));
}

#[test]
fn test_overlong_talks_with_live_tail_stay_in_order() {
    // Slot ids are opaque and sort against chronological order.
    let talks = session(
        "s-1",
        "Zurich A",
        "OOPSLA",
        vec![
            Timeslot::new("ev-1", "db0c516c", "Talk 1", at(10, 0), at(10, 30)),
            Timeslot::new("ev-2", "1b9393da", "Talk 2", at(10, 30), at(11, 0)),
        ],
    );
    let scheduler = scheduler(
        vec![track("OOPSLA", vec![prerecorded(), live("{room.live}")])],
        catalog(&[("ev-1", Some(40)), ("ev-2", Some(40))]),
    );

    let schedule = PlaylistPipeline::new(scheduler, OnairConfig::for_testing())
        .run(&[talks])
        .unwrap();

    let room = schedule.room("Zurich A").unwrap();
    let kinds: Vec<_> = room.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![SegmentKind::Prerecorded, SegmentKind::Prerecorded]);
    assert_eq!(room[0].slot_id(), Some("db0c516c"));
    assert_eq!(room[1].start, at(10, 30));
    assert_eq!(room[1].end(), at(11, 0));
    assert_eq!(schedule.validation.overlaps().count(), 0);
    assert!(schedule.validation.is_clean());
}
