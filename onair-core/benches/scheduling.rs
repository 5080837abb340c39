use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use onair_core::template::TitleTemplate;
use onair_core::{
    AssetCatalog, AssetRecord, ConferenceScheduler, FormatTemplate, GuardCondition,
    GuardPredicate, OnairConfig, PlaylistPipeline, PrerecordedSource, Room, RoomRegistry,
    ScheduleElement, Session, Timeslot, TrackScheduler,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const ROOMS: usize = 8;

/// A deterministic conference: `days` days of back-to-back sessions per room.
struct SyntheticConference {
    rooms: RoomRegistry,
    catalog: AssetCatalog,
    sessions: Vec<Session>,
}

impl SyntheticConference {
    fn generate(seed: u64, days: u32) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let rooms = RoomRegistry::new(
            (0..ROOMS)
                .map(|i| Room::new(format!("Room {i}"), format!("live-{i}"), format!("filler-{i}")))
                .collect(),
        )
        .expect("room names are unique");

        let mut catalog = AssetCatalog::new();
        let mut sessions = Vec::new();
        for day in 0..days {
            for room in 0..ROOMS {
                let mut cursor = day_start(day);
                for block in 0..6 {
                    cursor += TimeDelta::minutes(rng.random_range(0..=20));
                    let id = format!("d{day}-r{room}-b{block}");
                    let mut session = Session::new(&id, format!("Session {id}"), format!("Room {room}"))
                        .with_track(if block % 3 == 0 { "Live" } else { "Papers" });

                    for talk in 0..rng.random_range(2..=5) {
                        let length = TimeDelta::minutes(rng.random_range(10..=25));
                        let event_id = format!("{id}-t{talk}");
                        let duration = rng
                            .random_bool(0.85)
                            .then(|| TimeDelta::seconds(rng.random_range(300..=1800)));
                        catalog.insert(&event_id, AssetRecord::new(format!("{event_id}-video"), duration));

                        let mut slot = Timeslot::new(
                            &event_id,
                            format!("{event_id}-slot"),
                            format!("Talk {talk}"),
                            cursor,
                            cursor + length,
                        );
                        if rng.random_bool(0.1) {
                            slot = slot.with_badge("Break");
                        }
                        session = session.with_timeslot(slot);
                        cursor += length;
                    }
                    sessions.push(session);
                }
            }
        }

        Self {
            rooms,
            catalog,
            sessions,
        }
    }

    fn pipeline(&self) -> PlaylistPipeline {
        let template = |raw: &str| TitleTemplate::parse(raw).expect("template is valid");
        let tracks = vec![
            TrackScheduler::new(
                "Live",
                vec![FormatTemplate::new(
                    GuardCondition::always(),
                    vec![ScheduleElement::live(template("{room.live}"))],
                )],
            ),
            TrackScheduler::new(
                "Papers",
                vec![
                    FormatTemplate::new(
                        GuardCondition::always().with(GuardPredicate::HasBadge("Break".into())),
                        vec![ScheduleElement::NotStreamed],
                    ),
                    FormatTemplate::new(
                        GuardCondition::always(),
                        vec![
                            ScheduleElement::prerecorded(PrerecordedSource::Asset)
                                .with_backup(vec![ScheduleElement::live(template("{room.live}"))]),
                            ScheduleElement::live(template("Q&A {timeslot.title}")),
                        ],
                    ),
                ],
            )
            .with_compaction(true),
        ];
        let scheduler = ConferenceScheduler::new(tracks, self.rooms.clone(), self.catalog.clone())
            .expect("track names are unique");
        PlaylistPipeline::new(scheduler, OnairConfig::for_testing())
    }
}

fn day_start(day: u32) -> DateTime<FixedOffset> {
    FixedOffset::west_opt(5 * 3600)
        .expect("valid offset")
        .with_ymd_and_hms(2021, 10, 18 + day, 9, 0, 0)
        .single()
        .expect("valid date")
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    for days in [1, 3] {
        let conference = SyntheticConference::generate(42, days);
        let pipeline = conference.pipeline();
        group.bench_with_input(BenchmarkId::new("sequential", days), &days, |b, _| {
            b.iter(|| pipeline.run(&conference.sessions).expect("schedule builds"));
        });
    }
    group.finish();
}

fn bench_concurrent_pipeline(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let conference = SyntheticConference::generate(42, 3);
    let pipeline = conference.pipeline();

    c.bench_function("pipeline_concurrent_3_days", |b| {
        b.iter(|| {
            runtime
                .block_on(pipeline.run_concurrent(conference.sessions.clone()))
                .expect("schedule builds")
        });
    });
}

criterion_group!(benches, bench_pipeline, bench_concurrent_pipeline);
criterion_main!(benches);
