//! CLI command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Subcommand;
use onair_core::{
    ConferencePlan, ConferenceSchedule, FillerPolicy, OnairConfig, OnairError, PlaylistPipeline,
    PlaylistValidator, RoomPlaylist, SegmentKind,
};
use tokio::fs;
use tracing::{error, info};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Schedule a plan and write one playlist per room
    Generate {
        /// Plan document (JSON)
        #[arg(short, long)]
        plan: PathBuf,
        /// Directory the room playlists are written to
        #[arg(short, long, default_value = "playlists")]
        output_dir: PathBuf,
        /// File name prefix for every room playlist
        #[arg(long, default_value = "")]
        prefix: String,
        /// Frames per second for timecodes
        #[arg(long)]
        frame_rate: Option<u32>,
        /// Which gaps receive filler segments
        #[arg(long, value_enum)]
        filler_policy: Option<FillerPolicy>,
        /// Schedule sessions one after another
        #[arg(long)]
        sequential: bool,
    },
    /// Check written playlists for overlaps and gaps
    Validate {
        /// Room playlist files
        #[arg(required = true)]
        playlists: Vec<PathBuf>,
        /// Fail when any issue is found
        #[arg(long)]
        strict: bool,
    },
    /// Load a plan and build its scheduler without scheduling
    Check {
        /// Plan document (JSON)
        #[arg(short, long)]
        plan: PathBuf,
    },
}

impl Commands {
    /// Subcommand name used to label the run.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Generate { .. } => "generate",
            Commands::Validate { .. } => "validate",
            Commands::Check { .. } => "check",
        }
    }

    /// Plan document the command reads, if any.
    pub fn plan(&self) -> Option<&Path> {
        match self {
            Commands::Generate { plan, .. } | Commands::Check { plan } => Some(plan.as_path()),
            Commands::Validate { .. } => None,
        }
    }
}

/// Options of the generate command beyond the plan path.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub output_dir: PathBuf,
    pub prefix: String,
    pub config: OnairConfig,
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Generate {
            plan,
            output_dir,
            prefix,
            frame_rate,
            filler_policy,
            sequential,
        } => {
            let mut config = OnairConfig::from_env();
            if let Some(frame_rate) = frame_rate {
                config.playout.frame_rate = frame_rate.max(1);
            }
            if let Some(policy) = filler_policy {
                config.playout.filler_policy = policy;
            }
            if sequential {
                config.scheduling.parallel = false;
            }
            let options = GenerateOptions {
                output_dir,
                prefix,
                config,
            };
            generate(&plan, &options).await.map(|_| ())
        }
        Commands::Validate { playlists, strict } => {
            let issues = validate_playlists(&playlists).await?;
            if strict && issues > 0 {
                bail!("{issues} playlist issue(s) found");
            }
            Ok(())
        }
        Commands::Check { plan } => check_plan(&plan).await,
    }
}

/// Runs the pipeline on a plan and writes every room playlist.
///
/// Returns the written files in room order.
///
/// # Errors
/// - Plan cannot be read or is invalid
/// - Configuration or data consistency error while scheduling
/// - Output directory or a playlist cannot be written
pub async fn generate(plan_path: &Path, options: &GenerateOptions) -> anyhow::Result<Vec<PathBuf>> {
    let plan = load_plan(plan_path).await?;
    let (scheduler, sessions) = plan.build_scheduler().map_err(explain)?;

    let pipeline = PlaylistPipeline::new(scheduler, options.config.clone());
    let schedule = pipeline.execute(sessions).await.map_err(explain)?;

    fs::create_dir_all(&options.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", options.output_dir.display()))?;

    let mut written = Vec::new();
    for playlist in schedule.playlists(options.config.playout.frame_rate) {
        let path = options.output_dir.join(format!(
            "{}{}.json",
            options.prefix,
            sanitize_file_name(&playlist.room)
        ));
        let json = playlist
            .to_json()
            .with_context(|| format!("Failed to serialize playlist for '{}'", playlist.room))?;
        fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    print_summary(&schedule);
    Ok(written)
}

/// Re-runs the validator over written playlists and prints every issue.
///
/// Returns the number of issues found.
///
/// # Errors
/// - A playlist file cannot be read or parsed
pub async fn validate_playlists(paths: &[PathBuf]) -> anyhow::Result<usize> {
    let validator = PlaylistValidator::new();
    let mut total = 0;

    for path in paths {
        let json = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let playlist = RoomPlaylist::from_json(&json)
            .with_context(|| format!("{} is not a room playlist", path.display()))?;

        let report = validator.validate_room(&playlist.room, &playlist.to_segments());
        for issue in report.issues() {
            println!("{}: {issue}", path.display());
        }
        println!(
            "{}: {} entries, {} overlaps, {} gaps",
            playlist.room,
            playlist.entries.len(),
            report.overlaps().count(),
            report.gaps().count()
        );
        total += report.len();
    }

    info!("Validated {} playlists, {} issues", paths.len(), total);
    Ok(total)
}

/// Loads a plan and builds the scheduler, surfacing configuration errors.
///
/// # Errors
/// - Plan cannot be read or is invalid
/// - Track definitions are inconsistent
pub async fn check_plan(plan_path: &Path) -> anyhow::Result<()> {
    let plan = load_plan(plan_path).await?;
    let (scheduler, sessions) = plan.build_scheduler().map_err(explain)?;

    let slots: usize = sessions.iter().map(|s| s.timeslots.len()).sum();
    println!(
        "Plan OK: {} tracks, {} rooms, {} sessions, {} timeslots, {} assets",
        scheduler.track_count(),
        scheduler.rooms().len(),
        sessions.len(),
        slots,
        scheduler.catalog().len()
    );
    Ok(())
}

async fn load_plan(path: &Path) -> anyhow::Result<ConferencePlan> {
    ConferencePlan::load(path)
        .await
        .map_err(explain)
        .with_context(|| format!("Failed to load plan {}", path.display()))
}

/// Logs the user-facing message before handing the error up.
fn explain(error: OnairError) -> anyhow::Error {
    if error.is_user_error() {
        error!("{}", error.user_message());
    }
    anyhow::Error::new(error)
}

fn print_summary(schedule: &ConferenceSchedule) {
    for (room, segments) in &schedule.rooms {
        let fillers = segments
            .iter()
            .filter(|segment| segment.kind == SegmentKind::Filler)
            .count();
        println!(
            "{room}: {} segments ({fillers} fillers)",
            segments.len()
        );
    }
    if !schedule.skipped_sessions.is_empty() {
        println!("Skipped sessions: {}", schedule.skipped_sessions.join(", "));
    }
    println!(
        "{} warnings, {} overlaps, {} gaps",
        schedule.diagnostics.len(),
        schedule.validation.overlaps().count(),
        schedule.validation.gaps().count()
    );
    for warning in schedule.diagnostics.warnings() {
        println!("  warning: {warning}");
    }
}

/// Keeps ASCII letters, digits, `-` and `_`; everything else becomes `_`.
fn sanitize_file_name(room: &str) -> String {
    room.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"{
        "timezone": "-05:00",
        "rooms": [
            {"name": "Zurich A", "live": "live-a", "filler": "filler-a"},
            {"name": "Zurich B", "live": "live-b", "filler": "filler-b"}
        ],
        "sessions": [
            {"id": "s-1", "title": "OOPSLA 1", "room": "Zurich A", "tracks": ["OOPSLA"],
             "timeslots": [{"event_id": "ev-1", "slot_id": "slot-1", "title": "Paper",
                            "start": "2021-10-19T10:00", "end": "2021-10-19T10:15"}]},
            {"id": "s-2", "title": "OOPSLA 2", "room": "Zurich A", "tracks": ["OOPSLA"],
             "timeslots": [{"event_id": "ev-2", "slot_id": "slot-2", "title": "Paper 2",
                            "start": "2021-10-19T10:20", "end": "2021-10-19T10:35"}]}
        ],
        "assets": {
            "mappings": {"ev-1": "p1", "ev-2": "p2"},
            "durations": {"p1-video": "0:10:00", "p2-video": "0:20:00"}
        },
        "tracks": [{"name": "OOPSLA", "formats": [{"elements": [
            {"type": "prerecorded"},
            {"type": "live", "source": "{room.live}"}
        ]}]}]
    }"#;

    async fn write_plan(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("plan.json");
        fs::write(&path, json).await.unwrap();
        path
    }

    fn options(dir: &Path) -> GenerateOptions {
        GenerateOptions {
            output_dir: dir.join("out"),
            prefix: "splash-".to_string(),
            config: OnairConfig::for_testing(),
        }
    }

    #[test]
    fn test_command_run_label_fields() {
        let generate = Commands::Generate {
            plan: PathBuf::from("splash.json"),
            output_dir: PathBuf::from("playlists"),
            prefix: String::new(),
            frame_rate: None,
            filler_policy: None,
            sequential: false,
        };
        assert_eq!(generate.name(), "generate");
        assert_eq!(generate.plan(), Some(Path::new("splash.json")));

        let validate = Commands::Validate {
            playlists: vec![PathBuf::from("a.json")],
            strict: true,
        };
        assert_eq!(validate.name(), "validate");
        assert_eq!(validate.plan(), None);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("Zurich A"), "Zurich_A");
        assert_eq!(sanitize_file_name("Room 3/4 (Main)"), "Room_3_4__Main_");
        assert_eq!(sanitize_file_name("hall-1_b"), "hall-1_b");
    }

    #[tokio::test]
    async fn test_generate_writes_room_playlists() {
        let dir = tempfile::tempdir().unwrap();
        let plan = write_plan(dir.path(), PLAN).await;

        let written = generate(&plan, &options(dir.path())).await.unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("out/splash-Zurich_A.json"));

        let json = fs::read_to_string(&written[0]).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let categories: Vec<&str> = value["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["category"].as_str().unwrap())
            .collect();
        // The second talk fills its slot, so its live tail never airs.
        assert_eq!(categories, vec!["PROGRAM", "LIVE", "FILLER", "PROGRAM"]);
        assert_eq!(value["entries"][2]["duration"], "00:05:00:00");

        assert_eq!(validate_playlists(&written).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_validate_reports_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let overlapping = PLAN.replace("2021-10-19T10:20", "2021-10-19T10:10");
        let plan = write_plan(dir.path(), &overlapping).await;

        let written = generate(&plan, &options(dir.path())).await.unwrap();
        assert!(validate_playlists(&written).await.unwrap() > 0);
    }

    #[tokio::test]
    async fn test_check_surfaces_configuration_errors() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_plan(dir.path(), PLAN).await;
        assert!(check_plan(&good).await.is_ok());

        let broken = PLAN.replace(r#""type": "live", "source": "{room.live}""#, r#""type": "live""#);
        let bad = write_plan(dir.path(), &broken).await;
        let error = check_plan(&bad).await.unwrap_err();
        assert!(format!("{error:#}").contains("missing its source"));
    }

    #[tokio::test]
    async fn test_missing_plan_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = check_plan(&dir.path().join("absent.json")).await;
        assert!(result.is_err());
    }
}
