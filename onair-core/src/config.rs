//! Centralized configuration for Onair.
//!
//! All tunable playout and scheduling parameters are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use chrono::TimeDelta;

/// Central configuration for all Onair components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct OnairConfig {
    pub playout: PlayoutConfig,
    pub scheduling: SchedulingConfig,
}

/// Which gaps the filler step is allowed to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FillerPolicy {
    /// Only gaps between two different sessions
    #[default]
    BetweenSessions,
    /// Also gaps inside sessions of non-compacting tracks
    AllGaps,
}

impl std::fmt::Display for FillerPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BetweenSessions => write!(f, "between-sessions"),
            Self::AllGaps => write!(f, "all-gaps"),
        }
    }
}

impl std::str::FromStr for FillerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "between-sessions" | "between_sessions" | "sessions" => Ok(Self::BetweenSessions),
            "all-gaps" | "all_gaps" | "all" => Ok(Self::AllGaps),
            _ => Err(format!(
                "Invalid filler policy: '{s}'. Valid options are: between-sessions, all-gaps"
            )),
        }
    }
}

/// Playout device output configuration.
///
/// Controls timecode precision and how uncovered air time is filled.
#[derive(Debug, Clone)]
pub struct PlayoutConfig {
    /// Frames per second used for on-air times and duration timecodes
    pub frame_rate: u32,
    /// Title prefix for synthesized filler segments
    pub filler_prefix: String,
    /// Which gaps receive a filler segment
    pub filler_policy: FillerPolicy,
    /// Gaps no longer than this are left unfilled
    pub min_filler: TimeDelta,
}

impl Default for PlayoutConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            filler_prefix: "FILLER_".to_string(),
            filler_policy: FillerPolicy::BetweenSessions,
            min_filler: TimeDelta::zero(),
        }
    }
}

/// Scheduling engine configuration.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    /// Schedule sessions on worker threads instead of one after another
    pub parallel: bool,
    /// Fail instead of skipping sessions held in rooms we do not broadcast
    pub reject_unknown_rooms: bool,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            reject_unknown_rooms: false,
        }
    }
}

impl OnairConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(rate) = std::env::var("ONAIR_FRAME_RATE")
            && let Ok(frames) = rate.parse::<u32>()
            && frames > 0
        {
            config.playout.frame_rate = frames;
        }

        if let Ok(policy) = std::env::var("ONAIR_FILLER_POLICY")
            && let Ok(policy) = policy.parse::<FillerPolicy>()
        {
            config.playout.filler_policy = policy;
        }

        if let Ok(parallel) = std::env::var("ONAIR_PARALLEL") {
            config.scheduling.parallel = parallel.parse().unwrap_or(true);
        }

        config
    }

    /// Creates a configuration optimized for testing.
    ///
    /// Sequential scheduling keeps log output ordered; unknown rooms fail loudly.
    pub fn for_testing() -> Self {
        Self {
            playout: PlayoutConfig::default(),
            scheduling: SchedulingConfig {
                parallel: false,
                reject_unknown_rooms: true,
            },
        }
    }
}
