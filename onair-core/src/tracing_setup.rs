//! Tracing setup for Onair
//!
//! Every invocation is labelled with a run id. The console shows onair events
//! at the chosen level; the trace file keeps the whole run so every
//! data-quality warning can be matched to the run that produced it.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;
use tracing::{Level, Span};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Crates whose events follow the console level; everything else is capped at warn.
const ONAIR_TARGETS: [&str; 2] = ["onair_core", "onair"];

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("Cannot prepare trace log {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Tracing already initialized: {0}")]
    Init(#[from] TryInitError),
}

/// Identifies one CLI invocation in logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLabel {
    pub run_id: String,
    pub command: String,
    pub plan: Option<PathBuf>,
}

impl RunLabel {
    /// Labels a run of `command` started now.
    pub fn new(command: impl Into<String>, plan: Option<&Path>) -> Self {
        Self {
            run_id: Local::now().format("%Y%m%dT%H%M%S%.3f").to_string(),
            command: command.into(),
            plan: plan.map(Path::to_path_buf),
        }
    }

    /// Trace file of the latest run of this command.
    pub fn log_file_name(&self) -> String {
        format!("onair-{}-last-run.log", self.command)
    }

    /// Root span every event of the run is recorded under.
    pub fn span(&self) -> Span {
        let plan = self
            .plan
            .as_deref()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        tracing::info_span!(
            "onair_run",
            run_id = %self.run_id,
            command = %self.command,
            plan = %plan
        )
    }
}

/// Console filter: onair crates at `level`, dependencies at warn.
///
/// `RUST_LOG` overrides this when set.
pub fn console_directives(level: Level) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        ONAIR_TARGETS
            .iter()
            .map(|target| format!("{target}={}", level.to_string().to_lowercase())),
    );
    directives.join(",")
}

/// Initialize tracing for one run: console at `console_level`, full trace to file.
///
/// Writes to `<logs_dir>/onair-<command>-last-run.log` (default `./logs`),
/// overwriting the previous run of the same command. Returns the trace file path.
///
/// # Errors
///
/// - `TracingError::LogFile` - Logs directory or trace file cannot be created
/// - `TracingError::Init` - A global subscriber is already installed
pub fn init_tracing(
    console_level: Level,
    logs_dir: Option<&Path>,
    run: &RunLabel,
) -> Result<PathBuf, TracingError> {
    let logs_path = logs_dir.unwrap_or_else(|| Path::new("logs"));
    let log_file_path = logs_path.join(run.log_file_name());
    let log_file = create_dir_all(logs_path)
        .and_then(|()| File::create(&log_file_path))
        .map_err(|source| TracingError::LogFile {
            path: log_file_path.clone(),
            source,
        })?;

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_directives(console_level)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(console_filter);

    // Scheduling runs on blocking workers, so thread names matter in the file.
    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(log_file)
        .with_filter(EnvFilter::new("trace"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!(
        run_id = %run.run_id,
        command = %run.command,
        "Onair run started: console={}, trace_file={}",
        console_level,
        log_file_path.display()
    );

    Ok(log_file_path)
}

/// CLI log levels for user control
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliLogLevel {
    /// Only error messages
    Error,
    /// Warning and error messages
    Warn,
    /// Informational, warning, and error messages
    Info,
    /// Debug, informational, warning, and error messages
    Debug,
    /// All messages including per-element scheduling decisions
    Trace,
}

impl CliLogLevel {
    /// Converts CLI log level to tracing Level enum.
    ///
    /// # Examples
    /// ```
    /// use onair_core::tracing_setup::CliLogLevel;
    ///
    /// let level = CliLogLevel::Warn.as_tracing_level();
    /// assert_eq!(level, tracing::Level::WARN);
    /// ```
    pub fn as_tracing_level(self) -> Level {
        match self {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliLogLevel::Error => write!(f, "error"),
            CliLogLevel::Warn => write!(f, "warn"),
            CliLogLevel::Info => write!(f, "info"),
            CliLogLevel::Debug => write!(f, "debug"),
            CliLogLevel::Trace => write!(f, "trace"),
        }
    }
}
