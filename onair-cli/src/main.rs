//! Onair CLI - Command-line interface
//!
//! Generates per-room broadcast playlists from a conference plan and
//! re-validates playlists that were written earlier.

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use onair_core::tracing_setup::{CliLogLevel, RunLabel, init_tracing};
use tracing::Instrument;

#[derive(Parser)]
#[command(name = "onair")]
#[command(about = "Conference broadcast playlist scheduler")]
struct Cli {
    /// Console log level
    #[arg(long, value_enum, default_value_t = CliLogLevel::Info, global = true)]
    log_level: CliLogLevel,

    /// Directory for the full trace log of this run
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let run = RunLabel::new(cli.command.name(), cli.command.plan());
    init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref(), &run)
        .context("Failed to initialize tracing")?;

    commands::handle_command(cli.command)
        .instrument(run.span())
        .await
}
