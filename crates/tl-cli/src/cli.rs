//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tl_core::RecordKind;

use crate::commands::import::ImportArgs;

/// Timeline interval merger.
///
/// Stores time-bounded observation records per site/channel and merges
/// records that overlap or sit within a tolerance of each other.
#[derive(Debug, Parser)]
#[command(name = "tl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the database if it does not exist.
    Init,

    /// Import JSONL interval records from stdin.
    Import(ImportArgs),

    /// Merge the records of one kind for a site/channel window.
    Merge(MergeArgs),

    /// Merge every record kind for a site/channel window.
    Timeline(TimelineArgs),

    /// Show stored channels and their time bounds.
    Status,
}

/// Site, channel and window selecting the records to merge.
#[derive(Debug, Clone, Args)]
pub struct WindowArgs {
    /// Site identifier.
    #[arg(long)]
    pub site: i64,

    /// Channel identifier.
    #[arg(long)]
    pub channel: i64,

    /// Window start: epoch milliseconds, ISO 8601, or relative ("2 hours ago").
    #[arg(long)]
    pub start: String,

    /// Window end: epoch milliseconds, ISO 8601, or relative. Defaults to now.
    #[arg(long)]
    pub end: Option<String>,
}

/// Arguments for `tl merge`.
#[derive(Debug, Args)]
pub struct MergeArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    /// Record kind to merge.
    #[arg(long, default_value = "recording", value_parser = parse_kind)]
    pub kind: RecordKind,

    /// Fixed tolerance in milliseconds, overriding the configured policy.
    #[arg(long)]
    pub tolerance_ms: Option<u64>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `tl timeline`.
#[derive(Debug, Args)]
pub struct TimelineArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    /// Fixed tolerance in milliseconds, overriding the configured policy.
    #[arg(long)]
    pub tolerance_ms: Option<u64>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Parses a record kind argument.
pub fn parse_kind(s: &str) -> Result<RecordKind, String> {
    s.parse::<RecordKind>().map_err(|e| e.to_string())
}
