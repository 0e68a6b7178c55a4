//! Merge command for one record kind.

use std::io::Write;

use anyhow::{Context, Result};
use tl_core::{MergedInterval, RecordQuery, TolerancePolicy, merge_from_source};
use tl_db::Database;

use crate::Config;
use crate::cli::MergeArgs;
use crate::commands::util::{format_duration, format_timestamp, query_from_args};

/// Runs the merge command.
pub fn run<W: Write>(writer: &mut W, db: &Database, config: &Config, args: &MergeArgs) -> Result<()> {
    let query = query_from_args(&args.window)?;
    let policy = args
        .tolerance_ms
        .map_or(config.tolerance, TolerancePolicy::fixed);

    let merged = merge_from_source(&db.source(args.kind), &query, &policy)
        .with_context(|| format!("failed to merge {} records", args.kind))?;
    tracing::info!(
        kind = %args.kind,
        site_id = query.site_id,
        channel_id = query.channel_id,
        merged = merged.len(),
        "merged intervals"
    );

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&merged)?)?;
        return Ok(());
    }

    writeln!(
        writer,
        "Merged {} intervals for site {}, channel {}",
        args.kind, query.site_id, query.channel_id
    )?;
    write_query_header(writer, &query, policy.resolve(&query.window))?;
    writeln!(writer)?;
    write_intervals(writer, &merged)?;
    Ok(())
}

/// Writes the window and resolved tolerance of a query.
pub fn write_query_header<W: Write>(
    writer: &mut W,
    query: &RecordQuery,
    tolerance_ms: u64,
) -> Result<()> {
    writeln!(
        writer,
        "Window:    {} .. {}",
        format_timestamp(query.window.start()),
        format_timestamp(query.window.end())
    )?;
    writeln!(writer, "Tolerance: {tolerance_ms} ms")?;
    Ok(())
}

/// Writes one line per merged interval.
pub fn write_intervals<W: Write>(writer: &mut W, intervals: &[MergedInterval]) -> Result<()> {
    if intervals.is_empty() {
        writeln!(writer, "No intervals.")?;
        return Ok(());
    }
    for interval in intervals {
        writeln!(
            writer,
            "{}  {}  {:>7}  count {}",
            format_timestamp(interval.start_timestamp),
            format_timestamp(interval.end_timestamp),
            format_duration(interval.duration_ms()),
            interval.object_count
        )?;
    }
    Ok(())
}
