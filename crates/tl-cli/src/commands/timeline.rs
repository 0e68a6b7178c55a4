//! Timeline command merging every record kind of a channel.
//!
//! Records are fetched kind by kind on the calling thread (the connection is
//! not `Sync`), then merged in parallel.

use std::io::Write;

use anyhow::{Context, Result};
use tl_core::{RecordKind, TimelineResponse, TolerancePolicy, build_timeline};
use tl_db::Database;

use crate::Config;
use crate::cli::TimelineArgs;
use crate::commands::merge::{write_intervals, write_query_header};
use crate::commands::util::query_from_args;

/// Runs the timeline command.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    config: &Config,
    args: &TimelineArgs,
) -> Result<()> {
    let query = query_from_args(&args.window)?;
    let policy = args
        .tolerance_ms
        .map_or(config.tolerance, TolerancePolicy::fixed);
    let tolerance_ms = policy.resolve(&query.window);

    let mut batches = Vec::with_capacity(RecordKind::ALL.len());
    for kind in RecordKind::ALL {
        let records = db
            .fetch_overlapping(kind, &query)
            .with_context(|| format!("failed to fetch {kind} records"))?;
        tracing::debug!(%kind, count = records.len(), "fetched records");
        batches.push((kind, records));
    }

    let timeline = build_timeline(batches, tolerance_ms);
    for (kind, count) in timeline.counts() {
        tracing::info!(%kind, count, "merged intervals");
    }

    if args.json {
        let response = TimelineResponse::success(timeline);
        writeln!(writer, "{}", serde_json::to_string_pretty(&response)?)?;
        return Ok(());
    }

    writeln!(
        writer,
        "Timeline for site {}, channel {}",
        query.site_id, query.channel_id
    )?;
    write_query_header(writer, &query, tolerance_ms)?;
    for kind in RecordKind::ALL {
        writeln!(writer)?;
        writeln!(writer, "{kind}:")?;
        write_intervals(writer, timeline.get(kind))?;
    }
    Ok(())
}
