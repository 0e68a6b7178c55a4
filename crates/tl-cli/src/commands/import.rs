//! Import command for loading interval records into the local `SQLite` store.

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use clap::Args;
use tl_core::{IntervalRecord, RecordKind};
use tl_db::Database;

use crate::cli::parse_kind;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Record kind of every imported line.
    #[arg(long, default_value = "recording", value_parser = parse_kind)]
    pub kind: RecordKind,
}

/// Reads JSONL records from stdin and stores them. Returns the number inserted.
pub fn run(db: &mut Database, args: &ImportArgs) -> Result<usize> {
    let stdin = io::stdin();
    import_from(db, stdin.lock(), args.kind)
}

fn import_from<R: BufRead>(db: &mut Database, reader: R, kind: RecordKind) -> Result<usize> {
    let records = parse_records(reader)?;
    let inserted = db.insert_records(kind, &records)?;
    tracing::info!(%kind, inserted, "imported interval records");
    Ok(inserted)
}

fn parse_records<R: BufRead>(reader: R) -> Result<Vec<IntervalRecord>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record: IntervalRecord = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        if record.start_timestamp > record.end_timestamp {
            anyhow::bail!(
                "invalid record on line {}: startTimestamp {} is after endTimestamp {}",
                idx + 1,
                record.start_timestamp,
                record.end_timestamp
            );
        }
        records.push(record);
    }
    Ok(records)
}
