//! Status command for showing stored channels.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use tl_db::Database;

use crate::commands::util::format_timestamp;

pub fn run<W: Write>(writer: &mut W, db: &Database, database_path: &Path) -> Result<()> {
    let summaries = db.channel_summaries()?;

    writeln!(writer, "Timeline status")?;
    writeln!(writer, "Database: {}", database_path.display())?;

    if summaries.is_empty() {
        writeln!(writer, "No records stored.")?;
        return Ok(());
    }

    writeln!(writer, "Channels:")?;
    for summary in summaries {
        writeln!(
            writer,
            "- {} site {} channel {}: {} records, {} .. {}",
            summary.kind,
            summary.site_id,
            summary.channel_id,
            summary.record_count,
            format_timestamp(summary.first_start),
            format_timestamp(summary.last_end)
        )?;
    }

    Ok(())
}
