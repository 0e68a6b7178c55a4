//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use regex::Regex;
use tl_core::{RecordQuery, TimeWindow};

use crate::cli::WindowArgs;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(second|minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in seconds).
const MAX_RELATIVE_SECONDS: i64 = 1000 * 365 * 24 * 60 * 60;

/// Parse a timestamp as epoch milliseconds, ISO 8601, or relative time.
///
/// Supports:
/// - Epoch milliseconds: "1732271925859"
/// - ISO 8601: "2026-01-15T10:30:00Z"
/// - Relative: "30 seconds ago", "2 hours ago", "1 day ago", "1 week ago"
pub fn parse_timestamp_ms(s: &str) -> anyhow::Result<i64> {
    parse_timestamp_ms_at(s, Utc::now())
}

fn parse_timestamp_ms_at(s: &str, now: DateTime<Utc>) -> anyhow::Result<i64> {
    let s = s.trim();
    if let Ok(ms) = s.parse::<i64>() {
        return Ok(ms);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }

    // Try relative time: "N seconds/minutes/hours/days/weeks ago"
    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid timestamp: {s}. Use epoch milliseconds, ISO 8601 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let seconds_per_unit = match &caps[2] {
        "second" => 1,
        "minute" => 60,
        "hour" => 60 * 60,
        "day" => 60 * 60 * 24,
        "week" => 60 * 60 * 24 * 7,
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > MAX_RELATIVE_SECONDS / seconds_per_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    let duration = Duration::seconds(n * seconds_per_unit);
    Ok((now - duration).timestamp_millis())
}

/// Builds the record query described by window arguments.
pub fn query_from_args(args: &WindowArgs) -> anyhow::Result<RecordQuery> {
    let start = parse_timestamp_ms(&args.start).context("invalid --start")?;
    let end = match &args.end {
        Some(end) => parse_timestamp_ms(end).context("invalid --end")?,
        None => Utc::now().timestamp_millis(),
    };
    let window = TimeWindow::new(start, end)?;
    Ok(RecordQuery::new(args.site, args.channel, window))
}

/// Formats epoch milliseconds as an RFC 3339 UTC timestamp.
///
/// Values outside chrono's range fall back to the raw number.
pub fn format_timestamp(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms).map_or_else(
        || ms.to_string(),
        |dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

/// Formats a duration in milliseconds as "1h 5m", "4m 20s" or "12s".
pub fn format_duration(ms: i64) -> String {
    if ms < 0 {
        return "0s".to_string();
    }
    let total_seconds = ms / 1_000;
    let hours = total_seconds / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else if minutes >= 1 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
