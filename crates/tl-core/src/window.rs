//! Query windows and the record filter predicate.

use serde::Serialize;

use crate::record::IntervalRecord;
use crate::types::ValidationError;

/// An inclusive time window in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: i64,
    end: i64,
}

impl TimeWindow {
    /// Creates a window, rejecting `end < start`.
    pub const fn new(start: i64, end: i64) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub const fn start(&self) -> i64 {
        self.start
    }

    pub const fn end(&self) -> i64 {
        self.end
    }

    /// Width of the window in milliseconds.
    pub const fn span_ms(&self) -> u64 {
        self.end.abs_diff(self.start)
    }

    /// Returns true if `[start, end]` overlaps this window.
    ///
    /// A range overlaps when it starts inside the window, ends inside the
    /// window, or covers the whole window. Bounds are inclusive.
    pub const fn overlaps(&self, start: i64, end: i64) -> bool {
        let starts_inside = start >= self.start && start <= self.end;
        let ends_inside = end >= self.start && end <= self.end;
        let covers = start <= self.start && end >= self.end;
        starts_inside || ends_inside || covers
    }
}

/// Selects the records of one site/channel that overlap a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordQuery {
    pub site_id: i64,
    pub channel_id: i64,
    pub window: TimeWindow,
}

impl RecordQuery {
    pub const fn new(site_id: i64, channel_id: i64, window: TimeWindow) -> Self {
        Self {
            site_id,
            channel_id,
            window,
        }
    }

    /// Returns true if the record belongs to this site/channel and overlaps the window.
    pub const fn matches(&self, record: &IntervalRecord) -> bool {
        record.site_id == self.site_id
            && record.channel_id == self.channel_id
            && self
                .window
                .overlaps(record.start_timestamp, record.end_timestamp)
    }
}

/// Keeps the records matched by `query`, preserving input order.
pub fn filter_records<'a, I>(records: I, query: &RecordQuery) -> Vec<IntervalRecord>
where
    I: IntoIterator<Item = &'a IntervalRecord>,
{
    records
        .into_iter()
        .filter(|record| query.matches(record))
        .copied()
        .collect()
}
