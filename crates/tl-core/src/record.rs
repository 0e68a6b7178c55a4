//! Interval records and merged intervals.

use serde::{Deserialize, Serialize};

/// A time-bounded observation for one site/channel.
///
/// Timestamps are epoch milliseconds. `start_timestamp <= end_timestamp` is
/// expected but not enforced here; the merge treats reversed records like any
/// other and produces well-defined (if meaningless) output for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalRecord {
    pub site_id: i64,
    pub channel_id: i64,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    /// Number of objects observed. Absent for collections without counts.
    #[serde(default)]
    pub object_count: i64,
}

impl IntervalRecord {
    /// Creates a record for the given site/channel.
    pub const fn new(
        site_id: i64,
        channel_id: i64,
        start_timestamp: i64,
        end_timestamp: i64,
        object_count: i64,
    ) -> Self {
        Self {
            site_id,
            channel_id,
            start_timestamp,
            end_timestamp,
            object_count,
        }
    }

    /// Record end extended by `tolerance_ms`, used only for adjacency checks.
    pub const fn effective_end(&self, tolerance_ms: u64) -> i64 {
        self.end_timestamp.saturating_add_unsigned(tolerance_ms)
    }
}

/// The union of one or more contiguous or overlapping records.
///
/// `end_timestamp` is the end of the member with the latest start, which can
/// be smaller than the largest member end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedInterval {
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub object_count: i64,
}

impl MergedInterval {
    /// Opens a group containing a single record.
    pub(crate) const fn open(record: &IntervalRecord) -> Self {
        Self {
            start_timestamp: record.start_timestamp,
            end_timestamp: record.end_timestamp,
            object_count: record.object_count,
        }
    }

    /// Adds a record to this group.
    pub(crate) const fn absorb(&mut self, record: &IntervalRecord) {
        self.end_timestamp = record.end_timestamp;
        self.object_count = self.object_count.saturating_add(record.object_count);
    }

    /// Length of the interval in milliseconds (zero if reversed).
    pub const fn duration_ms(&self) -> i64 {
        let span = self.end_timestamp.saturating_sub(self.start_timestamp);
        if span < 0 { 0 } else { span }
    }
}
