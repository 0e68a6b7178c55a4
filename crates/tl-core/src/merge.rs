//! Interval merging with tolerance.
//!
//! # Algorithm Summary
//!
//! 1. Sort records by start (stable, so equal starts keep input order)
//! 2. Scan left to right, carrying the previous record's effective end
//!    (`end + tolerance`)
//! 3. A record whose start is beyond the previous effective end opens a new
//!    group; anything else joins the current group
//! 4. A group's end is the end of its last member in start order and its
//!    count is the sum of member counts
//!
//! Only the immediately preceding record is compared, not the running group
//! end. A long record followed by a short one does not keep the group open
//! past the short one's effective end.

use crate::record::{IntervalRecord, MergedInterval};
use crate::window::{RecordQuery, filter_records};

/// Sorts records ascending by start, keeping input order for ties.
pub fn sort_by_start(records: &mut [IntervalRecord]) {
    records.sort_by_key(|record| record.start_timestamp);
}

/// Merges records that are already sorted by start.
///
/// Output is ascending by start. Unsorted input is not rejected but groups
/// are then formed in input order.
pub fn merge_sorted(records: &[IntervalRecord], tolerance_ms: u64) -> Vec<MergedInterval> {
    let mut merged = Vec::new();
    let mut current: Option<MergedInterval> = None;
    let mut previous_effective_end: Option<i64> = None;

    for record in records {
        match (current.as_mut(), previous_effective_end) {
            (Some(group), Some(effective_end)) if effective_end >= record.start_timestamp => {
                group.absorb(record);
            }
            _ => {
                if let Some(group) = current.replace(MergedInterval::open(record)) {
                    merged.push(group);
                }
            }
        }
        previous_effective_end = Some(record.effective_end(tolerance_ms));
    }

    if let Some(group) = current {
        merged.push(group);
    }
    merged
}

/// Sorts and merges records.
pub fn merge(mut records: Vec<IntervalRecord>, tolerance_ms: u64) -> Vec<MergedInterval> {
    sort_by_start(&mut records);
    merge_sorted(&records, tolerance_ms)
}

/// Filters, sorts and merges records for a query.
pub fn timeline_for<'a, I>(records: I, query: &RecordQuery, tolerance_ms: u64) -> Vec<MergedInterval>
where
    I: IntoIterator<Item = &'a IntervalRecord>,
{
    merge(filter_records(records, query), tolerance_ms)
}
