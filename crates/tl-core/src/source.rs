//! Fetching records from a backing store.

use std::convert::Infallible;
use std::error::Error as StdError;

use thiserror::Error;

use crate::merge::merge;
use crate::record::{IntervalRecord, MergedInterval};
use crate::tolerance::TolerancePolicy;
use crate::window::{RecordQuery, filter_records};

/// Errors from running a timeline query.
#[derive(Debug, Error)]
pub enum TimelineError {
    /// The backing store failed to return records. No partial output is produced.
    #[error("failed to fetch interval records")]
    Fetch(#[source] Box<dyn StdError + Send + Sync>),
}

/// A store that can return the records matching a query.
///
/// Implementations must return only records for which
/// [`RecordQuery::matches`] holds. Order is not significant.
pub trait IntervalSource {
    /// The store's error type.
    type Error: StdError + Send + Sync + 'static;

    /// Returns the records matching `query`.
    fn fetch(&self, query: &RecordQuery) -> Result<Vec<IntervalRecord>, Self::Error>;
}

impl IntervalSource for [IntervalRecord] {
    type Error = Infallible;

    fn fetch(&self, query: &RecordQuery) -> Result<Vec<IntervalRecord>, Self::Error> {
        Ok(filter_records(self, query))
    }
}

impl IntervalSource for Vec<IntervalRecord> {
    type Error = Infallible;

    fn fetch(&self, query: &RecordQuery) -> Result<Vec<IntervalRecord>, Self::Error> {
        self.as_slice().fetch(query)
    }
}

/// Fetches the records for `query` from `source` and merges them.
pub fn merge_from_source<S>(
    source: &S,
    query: &RecordQuery,
    policy: &TolerancePolicy,
) -> Result<Vec<MergedInterval>, TimelineError>
where
    S: IntervalSource + ?Sized,
{
    let records = source
        .fetch(query)
        .map_err(|e| TimelineError::Fetch(Box::new(e)))?;
    let tolerance_ms = policy.resolve(&query.window);
    tracing::debug!(
        site_id = query.site_id,
        channel_id = query.channel_id,
        record_count = records.len(),
        tolerance_ms,
        "fetched records for merge"
    );
    Ok(merge(records, tolerance_ms))
}
