//! Storage layer for timeline interval records.
//!
//! Provides persistence for interval records using `rusqlite` and serves them
//! back through [`tl_core::IntervalSource`].
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` can be moved between threads but not shared across them without
//! external synchronization. Callers that merge in parallel fetch first, then
//! hand the owned records to the workers.
//!
//! # Schema
//!
//! Timestamps are stored as INTEGER epoch milliseconds, matching the wire format.
//! The `kind` column holds the lowercase [`RecordKind`] name.

use std::path::Path;

use rusqlite::{Connection, params};
use thiserror::Error;
use tl_core::{IntervalRecord, IntervalSource, RecordKind, RecordQuery, ValidationError};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored row carries a kind this build does not know.
    #[error("invalid stored record kind")]
    InvalidKind(#[source] ValidationError),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Record count and time bounds for one kind of one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSummary {
    pub kind: RecordKind,
    pub site_id: i64,
    pub channel_id: i64,
    pub record_count: i64,
    pub first_start: i64,
    pub last_end: i64,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- start/end are epoch milliseconds
            CREATE TABLE IF NOT EXISTS intervals (
                id INTEGER PRIMARY KEY,
                kind TEXT NOT NULL,
                site_id INTEGER NOT NULL,
                channel_id INTEGER NOT NULL,
                start_timestamp INTEGER NOT NULL,
                end_timestamp INTEGER NOT NULL,
                object_count INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_intervals_start
                ON intervals(kind, site_id, channel_id, start_timestamp);
            CREATE INDEX IF NOT EXISTS idx_intervals_end
                ON intervals(kind, site_id, channel_id, end_timestamp);
            ",
        )?;
        Ok(())
    }

    /// Inserts a batch of records of one kind in a single transaction.
    pub fn insert_records(
        &mut self,
        kind: RecordKind,
        records: &[IntervalRecord],
    ) -> Result<usize, DbError> {
        if records.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO intervals
                (kind, site_id, channel_id, start_timestamp, end_timestamp, object_count)
                VALUES (?, ?, ?, ?, ?, ?)
                ",
            )?;
            for record in records {
                inserted += stmt.execute(params![
                    kind.as_str(),
                    record.site_id,
                    record.channel_id,
                    record.start_timestamp,
                    record.end_timestamp,
                    record.object_count,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(%kind, inserted, "inserted interval records");
        Ok(inserted)
    }

    /// Lists records of `kind` for the query's site/channel that overlap its window.
    ///
    /// A record overlaps when it starts inside the window, ends inside the
    /// window, or covers the whole window. Rows are ordered by start, then
    /// insertion order.
    pub fn fetch_overlapping(
        &self,
        kind: RecordKind,
        query: &RecordQuery,
    ) -> Result<Vec<IntervalRecord>, DbError> {
        let mut stmt = self.conn.prepare_cached(
            "
            SELECT site_id, channel_id, start_timestamp, end_timestamp, object_count
            FROM intervals
            WHERE kind = ?1
              AND site_id = ?2
              AND channel_id = ?3
              AND (
                    (start_timestamp >= ?4 AND start_timestamp <= ?5)
                 OR (end_timestamp >= ?4 AND end_timestamp <= ?5)
                 OR (start_timestamp <= ?4 AND end_timestamp >= ?5)
              )
            ORDER BY start_timestamp ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![
                kind.as_str(),
                query.site_id,
                query.channel_id,
                query.window.start(),
                query.window.end(),
            ],
            |row| {
                Ok(IntervalRecord {
                    site_id: row.get(0)?,
                    channel_id: row.get(1)?,
                    start_timestamp: row.get(2)?,
                    end_timestamp: row.get(3)?,
                    object_count: row.get(4)?,
                })
            },
        )?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Returns a source serving records of one kind.
    pub const fn source(&self, kind: RecordKind) -> KindSource<'_> {
        KindSource { db: self, kind }
    }

    /// Lists per-channel record counts and bounds, ordered by kind, site and channel.
    pub fn channel_summaries(&self) -> Result<Vec<ChannelSummary>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT kind, site_id, channel_id, COUNT(*), MIN(start_timestamp), MAX(end_timestamp)
            FROM intervals
            GROUP BY kind, site_id, channel_id
            ORDER BY kind ASC, site_id ASC, channel_id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })?;
        let mut summaries = Vec::new();
        for row in rows {
            let (kind, site_id, channel_id, record_count, first_start, last_end) = row?;
            let kind = kind.parse::<RecordKind>().map_err(DbError::InvalidKind)?;
            summaries.push(ChannelSummary {
                kind,
                site_id,
                channel_id,
                record_count,
                first_start,
                last_end,
            });
        }
        Ok(summaries)
    }
}

/// Records of a single kind, borrowed from a [`Database`].
pub struct KindSource<'a> {
    db: &'a Database,
    kind: RecordKind,
}

impl IntervalSource for KindSource<'_> {
    type Error = DbError;

    fn fetch(&self, query: &RecordQuery) -> Result<Vec<IntervalRecord>, Self::Error> {
        self.db.fetch_overlapping(self.kind, query)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use tl_core::{MergedInterval, TimeWindow, TolerancePolicy, filter_records, merge_from_source};

    fn rec(site: i64, channel: i64, start: i64, end: i64, count: i64) -> IntervalRecord {
        IntervalRecord::new(site, channel, start, end, count)
    }

    fn query(site: i64, channel: i64, start: i64, end: i64) -> RecordQuery {
        RecordQuery::new(site, channel, TimeWindow::new(start, end).unwrap())
    }

    #[test]
    fn test_open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_matches_data_model() {
        let db = Database::open_in_memory().unwrap();
        let mut stmt = db.conn.prepare("PRAGMA table_info(intervals)").unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(1))
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(
            columns,
            vec![
                "id",
                "kind",
                "site_id",
                "channel_id",
                "start_timestamp",
                "end_timestamp",
                "object_count",
            ]
        );

        let mut stmt = db.conn.prepare("PRAGMA index_list(intervals)").unwrap();
        let indices: HashSet<String> = stmt
            .query_map([], |row| row.get(1))
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert!(indices.contains("idx_intervals_start"));
        assert!(indices.contains("idx_intervals_end"));
    }

    #[test]
    fn test_reopening_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("tl.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.insert_records(RecordKind::Recording, &[rec(1, 1, 0, 10, 0)])
                .unwrap();
        }
        let db = Database::open(&path).unwrap();
        let records = db
            .fetch_overlapping(RecordKind::Recording, &query(1, 1, 0, 10))
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_insert_empty_batch_is_noop() {
        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(db.insert_records(RecordKind::Human, &[]).unwrap(), 0);
    }

    #[test]
    fn test_fetch_applies_overlap_predicate() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_records(
            RecordKind::Recording,
            &[
                rec(1, 1, 1_500, 3_000, 1), // starts inside
                rec(1, 1, 500, 1_500, 2),   // ends inside
                rec(1, 1, 0, 5_000, 3),     // covers
                rec(1, 1, 0, 999, 4),       // before
                rec(1, 1, 2_001, 3_000, 5), // after
                rec(1, 2, 1_200, 1_300, 6), // other channel
                rec(2, 1, 1_200, 1_300, 7), // other site
            ],
        )
        .unwrap();
        db.insert_records(RecordKind::Human, &[rec(1, 1, 1_200, 1_300, 8)])
            .unwrap();

        let records = db
            .fetch_overlapping(RecordKind::Recording, &query(1, 1, 1_000, 2_000))
            .unwrap();
        let counts: Vec<i64> = records.iter().map(|r| r.object_count).collect();
        // ordered by start, then insertion
        assert_eq!(counts, vec![3, 2, 1]);
    }

    #[test]
    fn test_sql_filter_agrees_with_in_memory_filter() {
        let mut db = Database::open_in_memory().unwrap();
        let mut records = Vec::new();
        for i in 0..50_i64 {
            let start = (i * 7_919) % 20_000;
            let end = start + (i * 104_729) % 3_000;
            records.push(rec(1, 1 + i % 2, start, end, i));
        }
        db.insert_records(RecordKind::Event, &records).unwrap();

        for (start, end) in [(0, 0), (5_000, 6_000), (10_000, 10_000), (0, 30_000)] {
            let q = query(1, 1, start, end);
            let mut from_db: Vec<i64> = db
                .fetch_overlapping(RecordKind::Event, &q)
                .unwrap()
                .iter()
                .map(|r| r.object_count)
                .collect();
            let mut in_memory: Vec<i64> = filter_records(&records, &q)
                .iter()
                .map(|r| r.object_count)
                .collect();
            from_db.sort_unstable();
            in_memory.sort_unstable();
            assert_eq!(from_db, in_memory, "window {start}..{end}");
        }
    }

    #[test]
    fn test_kind_source_feeds_merge() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_records(
            RecordKind::Vehicle,
            &[
                rec(5, 5, 104_000, 200_000, 3),
                rec(5, 5, 0, 100_000, 1),
                rec(5, 5, 300_000, 310_000, 2),
            ],
        )
        .unwrap();

        let source = db.source(RecordKind::Vehicle);
        let merged = merge_from_source(
            &source,
            &query(5, 5, 0, 1_000_000),
            &TolerancePolicy::default(),
        )
        .unwrap();
        assert_eq!(
            merged,
            vec![
                MergedInterval {
                    start_timestamp: 0,
                    end_timestamp: 200_000,
                    object_count: 4,
                },
                MergedInterval {
                    start_timestamp: 300_000,
                    end_timestamp: 310_000,
                    object_count: 2,
                },
            ]
        );
    }

    #[test]
    fn test_channel_summaries_group_by_kind_and_channel() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_records(
            RecordKind::Recording,
            &[rec(1, 1, 100, 200, 0), rec(1, 1, 50, 150, 0), rec(1, 2, 0, 10, 0)],
        )
        .unwrap();
        db.insert_records(RecordKind::Human, &[rec(1, 1, 10, 20, 4)])
            .unwrap();

        let summaries = db.channel_summaries().unwrap();
        assert_eq!(
            summaries,
            vec![
                ChannelSummary {
                    kind: RecordKind::Human,
                    site_id: 1,
                    channel_id: 1,
                    record_count: 1,
                    first_start: 10,
                    last_end: 20,
                },
                ChannelSummary {
                    kind: RecordKind::Recording,
                    site_id: 1,
                    channel_id: 1,
                    record_count: 2,
                    first_start: 50,
                    last_end: 200,
                },
                ChannelSummary {
                    kind: RecordKind::Recording,
                    site_id: 1,
                    channel_id: 2,
                    record_count: 1,
                    first_start: 0,
                    last_end: 10,
                },
            ]
        );
    }

    #[test]
    fn test_unknown_stored_kind_is_reported() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO intervals (kind, site_id, channel_id, start_timestamp, end_timestamp)
                 VALUES ('bus', 1, 1, 0, 1)",
                [],
            )
            .unwrap();
        let err = db.channel_summaries().unwrap_err();
        assert!(matches!(err, DbError::InvalidKind(_)));
    }
}
