//! Per-kind timelines and the response envelope.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::merge::merge;
use crate::record::{IntervalRecord, MergedInterval};
use crate::types::RecordKind;

/// Merged intervals for every record kind of one site/channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(rename = "recording")]
    pub recordings: Vec<MergedInterval>,
    #[serde(rename = "human")]
    pub humans: Vec<MergedInterval>,
    #[serde(rename = "vehicle")]
    pub vehicles: Vec<MergedInterval>,
    #[serde(rename = "event")]
    pub events: Vec<MergedInterval>,
}

impl Timeline {
    /// Merged intervals for `kind`.
    pub fn get(&self, kind: RecordKind) -> &[MergedInterval] {
        match kind {
            RecordKind::Recording => &self.recordings,
            RecordKind::Human => &self.humans,
            RecordKind::Vehicle => &self.vehicles,
            RecordKind::Event => &self.events,
        }
    }

    fn slot_mut(&mut self, kind: RecordKind) -> &mut Vec<MergedInterval> {
        match kind {
            RecordKind::Recording => &mut self.recordings,
            RecordKind::Human => &mut self.humans,
            RecordKind::Vehicle => &mut self.vehicles,
            RecordKind::Event => &mut self.events,
        }
    }

    /// Number of merged intervals per kind, in timeline order.
    pub fn counts(&self) -> Vec<(RecordKind, usize)> {
        RecordKind::ALL
            .iter()
            .map(|&kind| (kind, self.get(kind).len()))
            .collect()
    }
}

/// Merges per-kind record batches in parallel.
///
/// Batches sharing a kind are concatenated before merging. Kinds without a
/// batch are left empty.
pub fn build_timeline(
    batches: Vec<(RecordKind, Vec<IntervalRecord>)>,
    tolerance_ms: u64,
) -> Timeline {
    let mut by_kind: BTreeMap<RecordKind, Vec<IntervalRecord>> = BTreeMap::new();
    for (kind, records) in batches {
        by_kind.entry(kind).or_default().extend(records);
    }

    let merged: Vec<(RecordKind, Vec<MergedInterval>)> = by_kind
        .into_par_iter()
        .map(|(kind, records)| {
            let input_len = records.len();
            let intervals = merge(records, tolerance_ms);
            tracing::debug!(%kind, input_len, merged_len = intervals.len(), "merged kind");
            (kind, intervals)
        })
        .collect();

    let mut timeline = Timeline::default();
    for (kind, intervals) in merged {
        *timeline.slot_mut(kind) = intervals;
    }
    timeline
}

/// Response envelope wrapping a timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineResponse {
    pub return_value: String,
    pub code: i32,
    pub status: u16,
    pub description: String,
    pub message: String,
    #[serde(rename = "result")]
    pub results: Vec<Timeline>,
}

impl TimelineResponse {
    /// A successful response carrying `timeline`.
    pub fn success(timeline: Timeline) -> Self {
        Self {
            return_value: "SUCCESS".to_string(),
            code: 0,
            status: 200,
            description: "OK".to_string(),
            message: "Successfully Retrieved!".to_string(),
            results: vec![timeline],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(start: i64, end: i64, count: i64) -> IntervalRecord {
        IntervalRecord::new(1, 1, start, end, count)
    }

    #[test]
    fn test_kinds_are_merged_independently() {
        let timeline = build_timeline(
            vec![
                (RecordKind::Recording, vec![rec(0, 100, 0), rec(2_000, 3_000, 0)]),
                (RecordKind::Human, vec![rec(0, 100, 2), rec(50_000, 60_000, 1)]),
            ],
            5_000,
        );
        assert_eq!(timeline.recordings.len(), 1);
        assert_eq!(timeline.humans.len(), 2);
        assert!(timeline.vehicles.is_empty());
        assert!(timeline.events.is_empty());
    }

    #[test]
    fn test_duplicate_kinds_are_concatenated() {
        let timeline = build_timeline(
            vec![
                (RecordKind::Vehicle, vec![rec(4_000, 5_000, 1)]),
                (RecordKind::Vehicle, vec![rec(0, 100, 2)]),
            ],
            5_000,
        );
        assert_eq!(
            timeline.vehicles,
            vec![MergedInterval {
                start_timestamp: 0,
                end_timestamp: 5_000,
                object_count: 3,
            }]
        );
    }

    #[test]
    fn test_counts_follow_kind_order() {
        let timeline = build_timeline(vec![(RecordKind::Event, vec![rec(0, 1, 1)])], 0);
        assert_eq!(
            timeline.counts(),
            vec![
                (RecordKind::Recording, 0),
                (RecordKind::Human, 0),
                (RecordKind::Vehicle, 0),
                (RecordKind::Event, 1),
            ]
        );
    }

    #[test]
    fn test_response_envelope_shape() {
        let response = TimelineResponse::success(Timeline::default());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "returnValue": "SUCCESS",
                "code": 0,
                "status": 200,
                "description": "OK",
                "message": "Successfully Retrieved!",
                "result": [{"recording": [], "human": [], "vehicle": [], "event": []}],
            })
        );
    }
}
