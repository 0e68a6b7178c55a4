//! Core domain logic for timeline queries.
//!
//! This crate contains the fundamental types and logic for:
//! - Filtering: selecting the records of a site/channel that overlap a window
//! - Merging: collapsing records within a tolerance into merged intervals
//! - Timelines: merging every record kind of a channel in parallel

mod merge;
mod record;
mod source;
mod timeline;
pub mod tolerance;
mod types;
mod window;

pub use merge::{merge, merge_sorted, sort_by_start, timeline_for};
pub use record::{IntervalRecord, MergedInterval};
pub use source::{IntervalSource, TimelineError, merge_from_source};
pub use timeline::{Timeline, TimelineResponse, build_timeline};
pub use tolerance::TolerancePolicy;
pub use types::{RecordKind, ValidationError};
pub use window::{RecordQuery, TimeWindow, filter_records};
