//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The window end precedes its start.
    #[error("invalid time range: end {end} is before start {start}")]
    InvalidTimeRange { start: i64, end: i64 },

    /// Invalid record kind value.
    #[error("unknown record kind: {value}")]
    UnknownRecordKind { value: String },

    /// An adaptive tolerance was configured with a zero divisor.
    #[error("adaptive tolerance divisor must be greater than zero")]
    ZeroDivisor,
}

/// The collection an interval record belongs to.
///
/// Each kind is merged independently of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Stored video clips.
    Recording,
    /// Human detections.
    Human,
    /// Vehicle detections.
    Vehicle,
    /// Analytics events.
    Event,
}

impl RecordKind {
    /// All kinds, in timeline order.
    pub const ALL: [Self; 4] = [Self::Recording, Self::Human, Self::Vehicle, Self::Event];

    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recording => "recording",
            Self::Human => "human",
            Self::Vehicle => "vehicle",
            Self::Event => "event",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recording" => Ok(Self::Recording),
            "human" => Ok(Self::Human),
            "vehicle" => Ok(Self::Vehicle),
            "event" => Ok(Self::Event),
            _ => Err(ValidationError::UnknownRecordKind {
                value: s.to_string(),
            }),
        }
    }
}
