//! Merge tolerance policies.
//!
//! The tolerance is the largest gap, in milliseconds, between one record's
//! end and the next record's start for the two to land in the same group.

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;
use crate::window::TimeWindow;

/// Default fixed tolerance.
pub const DEFAULT_TOLERANCE_MS: u64 = 5_000;

/// Default divisor for [`TolerancePolicy::Adaptive`].
pub const DEFAULT_ADAPTIVE_DIVISOR: u64 = 5_000;

/// Default lower bound for [`TolerancePolicy::Adaptive`].
pub const DEFAULT_ADAPTIVE_FLOOR_MS: u64 = 100;

/// How the tolerance for a query is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TolerancePolicy {
    /// The same tolerance for every query.
    Fixed {
        #[serde(default = "default_tolerance_ms")]
        ms: u64,
    },
    /// Tolerance proportional to the queried window, so wide windows merge
    /// more aggressively than narrow ones.
    ///
    /// Resolves to `span / divisor`, or `floor_ms` when that is zero.
    Adaptive {
        #[serde(default = "default_adaptive_divisor")]
        divisor: u64,
        #[serde(default = "default_adaptive_floor_ms")]
        floor_ms: u64,
    },
}

const fn default_tolerance_ms() -> u64 {
    DEFAULT_TOLERANCE_MS
}

const fn default_adaptive_divisor() -> u64 {
    DEFAULT_ADAPTIVE_DIVISOR
}

const fn default_adaptive_floor_ms() -> u64 {
    DEFAULT_ADAPTIVE_FLOOR_MS
}

impl Default for TolerancePolicy {
    fn default() -> Self {
        Self::Fixed {
            ms: DEFAULT_TOLERANCE_MS,
        }
    }
}

impl TolerancePolicy {
    /// Fixed tolerance of `ms` milliseconds.
    pub const fn fixed(ms: u64) -> Self {
        Self::Fixed { ms }
    }

    /// Adaptive tolerance with the default divisor and floor.
    pub const fn adaptive() -> Self {
        Self::Adaptive {
            divisor: DEFAULT_ADAPTIVE_DIVISOR,
            floor_ms: DEFAULT_ADAPTIVE_FLOOR_MS,
        }
    }

    /// Rejects configurations that cannot be resolved.
    pub const fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Adaptive { divisor: 0, .. } => Err(ValidationError::ZeroDivisor),
            _ => Ok(()),
        }
    }

    /// Tolerance in milliseconds for a query over `window`.
    pub const fn resolve(&self, window: &TimeWindow) -> u64 {
        match *self {
            Self::Fixed { ms } => ms,
            Self::Adaptive { divisor, floor_ms } => match window.span_ms().checked_div(divisor) {
                Some(0) | None => floor_ms,
                Some(ms) => ms,
            },
        }
    }
}
