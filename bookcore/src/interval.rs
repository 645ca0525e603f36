//! Half-open time intervals.
//!
//! Every time range in the booking core is a half-open interval `[start, end)`
//! over UTC timestamps. Two intervals `[a, b)` and `[c, d)` overlap iff
//! `a < d && c < b`, so ranges that merely touch at a boundary (`b == c`)
//! never conflict.

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::types::Timestamp;

/// A half-open time interval `[start, end)`.
///
/// The smart constructor guarantees `start < end`, so a zero-length or
/// inverted interval is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "IntervalParts")]
pub struct Interval {
    start: Timestamp,
    end: Timestamp,
}

impl Interval {
    /// Creates an interval, rejecting `start >= end`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvertedInterval` if `start` is not strictly
    /// before `end`.
    pub fn new(
        start: impl Into<Timestamp>,
        end: impl Into<Timestamp>,
    ) -> Result<Self, ValidationError> {
        let (start, end) = (start.into(), end.into());
        if start >= end {
            return Err(ValidationError::InvertedInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// The inclusive start of the interval.
    pub const fn start(&self) -> Timestamp {
        self.start
    }

    /// The exclusive end of the interval.
    pub const fn end(&self) -> Timestamp {
        self.end
    }

    /// Whether two half-open intervals overlap.
    ///
    /// Boundary-touching intervals do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Serde mirror used to re-validate intervals on deserialization.
#[derive(Deserialize)]
struct IntervalParts {
    start: Timestamp,
    end: Timestamp,
}

impl TryFrom<IntervalParts> for Interval {
    type Error = ValidationError;

    fn try_from(parts: IntervalParts) -> Result<Self, Self::Error> {
        Self::new(parts.start, parts.end)
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
