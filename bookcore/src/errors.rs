//! Error types for the booking core.
//!
//! The taxonomy separates failures by subsystem so callers can react
//! appropriately:
//!
//! - **`ValidationError`**: malformed input, surfaced immediately, never
//!   retried.
//! - **`EventStoreError`**: persistence-layer failures, including the
//!   overlap conflict raised by the store's atomic conditional insert.
//! - **`BookingError`**: failures of a booking submission as a whole.
//!
//! A conflict-driven rejection of a booking is *not* an error: the Booking
//! Coordinator folds `EventStoreError::OverlapConflict` into the normal
//! `BookingOutcome::Rejected` path. Errors are reserved for malformed input
//! and infrastructure failures.

use thiserror::Error;

use crate::interval::Interval;
use crate::types::{EventId, ResourceId, Timestamp};

/// Result alias for event store operations.
pub type EventStoreResult<T> = Result<T, EventStoreError>;

/// Result alias for booking submissions.
pub type BookingResult<T> = Result<T, BookingError>;

/// Malformed input detected before any store access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The interval's start is not strictly before its end.
    #[error("interval start {start} is not before end {end}")]
    InvertedInterval {
        /// The offending start timestamp.
        start: Timestamp,
        /// The offending end timestamp.
        end: Timestamp,
    },

    /// A booking request was submitted with no preferences at all.
    #[error("booking request has no slot preferences")]
    EmptyPreferences,

    /// A slot preference or event proposal names no resources.
    #[error("resource set is empty")]
    EmptyResourceSet,
}

/// Failures at the persistence layer.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The referenced event does not exist.
    #[error("event '{0}' not found")]
    EventNotFound(EventId),

    /// The atomic conditional insert found an overlapping confirmed or
    /// tentative event for one of the target resources.
    #[error("resource '{resource}' is already booked within {interval}")]
    OverlapConflict {
        /// The first resource found to be double-booked.
        resource: ResourceId,
        /// The proposed interval that lost the slot.
        interval: Interval,
    },

    /// Transient infrastructure failure. Retryable by the caller; the core
    /// itself never retries.
    #[error("event store unavailable: {0}")]
    Unavailable(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a booking submission.
#[derive(Debug, Error)]
pub enum BookingError {
    /// The request was malformed; nothing was read from or written to the
    /// store.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The store failed for a reason other than a slot conflict.
    #[error("event store error: {0}")]
    Store(#[from] EventStoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use crate::types::Timestamp;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::new(DateTime::from_timestamp(secs, 0).unwrap())
    }

    #[test]
    fn overlap_conflict_names_the_resource() {
        let err = EventStoreError::OverlapConflict {
            resource: ResourceId::try_new("room-1").unwrap(),
            interval: Interval::new(ts(0), ts(60)).unwrap(),
        };
        assert!(err.to_string().contains("room-1"));
    }

    #[test]
    fn validation_errors_convert_into_booking_errors() {
        let err: BookingError = ValidationError::EmptyPreferences.into();
        assert!(matches!(
            err,
            BookingError::Validation(ValidationError::EmptyPreferences)
        ));
    }

    #[test]
    fn store_errors_convert_into_booking_errors() {
        let err: BookingError = EventStoreError::Unavailable("connection refused".to_string()).into();
        assert!(matches!(err, BookingError::Store(_)));
    }
}
