//! Event store abstraction for the booking core.
//!
//! The `EventStore` trait is the port interface that storage adapters
//! implement. It is backend-independent; the one hard requirement is that
//! [`insert_if_free`](EventStore::insert_if_free) is atomic: the overlap
//! check and the insert must happen in a single critical section, making the
//! store, not the coordinator, the serialization point for concurrent
//! bookings.

use async_trait::async_trait;

use crate::errors::EventStoreResult;
use crate::event::{BookedEvent, NewEvent};
use crate::interval::Interval;
use crate::types::{EventId, ResourceId};

/// The core event store trait that all storage adapters must satisfy.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Atomically inserts a new event if none of its resources has an
    /// overlapping confirmed or tentative event.
    ///
    /// This is the serialization point for concurrent bookings: of two
    /// concurrent inserts competing for an overlapping slot, exactly one
    /// succeeds. On success the event is durably persisted and visible to
    /// subsequent readers with a freshly assigned [`EventId`] and creation
    /// timestamp. On failure, zero events are created.
    ///
    /// # Errors
    ///
    /// * `EventStoreError::OverlapConflict` - a target resource is already
    ///   booked for an overlapping interval
    /// * `EventStoreError::Unavailable` - the store is temporarily unreachable
    async fn insert_if_free(&self, event: NewEvent) -> EventStoreResult<BookedEvent>;

    /// Transitions an event to `Cancelled`, releasing its resources.
    ///
    /// Cancelling an already-cancelled event is a no-op. The event's
    /// interval is never mutated; re-booking requires a new event.
    ///
    /// # Errors
    ///
    /// Returns `EventStoreError::EventNotFound` if no event with this id
    /// exists.
    async fn cancel_event(&self, event_id: &EventId) -> EventStoreResult<()>;

    /// Returns all events whose interval intersects the window, in any
    /// status, ordered by start ascending with ties broken by creation
    /// order.
    async fn list_events(&self, window: &Interval) -> EventStoreResult<Vec<BookedEvent>>;

    /// Returns the confirmed and tentative events referencing any of the
    /// given resources, ordered by start ascending with ties broken by
    /// creation order.
    ///
    /// This is the read the Availability Index is rebuilt from; cancelled
    /// events are excluded because they no longer occupy anything.
    async fn read_resources(
        &self,
        resources: &[ResourceId],
    ) -> EventStoreResult<Vec<BookedEvent>>;

    /// Looks up a single event by id.
    async fn get_event(&self, event_id: &EventId) -> EventStoreResult<Option<BookedEvent>>;
}
