//! In-memory adapter for the `bookcore` booking core
//!
//! This crate provides an in-memory implementation of the `EventStore` trait
//! from the bookcore crate, useful for testing and single-process deployments
//! where persistence is not required. The overlap check and the insert run
//! under one write lock, which makes `insert_if_free` the atomic conditional
//! insert the port contract demands.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::significant_drop_tightening)]

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bookcore::availability::AvailabilityIndex;
use bookcore::conflict;
use bookcore::errors::{EventStoreError, EventStoreResult};
use bookcore::event::{BookedEvent, EventStatus, NewEvent};
use bookcore::event_store::EventStore;
use bookcore::interval::Interval;
use bookcore::types::{EventId, ResourceId, Timestamp};

/// Thread-safe in-memory event store.
///
/// Cloning yields another handle to the same storage, so a cloned store can
/// be handed to multiple concurrent coordinators.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[derive(Debug, Default)]
struct StoreInner {
    // Append-only except for the cancellation status transition
    events: Vec<BookedEvent>,
    // Kept incrementally in sync with the active events above
    index: AvailabilityIndex,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    fn sort_for_listing(events: &mut [BookedEvent]) {
        // Start ascending; EventId is UUIDv7, so it breaks ties by creation order
        events.sort_by_key(|event| (event.interval.start(), event.id));
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn insert_if_free(&self, event: NewEvent) -> EventStoreResult<BookedEvent> {
        let mut inner = self.inner.write().expect("RwLock poisoned");

        if let Some(resource) =
            conflict::first_conflict(&inner.index, &event.interval(), event.resources())
        {
            return Err(EventStoreError::OverlapConflict {
                resource: resource.clone(),
                interval: event.interval(),
            });
        }

        let record = event.into_record(EventId::new(), Timestamp::now());
        inner.index.observe(&record);
        inner.events.push(record.clone());

        Ok(record)
    }

    async fn cancel_event(&self, event_id: &EventId) -> EventStoreResult<()> {
        let mut inner = self.inner.write().expect("RwLock poisoned");

        let Some(position) = inner.events.iter().position(|event| &event.id == event_id) else {
            return Err(EventStoreError::EventNotFound(*event_id));
        };

        if inner.events[position].status == EventStatus::Cancelled {
            return Ok(());
        }

        let snapshot = inner.events[position].clone();
        inner.index.release(&snapshot);
        inner.events[position].status = EventStatus::Cancelled;

        Ok(())
    }

    async fn list_events(&self, window: &Interval) -> EventStoreResult<Vec<BookedEvent>> {
        let inner = self.inner.read().expect("RwLock poisoned");

        let mut matching: Vec<BookedEvent> = inner
            .events
            .iter()
            .filter(|event| event.interval.overlaps(window))
            .cloned()
            .collect();

        Self::sort_for_listing(&mut matching);
        Ok(matching)
    }

    async fn read_resources(
        &self,
        resources: &[ResourceId],
    ) -> EventStoreResult<Vec<BookedEvent>> {
        let inner = self.inner.read().expect("RwLock poisoned");

        let mut matching: Vec<BookedEvent> = inner
            .events
            .iter()
            .filter(|event| {
                event.blocks_availability()
                    && event
                        .resources
                        .iter()
                        .any(|resource| resources.contains(resource))
            })
            .cloned()
            .collect();

        Self::sort_for_listing(&mut matching);
        Ok(matching)
    }

    async fn get_event(&self, event_id: &EventId) -> EventStoreResult<Option<BookedEvent>> {
        let inner = self.inner.read().expect("RwLock poisoned");

        Ok(inner
            .events
            .iter()
            .find(|event| &event.id == event_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookcore::types::{ProjectId, ServiceType};
    use chrono::DateTime;
    use std::collections::BTreeSet;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::new(DateTime::from_timestamp(secs, 0).unwrap())
    }

    fn iv(start: i64, end: i64) -> Interval {
        Interval::new(ts(start), ts(end)).unwrap()
    }

    fn rid(name: &str) -> ResourceId {
        ResourceId::try_new(name).unwrap()
    }

    fn proposal(resource: &str, start: i64, end: i64) -> NewEvent {
        NewEvent::confirmed(
            ServiceType::try_new("shoot").unwrap(),
            iv(start, end),
            BTreeSet::from([rid(resource)]),
            ProjectId::try_new("proj-1").unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn new_store_is_empty() {
        let store = InMemoryEventStore::new();
        let window = iv(0, 1_000_000);
        assert!(store.list_events(&window).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clone_shares_storage() {
        let store1 = InMemoryEventStore::new();
        let store2 = store1.clone();

        store1.insert_if_free(proposal("room-1", 0, 60)).await.unwrap();

        let seen = store2.list_events(&iv(0, 120)).await.unwrap();
        assert_eq!(seen.len(), 1);
    }

    #[tokio::test]
    async fn insert_assigns_identity_and_persists() {
        let store = InMemoryEventStore::new();

        let stored = store.insert_if_free(proposal("room-1", 0, 60)).await.unwrap();
        assert_eq!(stored.status, EventStatus::Confirmed);

        let fetched = store.get_event(&stored.id).await.unwrap();
        assert_eq!(fetched, Some(stored));
    }

    #[tokio::test]
    async fn overlapping_insert_is_rejected() {
        let store = InMemoryEventStore::new();
        store.insert_if_free(proposal("room-1", 0, 60)).await.unwrap();

        let result = store.insert_if_free(proposal("room-1", 30, 90)).await;
        assert!(matches!(
            result,
            Err(EventStoreError::OverlapConflict { .. })
        ));

        // The failed insert left no partial state behind
        assert_eq!(store.list_events(&iv(0, 120)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn boundary_touching_insert_succeeds() {
        let store = InMemoryEventStore::new();
        store.insert_if_free(proposal("room-1", 0, 60)).await.unwrap();
        store.insert_if_free(proposal("room-1", 60, 120)).await.unwrap();

        assert_eq!(store.list_events(&iv(0, 120)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn disjoint_resources_never_conflict() {
        let store = InMemoryEventStore::new();
        store.insert_if_free(proposal("room-1", 0, 60)).await.unwrap();
        store.insert_if_free(proposal("room-2", 0, 60)).await.unwrap();

        assert_eq!(store.list_events(&iv(0, 60)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn cancellation_releases_the_slot() {
        let store = InMemoryEventStore::new();
        let stored = store.insert_if_free(proposal("room-1", 0, 60)).await.unwrap();

        store.cancel_event(&stored.id).await.unwrap();

        // The slot can be re-booked by a brand-new event
        let rebooked = store.insert_if_free(proposal("room-1", 0, 60)).await.unwrap();
        assert_ne!(rebooked.id, stored.id);

        let cancelled = store.get_event(&stored.id).await.unwrap().unwrap();
        assert_eq!(cancelled.status, EventStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancelling_twice_is_a_no_op() {
        let store = InMemoryEventStore::new();
        let stored = store.insert_if_free(proposal("room-1", 0, 60)).await.unwrap();

        store.cancel_event(&stored.id).await.unwrap();
        store.cancel_event(&stored.id).await.unwrap();

        let cancelled = store.get_event(&stored.id).await.unwrap().unwrap();
        assert_eq!(cancelled.status, EventStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancelling_an_unknown_event_fails() {
        let store = InMemoryEventStore::new();
        let result = store.cancel_event(&EventId::new()).await;
        assert!(matches!(result, Err(EventStoreError::EventNotFound(_))));
    }

    #[tokio::test]
    async fn listing_orders_by_start_then_creation() {
        let store = InMemoryEventStore::new();
        let late = store.insert_if_free(proposal("room-1", 120, 180)).await.unwrap();
        let early = store.insert_if_free(proposal("room-1", 0, 60)).await.unwrap();
        let tied_first = store.insert_if_free(proposal("room-2", 60, 120)).await.unwrap();
        // UUIDv7 tie-breaking needs distinct millisecond timestamps
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let tied_second = store.insert_if_free(proposal("room-3", 60, 120)).await.unwrap();

        let listed = store.list_events(&iv(0, 180)).await.unwrap();
        let ids: Vec<EventId> = listed.iter().map(|event| event.id).collect();
        assert_eq!(ids, vec![early.id, tied_first.id, tied_second.id, late.id]);
    }

    #[tokio::test]
    async fn listing_includes_cancelled_events() {
        let store = InMemoryEventStore::new();
        let stored = store.insert_if_free(proposal("room-1", 0, 60)).await.unwrap();
        store.cancel_event(&stored.id).await.unwrap();

        let listed = store.list_events(&iv(0, 60)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, EventStatus::Cancelled);
    }

    #[tokio::test]
    async fn resource_reads_exclude_cancelled_events() {
        let store = InMemoryEventStore::new();
        let stored = store.insert_if_free(proposal("room-1", 0, 60)).await.unwrap();
        store.insert_if_free(proposal("room-1", 60, 120)).await.unwrap();
        store.cancel_event(&stored.id).await.unwrap();

        let active = store.read_resources(&[rid("room-1")]).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].interval, iv(60, 120));
    }
}
