//! Calendar query service.
//!
//! Read-only projection of the Event Store into display DTOs for calendar
//! views. Applies no business logic, is idempotent, and is safe to call
//! concurrently with bookings; it may observe a slightly stale snapshot but
//! never a partially written event.

use serde::{Deserialize, Serialize};

use crate::errors::EventStoreResult;
use crate::event::{BookedEvent, EventStatus};
use crate::event_store::EventStore;
use crate::interval::Interval;

/// Display DTO for one calendar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Human-readable title, built from the service and owning project.
    pub title: String,
    /// The occupied time range.
    pub interval: Interval,
    /// Labels of the resources involved.
    pub resources: Vec<String>,
    /// Lifecycle status, so views can render cancellations distinctly.
    pub status: EventStatus,
}

impl From<BookedEvent> for CalendarEvent {
    fn from(event: BookedEvent) -> Self {
        Self {
            title: format!("{} ({})", event.service, event.project),
            interval: event.interval,
            resources: event.resources.iter().map(ToString::to_string).collect(),
            status: event.status,
        }
    }
}

/// Read-only calendar projection over an event store.
#[derive(Debug, Clone)]
pub struct CalendarQueryService<S> {
    store: S,
}

impl<S: EventStore> CalendarQueryService<S> {
    /// Creates a query service over the given store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// All calendar entries intersecting the window, ordered by start
    /// ascending with ties broken by creation order.
    pub async fn events_in_range(&self, window: &Interval) -> EventStoreResult<Vec<CalendarEvent>> {
        let events = self.store.list_events(window).await?;
        Ok(events.into_iter().map(CalendarEvent::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EventStoreError;
    use crate::event::NewEvent;
    use crate::types::{EventId, ProjectId, ResourceId, ServiceType, Timestamp};
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::collections::BTreeSet;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::new(DateTime::from_timestamp(secs, 0).unwrap())
    }

    fn sample_event() -> BookedEvent {
        NewEvent::confirmed(
            ServiceType::try_new("promo-shoot").unwrap(),
            Interval::new(ts(0), ts(3600)).unwrap(),
            BTreeSet::from([
                ResourceId::try_new("room-1").unwrap(),
                ResourceId::try_new("cam-a").unwrap(),
            ]),
            ProjectId::try_new("proj-42").unwrap(),
        )
        .unwrap()
        .into_record(EventId::new(), Timestamp::now())
    }

    /// Store double serving a fixed event list.
    struct FixedStore(Vec<BookedEvent>);

    #[async_trait]
    impl EventStore for FixedStore {
        async fn insert_if_free(&self, _event: NewEvent) -> EventStoreResult<BookedEvent> {
            Err(EventStoreError::Unavailable("read-only".to_string()))
        }

        async fn cancel_event(&self, _event_id: &EventId) -> EventStoreResult<()> {
            Err(EventStoreError::Unavailable("read-only".to_string()))
        }

        async fn list_events(&self, window: &Interval) -> EventStoreResult<Vec<BookedEvent>> {
            Ok(self
                .0
                .iter()
                .filter(|event| event.interval.overlaps(window))
                .cloned()
                .collect())
        }

        async fn read_resources(
            &self,
            _resources: &[ResourceId],
        ) -> EventStoreResult<Vec<BookedEvent>> {
            Ok(self.0.clone())
        }

        async fn get_event(&self, _event_id: &EventId) -> EventStoreResult<Option<BookedEvent>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn maps_stored_events_to_display_dtos() {
        let service = CalendarQueryService::new(FixedStore(vec![sample_event()]));
        let window = Interval::new(ts(0), ts(86_400)).unwrap();

        let entries = service.events_in_range(&window).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "promo-shoot (proj-42)");
        assert_eq!(entries[0].resources, vec!["cam-a", "room-1"]);
        assert_eq!(entries[0].status, EventStatus::Confirmed);
    }

    #[tokio::test]
    async fn window_filtering_is_delegated_to_the_store() {
        let service = CalendarQueryService::new(FixedStore(vec![sample_event()]));
        let later = Interval::new(ts(7200), ts(10_800)).unwrap();

        let entries = service.events_in_range(&later).await.unwrap();
        assert!(entries.is_empty());
    }
}
