//! Calendar event records.
//!
//! `BookedEvent` is the durable record owned by the Event Store; `NewEvent`
//! is the validated insert payload handed to
//! [`EventStore::insert_if_free`](crate::event_store::EventStore::insert_if_free).
//! A confirmed event is immutable except for the status transition to
//! `Cancelled`; re-booking after cancellation requires a brand-new event.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::interval::Interval;
use crate::types::{EventId, ProjectId, ResourceId, ServiceType, Timestamp};

/// Lifecycle status of a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Reserved but not finally confirmed; still blocks conflicting bookings.
    Tentative,
    /// Confirmed booking.
    Confirmed,
    /// Cancelled; terminal, releases the event's resources.
    Cancelled,
}

impl EventStatus {
    /// Whether events in this status occupy their resources.
    pub const fn blocks_availability(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Tentative => "tentative",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// A calendar event as stored by the Event Store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedEvent {
    /// Unique identifier; UUIDv7, so ordering follows creation order.
    pub id: EventId,
    /// The service this event delivers.
    pub service: ServiceType,
    /// The occupied time range.
    pub interval: Interval,
    /// The resources this event occupies. Never empty.
    pub resources: BTreeSet<ResourceId>,
    /// Current lifecycle status.
    pub status: EventStatus,
    /// The project that owns this event.
    pub project: ProjectId,
    /// When the event was stored.
    pub created_at: Timestamp,
}

impl BookedEvent {
    /// Whether this event currently occupies its resources.
    pub const fn blocks_availability(&self) -> bool {
        self.status.blocks_availability()
    }
}

/// A validated proposal for a new calendar event.
///
/// Construction rejects empty resource sets, and only `tentative` or
/// `confirmed` proposals can be built: a cancelled proposal is
/// unrepresentable. Interval validity is established earlier, at
/// [`Interval`] construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    service: ServiceType,
    interval: Interval,
    resources: BTreeSet<ResourceId>,
    project: ProjectId,
    status: EventStatus,
}

impl NewEvent {
    /// Creates a proposal for a confirmed event.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyResourceSet` if `resources` is empty.
    pub fn confirmed(
        service: ServiceType,
        interval: Interval,
        resources: BTreeSet<ResourceId>,
        project: ProjectId,
    ) -> Result<Self, ValidationError> {
        Self::validated(service, interval, resources, project, EventStatus::Confirmed)
    }

    /// Creates a proposal for a tentative hold.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyResourceSet` if `resources` is empty.
    pub fn tentative(
        service: ServiceType,
        interval: Interval,
        resources: BTreeSet<ResourceId>,
        project: ProjectId,
    ) -> Result<Self, ValidationError> {
        Self::validated(service, interval, resources, project, EventStatus::Tentative)
    }

    fn validated(
        service: ServiceType,
        interval: Interval,
        resources: BTreeSet<ResourceId>,
        project: ProjectId,
        status: EventStatus,
    ) -> Result<Self, ValidationError> {
        if resources.is_empty() {
            return Err(ValidationError::EmptyResourceSet);
        }
        Ok(Self {
            service,
            interval,
            resources,
            project,
            status,
        })
    }

    /// The service being booked.
    pub const fn service(&self) -> &ServiceType {
        &self.service
    }

    /// The proposed time range.
    pub const fn interval(&self) -> Interval {
        self.interval
    }

    /// The resources the event would occupy.
    pub const fn resources(&self) -> &BTreeSet<ResourceId> {
        &self.resources
    }

    /// The owning project.
    pub const fn project(&self) -> &ProjectId {
        &self.project
    }

    /// The status the event will be created with.
    pub const fn status(&self) -> EventStatus {
        self.status
    }

    /// Materializes the stored record once the store has assigned identity
    /// and a creation timestamp.
    pub fn into_record(self, id: EventId, created_at: Timestamp) -> BookedEvent {
        BookedEvent {
            id,
            service: self.service,
            interval: self.interval,
            resources: self.resources,
            status: self.status,
            project: self.project,
            created_at,
        }
    }
}
