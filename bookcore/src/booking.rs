//! Booking coordination.
//!
//! Turns a client's ranked slot preferences into a confirmed, non-conflicting
//! calendar event, or a rejection. The coordinator holds no lock of its own:
//! it speculatively filters preferences with the Conflict Checker, then lets
//! the store's atomic [`insert_if_free`](crate::event_store::EventStore::insert_if_free)
//! arbitrate races. A request is consumed exactly once and is terminal either
//! way; a rejected request requires a brand-new submission.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::availability::AvailabilityIndex;
use crate::conflict;
use crate::errors::{BookingResult, EventStoreError, ValidationError};
use crate::event::{BookedEvent, NewEvent};
use crate::event_store::EventStore;
use crate::interval::Interval;
use crate::types::{ClientId, ProjectId, ResourceId, ServiceType, Timestamp};

/// One preferred slot: an interval plus the resources it would occupy.
///
/// Rank is positional: a preference's index within
/// [`BookingRequest::preferences`] is its rank, lower preferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SlotPreferenceParts")]
pub struct SlotPreference {
    interval: Interval,
    resources: BTreeSet<ResourceId>,
}

impl SlotPreference {
    /// Creates a preference, rejecting an empty resource set.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyResourceSet` if `resources` is empty.
    pub fn new(
        interval: Interval,
        resources: BTreeSet<ResourceId>,
    ) -> Result<Self, ValidationError> {
        if resources.is_empty() {
            return Err(ValidationError::EmptyResourceSet);
        }
        Ok(Self {
            interval,
            resources,
        })
    }

    /// The preferred time range.
    pub const fn interval(&self) -> Interval {
        self.interval
    }

    /// The resources this preference would occupy.
    pub const fn resources(&self) -> &BTreeSet<ResourceId> {
        &self.resources
    }
}

/// Serde mirror used to re-validate preferences on deserialization.
#[derive(Deserialize)]
struct SlotPreferenceParts {
    interval: Interval,
    resources: BTreeSet<ResourceId>,
}

impl TryFrom<SlotPreferenceParts> for SlotPreference {
    type Error = ValidationError;

    fn try_from(parts: SlotPreferenceParts) -> Result<Self, Self::Error> {
        Self::new(parts.interval, parts.resources)
    }
}

/// A client's booking submission: ranked slot preferences for one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    client: ClientId,
    project: ProjectId,
    service: ServiceType,
    preferences: Vec<SlotPreference>,
    submitted_at: Timestamp,
}

impl BookingRequest {
    /// Creates a booking request.
    ///
    /// An empty preference list is representable but rejected by
    /// [`BookingCoordinator::submit_booking`] before any store access.
    pub fn new(
        client: ClientId,
        project: ProjectId,
        service: ServiceType,
        preferences: Vec<SlotPreference>,
        submitted_at: Timestamp,
    ) -> Self {
        Self {
            client,
            project,
            service,
            preferences,
            submitted_at,
        }
    }

    /// The submitting client, as verified by the identity provider.
    pub const fn client(&self) -> &ClientId {
        &self.client
    }

    /// The project the booking belongs to.
    pub const fn project(&self) -> &ProjectId {
        &self.project
    }

    /// The service being booked.
    pub const fn service(&self) -> &ServiceType {
        &self.service
    }

    /// The ranked preferences, most preferred first.
    pub fn preferences(&self) -> &[SlotPreference] {
        &self.preferences
    }

    /// When the client submitted the request.
    pub const fn submitted_at(&self) -> Timestamp {
        self.submitted_at
    }

    /// Every resource named by any preference, deduplicated.
    fn all_resources(&self) -> Vec<ResourceId> {
        let set: BTreeSet<ResourceId> = self
            .preferences
            .iter()
            .flat_map(|preference| preference.resources.iter().cloned())
            .collect();
        set.into_iter().collect()
    }
}

/// Why a booking was rejected.
///
/// A rejection is a normal terminal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Every preference conflicted with an existing booking.
    NoAvailableSlot,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAvailableSlot => f.write_str("no available slot"),
        }
    }
}

/// The terminal outcome of a booking submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingOutcome {
    /// The first conflict-free preference was booked as this event.
    Confirmed(BookedEvent),
    /// No preference could be booked; zero events were created.
    Rejected(RejectReason),
}

impl BookingOutcome {
    /// Whether the booking was confirmed.
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    /// The confirmed event, if any.
    pub const fn event(&self) -> Option<&BookedEvent> {
        match self {
            Self::Confirmed(event) => Some(event),
            Self::Rejected(_) => None,
        }
    }
}

/// Orchestrates booking submissions against an event store.
///
/// The coordinator is stateless between calls; any number of coordinator
/// instances may run concurrently against the same store, since the store is
/// the serialization point.
#[derive(Debug, Clone)]
pub struct BookingCoordinator<S> {
    store: S,
}

impl<S: EventStore> BookingCoordinator<S> {
    /// Creates a coordinator over the given store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Processes a booking request to its terminal outcome.
    ///
    /// Preferences are tried in rank order. Conflicting ones are skipped via
    /// a speculative check against a freshly rebuilt availability index; the
    /// first apparently-free preference is handed to the store, which
    /// re-checks and inserts atomically. Losing that race demotes the
    /// preference and iteration continues. Exactly one event is created on
    /// confirmation; none on rejection.
    ///
    /// # Errors
    ///
    /// * `BookingError::Validation` - the preference list is empty; returned
    ///   before any store access
    /// * `BookingError::Store` - the store failed for a reason other than a
    ///   slot conflict
    #[instrument(
        skip(self, request),
        fields(client = %request.client(), preferences = request.preferences().len())
    )]
    pub async fn submit_booking(&self, request: BookingRequest) -> BookingResult<BookingOutcome> {
        if request.preferences.is_empty() {
            return Err(ValidationError::EmptyPreferences.into());
        }

        let events = self.store.read_resources(&request.all_resources()).await?;
        let index = AvailabilityIndex::rebuild(&events);

        for (rank, preference) in request.preferences.iter().enumerate() {
            if conflict::has_conflict(&index, &preference.interval(), preference.resources()) {
                debug!(rank, interval = %preference.interval(), "preference conflicts, skipping");
                continue;
            }

            let proposal = NewEvent::confirmed(
                request.service.clone(),
                preference.interval(),
                preference.resources().clone(),
                request.project.clone(),
            )?;

            match self.store.insert_if_free(proposal).await {
                Ok(event) => {
                    info!(rank, event_id = %event.id, interval = %event.interval, "booking confirmed");
                    return Ok(BookingOutcome::Confirmed(event));
                }
                Err(EventStoreError::OverlapConflict { resource, interval }) => {
                    warn!(rank, %resource, %interval, "lost slot race, trying next preference");
                }
                Err(other) => return Err(other.into()),
            }
        }

        info!("booking rejected, no preference was available");
        Ok(BookingOutcome::Rejected(RejectReason::NoAvailableSlot))
    }
}
