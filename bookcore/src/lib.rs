//! `Bookcore` - booking and calendar core for production scheduling
//!
//! Turns ranked client slot preferences into confirmed, non-conflicting
//! calendar events. The store boundary is the serialization point: the
//! [`event_store::EventStore`] port requires an atomic conditional insert,
//! so any number of concurrent [`booking::BookingCoordinator`] instances
//! stay correct without in-process locking.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod availability;
pub mod booking;
pub mod calendar;
pub mod conflict;
pub mod errors;
pub mod event;
pub mod event_store;
pub mod interval;
pub mod types;

pub use availability::AvailabilityIndex;
pub use booking::{BookingCoordinator, BookingOutcome, BookingRequest, RejectReason, SlotPreference};
pub use calendar::{CalendarEvent, CalendarQueryService};
pub use errors::{
    BookingError, BookingResult, EventStoreError, EventStoreResult, ValidationError,
};
pub use event::{BookedEvent, EventStatus, NewEvent};
pub use event_store::EventStore;
pub use interval::Interval;
pub use types::{ClientId, EventId, ProjectId, ResourceId, ServiceType, Timestamp};
