//! Derived availability index.
//!
//! Maps each resource to the sorted list of intervals it is booked for,
//! drawn from all confirmed and tentative events. The index is a read-derived
//! cache with no independent authority: it must always be reconstructable
//! from the Event Store and is never consulted as a source of truth for
//! writes. The per-resource no-overlap invariant is enforced by the Conflict
//! Checker before insertion, not by the index itself.

use std::collections::HashMap;

use crate::event::BookedEvent;
use crate::interval::Interval;
use crate::types::ResourceId;

/// Per-resource busy intervals, each list sorted by start.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityIndex {
    busy: HashMap<ResourceId, Vec<Interval>>,
}

impl AvailabilityIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from a set of stored events, skipping cancelled ones.
    pub fn rebuild<'a>(events: impl IntoIterator<Item = &'a BookedEvent>) -> Self {
        let mut index = Self::new();
        for event in events {
            index.observe(event);
        }
        index
    }

    /// Patches the index with a newly stored event.
    ///
    /// Cancelled events are ignored; they occupy nothing.
    pub fn observe(&mut self, event: &BookedEvent) {
        if !event.blocks_availability() {
            return;
        }
        for resource in &event.resources {
            self.insert(resource.clone(), event.interval);
        }
    }

    /// Removes a cancelled event's interval from each of its resources.
    pub fn release(&mut self, event: &BookedEvent) {
        for resource in &event.resources {
            if let Some(intervals) = self.busy.get_mut(resource) {
                if let Some(position) = intervals.iter().position(|iv| iv == &event.interval) {
                    intervals.remove(position);
                }
                if intervals.is_empty() {
                    self.busy.remove(resource);
                }
            }
        }
    }

    /// Inserts a busy interval for a resource, maintaining sort order by
    /// start time.
    pub fn insert(&mut self, resource: ResourceId, interval: Interval) {
        let intervals = self.busy.entry(resource).or_default();
        let position = intervals.partition_point(|iv| iv.start() < interval.start());
        intervals.insert(position, interval);
    }

    /// The booked intervals for a resource, sorted by start. Empty slice if
    /// the resource has no bookings.
    pub fn for_resource(&self, resource: &ResourceId) -> &[Interval] {
        self.busy.get(resource).map_or(&[], Vec::as_slice)
    }

    /// Whether every resource's interval list is sorted and free of
    /// overlaps.
    ///
    /// A well-behaved store can never produce an inconsistent index; this
    /// scan exists so tests can verify the global no-double-booking
    /// invariant post-hoc.
    pub fn is_consistent(&self) -> bool {
        self.busy.values().all(|intervals| {
            intervals
                .windows(2)
                .all(|pair| pair[0].end() <= pair[1].start())
        })
    }

    /// Iterates the resources currently holding at least one booking.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceId> + '_ {
        self.busy.keys()
    }
}
