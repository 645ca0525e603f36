//! Conflict checking against the availability index.
//!
//! Pure functions of the index state, safe to call speculatively any number
//! of times. The authoritative check happens again inside the store's atomic
//! insert; these functions let the coordinator skip preferences that are
//! obviously lost without paying for a write attempt.

use crate::availability::AvailabilityIndex;
use crate::interval::Interval;
use crate::types::ResourceId;

/// Whether booking `proposed` would double-book any of the given resources.
///
/// Short-circuits on the first conflicting resource.
pub fn has_conflict<'a>(
    index: &AvailabilityIndex,
    proposed: &Interval,
    resources: impl IntoIterator<Item = &'a ResourceId>,
) -> bool {
    first_conflict(index, proposed, resources).is_some()
}

/// The first resource whose busy intervals overlap `proposed`, if any.
pub fn first_conflict<'a>(
    index: &AvailabilityIndex,
    proposed: &Interval,
    resources: impl IntoIterator<Item = &'a ResourceId>,
) -> Option<&'a ResourceId> {
    resources
        .into_iter()
        .find(|resource| overlaps_any(index.for_resource(resource), proposed))
}

/// Overlap search over one resource's busy list.
///
/// `busy` is sorted by start and overlap-free, so it is also sorted by end;
/// the first interval ending after `proposed.start()` is the only candidate
/// that can overlap.
fn overlaps_any(busy: &[Interval], proposed: &Interval) -> bool {
    let candidate = busy.partition_point(|iv| iv.end() <= proposed.start());
    busy.get(candidate)
        .is_some_and(|iv| iv.start() < proposed.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use proptest::prelude::*;

    use crate::types::Timestamp;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::new(DateTime::from_timestamp(secs, 0).unwrap())
    }

    fn iv(start: i64, end: i64) -> Interval {
        Interval::new(ts(start), ts(end)).unwrap()
    }

    fn rid(name: &str) -> ResourceId {
        ResourceId::try_new(name).unwrap()
    }

    fn index_with(resource: &str, intervals: &[Interval]) -> AvailabilityIndex {
        let mut index = AvailabilityIndex::new();
        for interval in intervals {
            index.insert(rid(resource), *interval);
        }
        index
    }

    #[test]
    fn free_resource_never_conflicts() {
        let index = AvailabilityIndex::new();
        let resource = rid("room-1");
        assert!(!has_conflict(&index, &iv(0, 60), [&resource]));
    }

    #[test]
    fn boundary_touching_slot_is_free() {
        let index = index_with("room-1", &[iv(600, 660)]);
        let resource = rid("room-1");
        assert!(!has_conflict(&index, &iv(660, 720), [&resource]));
        assert!(!has_conflict(&index, &iv(540, 600), [&resource]));
        assert!(has_conflict(&index, &iv(630, 690), [&resource]));
    }

    #[test]
    fn short_circuits_on_the_first_busy_resource() {
        let mut index = index_with("room-1", &[iv(0, 60)]);
        index.insert(rid("cam-a"), iv(0, 60));
        let room = rid("room-1");
        let cam = rid("cam-a");
        let free = rid("crew-z");

        assert_eq!(first_conflict(&index, &iv(30, 90), [&free, &cam, &room]), Some(&cam));
        assert_eq!(first_conflict(&index, &iv(60, 90), [&room, &cam, &free]), None);
    }

    proptest! {
        // Generate a sorted, overlap-free busy list from (gap, length) pairs
        // and compare the binary search against a naive linear scan.
        #[test]
        fn binary_search_agrees_with_linear_scan(
            segments in prop::collection::vec((1i64..50, 1i64..50), 0..20),
            probe_start in 0i64..2_500,
            probe_len in 1i64..200,
        ) {
            let mut busy = Vec::new();
            let mut cursor = 0;
            for (gap, len) in segments {
                let start = cursor + gap;
                busy.push(iv(start, start + len));
                cursor = start + len;
            }

            let proposed = iv(probe_start, probe_start + probe_len);
            let naive = busy.iter().any(|interval| interval.overlaps(&proposed));
            prop_assert_eq!(overlaps_any(&busy, &proposed), naive);
        }
    }
}
