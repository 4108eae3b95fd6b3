//! Persistence collaborator for materialized occurrences.

use std::collections::BTreeMap;

use almanac_recur::recur::OccurrenceSlot;
use uuid::Uuid;

use crate::error::ServiceResult;
use crate::timeline::{TimeRange, merge_timeline};

/// Where materialized occurrences are kept.
///
/// Materialization always produces the full series, so writes replace an
/// event's occurrences wholesale.
pub trait OccurrenceStore {
    /// ## Summary
    /// Replaces every stored occurrence of `event_id` with `slots`.
    ///
    /// ## Errors
    /// Returns an error if the backing store rejects the write.
    fn replace_occurrences(&mut self, event_id: Uuid, slots: Vec<OccurrenceSlot>)
    -> ServiceResult<()>;

    /// ## Summary
    /// Returns the stored occurrences of every event overlapping `range`,
    /// ordered on one timeline.
    ///
    /// ## Errors
    /// Returns an error if the backing store cannot be read.
    fn occurrences_between(&self, range: &TimeRange) -> ServiceResult<Vec<OccurrenceSlot>>;

    /// ## Summary
    /// Drops every occurrence of `event_id`, returning whether any existed.
    ///
    /// ## Errors
    /// Returns an error if the backing store rejects the write.
    fn remove_event(&mut self, event_id: Uuid) -> ServiceResult<bool>;
}

/// Process-local store keyed by event.
#[derive(Debug, Default)]
pub struct InMemoryOccurrenceStore {
    events: BTreeMap<Uuid, Vec<OccurrenceSlot>>,
}

impl InMemoryOccurrenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events with stored occurrences.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

impl OccurrenceStore for InMemoryOccurrenceStore {
    fn replace_occurrences(
        &mut self,
        event_id: Uuid,
        slots: Vec<OccurrenceSlot>,
    ) -> ServiceResult<()> {
        tracing::trace!(%event_id, count = slots.len(), "Replacing occurrences");
        if slots.is_empty() {
            self.events.remove(&event_id);
        } else {
            self.events.insert(event_id, slots);
        }
        Ok(())
    }

    fn occurrences_between(&self, range: &TimeRange) -> ServiceResult<Vec<OccurrenceSlot>> {
        Ok(merge_timeline(self.events.values().map(|slots| {
            slots
                .iter()
                .filter(|slot| range.overlaps(slot))
                .cloned()
                .collect::<Vec<_>>()
        })))
    }

    fn remove_event(&mut self, event_id: Uuid) -> ServiceResult<bool> {
        Ok(self.events.remove(&event_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use almanac_recur::recur::{DaySlot, SlotDetails};
    use chrono::{Datelike, NaiveDate, TimeZone, Utc};

    fn day_slot(day: u32, title: &str) -> OccurrenceSlot {
        let date = NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        OccurrenceSlot::Day(DaySlot {
            start: date,
            end: date,
            details: SlotDetails {
                title: title.to_string(),
                ..SlotDetails::default()
            },
        })
    }

    fn may(from: u32, to: u32) -> TimeRange {
        TimeRange::new(
            Utc.with_ymd_and_hms(2024, 5, from, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, to, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_replace_overwrites_previous_series() {
        let mut store = InMemoryOccurrenceStore::new();
        let event = Uuid::new_v4();

        store
            .replace_occurrences(event, vec![day_slot(1, "old"), day_slot(8, "old")])
            .unwrap();
        store.replace_occurrences(event, vec![day_slot(2, "new")]).unwrap();

        let slots = store.occurrences_between(&may(1, 31)).unwrap();
        assert_eq!(slots, vec![day_slot(2, "new")]);
    }

    #[test]
    fn test_range_query_spans_events() {
        let mut store = InMemoryOccurrenceStore::new();
        store
            .replace_occurrences(Uuid::new_v4(), vec![day_slot(3, "a"), day_slot(10, "a")])
            .unwrap();
        store
            .replace_occurrences(Uuid::new_v4(), vec![day_slot(5, "b"), day_slot(20, "b")])
            .unwrap();

        let slots = store.occurrences_between(&may(3, 11)).unwrap();
        let starts: Vec<u32> = slots
            .iter()
            .map(|slot| slot.start_instant().date_naive().day())
            .collect();

        assert_eq!(starts, vec![3, 5, 10]);
        assert_eq!(store.event_count(), 2);
    }

    #[test]
    fn test_remove_event() {
        let mut store = InMemoryOccurrenceStore::new();
        let event = Uuid::new_v4();
        store.replace_occurrences(event, vec![day_slot(1, "x")]).unwrap();

        assert!(store.remove_event(event).unwrap());
        assert!(!store.remove_event(event).unwrap());
        assert_eq!(store.event_count(), 0);
    }

    #[test]
    fn test_empty_series_clears_event() {
        let mut store = InMemoryOccurrenceStore::new();
        let event = Uuid::new_v4();
        store.replace_occurrences(event, vec![day_slot(1, "x")]).unwrap();
        store.replace_occurrences(event, Vec::new()).unwrap();

        assert_eq!(store.event_count(), 0);
    }
}
