//! Occurrence slots and their timeline ordering.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use almanac_core::types::SlotKind;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptive fields copied verbatim onto every slot of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDetails {
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub guests: BTreeSet<String>,
}

/// A whole-day occurrence. `end` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlot {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(flatten)]
    pub details: SlotDetails,
}

/// A timed occurrence, normalised to UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(flatten)]
    pub details: SlotDetails,
}

/// One materialized occurrence from either domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OccurrenceSlot {
    Day(DaySlot),
    Time(TimeSlot),
}

impl OccurrenceSlot {
    #[must_use]
    pub const fn kind(&self) -> SlotKind {
        match self {
            Self::Day(_) => SlotKind::Day,
            Self::Time(_) => SlotKind::Time,
        }
    }

    #[must_use]
    pub const fn details(&self) -> &SlotDetails {
        match self {
            Self::Day(slot) => &slot.details,
            Self::Time(slot) => &slot.details,
        }
    }

    /// Start instant on the UTC timeline; day slots start at midnight UTC.
    #[must_use]
    pub fn start_instant(&self) -> DateTime<Utc> {
        match self {
            Self::Day(slot) => midnight_utc(slot.start),
            Self::Time(slot) => slot.start,
        }
    }

    /// Exclusive end instant; a day slot ends at midnight after its last day.
    #[must_use]
    pub fn end_instant(&self) -> DateTime<Utc> {
        match self {
            Self::Day(slot) => midnight_utc(slot.end.checked_add_days(Days::new(1)).unwrap_or(slot.end)),
            Self::Time(slot) => slot.end,
        }
    }
}

impl From<DaySlot> for OccurrenceSlot {
    fn from(slot: DaySlot) -> Self {
        Self::Day(slot)
    }
}

impl From<TimeSlot> for OccurrenceSlot {
    fn from(slot: TimeSlot) -> Self {
        Self::Time(slot)
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// ## Summary
/// Orders slots on a single timeline.
///
/// Day slots compare by date, time slots by UTC instant, and a day slot
/// against a time slot by its date at midnight UTC. Equal starts compare
/// `Equal`; nothing else breaks the tie.
#[must_use]
pub fn compare_slots(a: &OccurrenceSlot, b: &OccurrenceSlot) -> Ordering {
    match (a, b) {
        (OccurrenceSlot::Day(a), OccurrenceSlot::Day(b)) => a.start.cmp(&b.start),
        (OccurrenceSlot::Time(a), OccurrenceSlot::Time(b)) => a.start.cmp(&b.start),
        (OccurrenceSlot::Day(day), OccurrenceSlot::Time(time)) => {
            midnight_utc(day.start).cmp(&time.start)
        }
        (OccurrenceSlot::Time(time), OccurrenceSlot::Day(day)) => {
            time.start.cmp(&midnight_utc(day.start))
        }
    }
}

/// Stable sort by [`compare_slots`]; ties keep their input order.
pub fn sort_timeline(slots: &mut [OccurrenceSlot]) {
    slots.sort_by(compare_slots);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(year: i32, month: u32, d: u32, title: &str) -> OccurrenceSlot {
        let date = NaiveDate::from_ymd_opt(year, month, d).unwrap();
        OccurrenceSlot::Day(DaySlot {
            start: date,
            end: date,
            details: SlotDetails {
                title: title.to_string(),
                ..SlotDetails::default()
            },
        })
    }

    fn time(year: i32, month: u32, d: u32, hour: u32, title: &str) -> OccurrenceSlot {
        let start = Utc.with_ymd_and_hms(year, month, d, hour, 0, 0).unwrap();
        OccurrenceSlot::Time(TimeSlot {
            start,
            end: start + chrono::TimeDelta::hours(1),
            details: SlotDetails {
                title: title.to_string(),
                ..SlotDetails::default()
            },
        })
    }

    fn titles(slots: &[OccurrenceSlot]) -> Vec<&str> {
        slots.iter().map(|s| s.details().title.as_str()).collect()
    }

    #[test]
    fn test_day_versus_day() {
        assert_eq!(
            compare_slots(&day(2024, 5, 1, "a"), &day(2024, 5, 2, "b")),
            Ordering::Less
        );
    }

    #[test]
    fn test_time_versus_time() {
        assert_eq!(
            compare_slots(&time(2024, 5, 1, 12, "a"), &time(2024, 5, 1, 9, "b")),
            Ordering::Greater
        );
    }

    #[test]
    fn test_day_versus_time_uses_midnight_utc() {
        let day_slot = day(2024, 5, 1, "day");

        assert_eq!(
            compare_slots(&day_slot, &time(2024, 5, 1, 0, "midnight")),
            Ordering::Equal
        );
        assert_eq!(
            compare_slots(&day_slot, &time(2024, 4, 30, 23, "before")),
            Ordering::Greater
        );
        assert_eq!(
            compare_slots(&time(2024, 5, 1, 8, "after"), &day_slot),
            Ordering::Greater
        );
    }

    #[test]
    fn test_sort_timeline_is_stable_for_ties() {
        let mut slots = vec![
            time(2024, 5, 2, 9, "late"),
            time(2024, 5, 1, 0, "tie-time"),
            day(2024, 5, 1, "tie-day"),
            day(2024, 4, 30, "early"),
        ];

        sort_timeline(&mut slots);

        assert_eq!(titles(&slots), vec!["early", "tie-time", "tie-day", "late"]);
    }

    #[test]
    fn test_instants_for_day_slot() {
        let slot = day(2024, 2, 28, "span");

        assert_eq!(
            slot.start_instant(),
            Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 0).unwrap()
        );
        assert_eq!(
            slot.end_instant(),
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
        );
        assert_eq!(slot.kind(), SlotKind::Day);
    }

    #[test]
    fn test_slot_serializes_with_kind_tag() {
        let json = serde_json::to_value(day(2024, 2, 28, "Standup")).unwrap();

        assert_eq!(json["kind"], "day");
        assert_eq!(json["start"], "2024-02-28");
        assert_eq!(json["title"], "Standup");
    }
}
