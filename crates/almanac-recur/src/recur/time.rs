//! Zoned occurrence generation.
//!
//! Walks the same cadence as the day generator over the anchor's local date,
//! then pins each occurrence to the generation zone and normalises it to UTC.
//! The duration is measured once from the anchor (zone-aware, in minutes, with
//! the same overlap preference as the occurrences) and
//! re-applied to every occurrence, so a 90-minute meeting stays 90 minutes
//! even when consecutive occurrences sit on different sides of a DST change.

use chrono::{FixedOffset, NaiveDateTime, TimeDelta};
use chrono_tz::Tz;

use super::cadence::occurrence_dates;
use super::rule::RecurrenceRule;
use super::slot::{SlotDetails, TimeSlot};
use super::timezone::{DurationUnit, to_utc};

/// First occurrence of a zoned event. Start and end carry independent zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeAnchor {
    pub start: NaiveDateTime,
    pub start_zone: Tz,
    pub end: NaiveDateTime,
    pub end_zone: Tz,
}

impl TimeAnchor {
    /// Anchor whose start and end share one zone.
    #[must_use]
    pub const fn in_zone(start: NaiveDateTime, end: NaiveDateTime, zone: Tz) -> Self {
        Self {
            start,
            start_zone: zone,
            end,
            end_zone: zone,
        }
    }

    /// ## Summary
    /// Elapsed time from start to end in `unit`, measured in UTC.
    ///
    /// A side whose zone is the generation zone honours its preferred overlap
    /// offset, so the anchor resolves the same way its occurrences do.
    #[must_use]
    pub fn elapsed(&self, zone: &GenerationZone, unit: DurationUnit) -> i64 {
        let start = to_utc(self.start, self.start_zone, zone.preference_for(self.start_zone));
        let end = to_utc(self.end, self.end_zone, zone.preference_for(self.end_zone));
        unit.count(end.signed_duration_since(start))
    }

    #[must_use]
    pub fn duration_minutes(&self, zone: &GenerationZone) -> i64 {
        self.elapsed(zone, DurationUnit::Minutes)
    }
}

/// Zone the generated local start times are interpreted in.
///
/// Usually the anchor's start zone, but a request may re-specify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationZone {
    pub zone: Tz,
    /// Offset to choose when a local time falls in a DST overlap.
    pub preferred_offset: Option<FixedOffset>,
}

impl GenerationZone {
    fn preference_for(&self, zone: Tz) -> Option<FixedOffset> {
        if zone == self.zone {
            self.preferred_offset
        } else {
            None
        }
    }
}

impl From<Tz> for GenerationZone {
    fn from(zone: Tz) -> Self {
        Self {
            zone,
            preferred_offset: None,
        }
    }
}

/// ## Summary
/// Materializes the zoned occurrences of `rule` starting at `anchor`.
///
/// Each occurrence starts at the anchor's wall-clock time on its cadence date
/// in `zone`, converted with the DST policy of [`to_utc`]. Slots are in
/// chronological order.
///
/// ## Panics
/// Panics if the rule still carries a `Forever` duration; bound it with
/// [`RecurrenceRule::bounded`] first.
#[must_use]
pub fn generate_time_slots(
    rule: &RecurrenceRule,
    anchor: &TimeAnchor,
    zone: &GenerationZone,
    details: &SlotDetails,
) -> Vec<TimeSlot> {
    let minutes = anchor.duration_minutes(zone);
    let duration = TimeDelta::minutes(minutes);
    let wall_clock = anchor.start.time();

    let slots: Vec<TimeSlot> = occurrence_dates(rule, anchor.start.date())
        .into_iter()
        .map(|date| {
            let start = to_utc(date.and_time(wall_clock), zone.zone, zone.preferred_offset);
            TimeSlot {
                start,
                end: start + duration,
                details: details.clone(),
            }
        })
        .collect();

    tracing::debug!(
        frequency = %rule.frequency(),
        step = rule.step().map(std::num::NonZeroU32::get),
        anchor = %anchor.start,
        zone = %zone.zone,
        duration_minutes = minutes,
        count = slots.len(),
        "Generated time slots"
    );

    slots
}
