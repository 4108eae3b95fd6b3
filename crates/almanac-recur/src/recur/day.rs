//! Whole-day occurrence generation.

use chrono::{NaiveDate, TimeDelta};

use super::cadence::occurrence_dates;
use super::rule::RecurrenceRule;
use super::slot::{DaySlot, SlotDetails};

/// First occurrence of a whole-day event. Both dates are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DayAnchor {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DayAnchor {
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Days from the first day to the last; zero for a single-day event.
    #[must_use]
    pub fn span_days(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_days()
    }
}

/// ## Summary
/// Materializes the whole-day occurrences of `rule` starting at `anchor`.
///
/// Every slot spans as many days as the anchor does. Slots are in
/// chronological order. Occurrences whose span would end past
/// `NaiveDate::MAX` are dropped rather than shortened.
///
/// ## Panics
/// Panics if the rule still carries a `Forever` duration; bound it with
/// [`RecurrenceRule::bounded`] first.
#[must_use]
pub fn generate_day_slots(
    rule: &RecurrenceRule,
    anchor: &DayAnchor,
    details: &SlotDetails,
) -> Vec<DaySlot> {
    let span = TimeDelta::days(anchor.span_days());

    let dates = occurrence_dates(rule, anchor.start);
    let scheduled = dates.len();

    // Dates are ascending, so once a span overflows every later one does too.
    let slots: Vec<DaySlot> = dates
        .into_iter()
        .map_while(|start| {
            Some(DaySlot {
                start,
                end: start.checked_add_signed(span)?,
                details: details.clone(),
            })
        })
        .collect();

    if slots.len() < scheduled {
        tracing::warn!(
            dropped = scheduled - slots.len(),
            span_days = anchor.span_days(),
            "Dropped day slots whose span runs past the last representable date"
        );
    }

    tracing::debug!(
        frequency = %rule.frequency(),
        step = rule.step().map(std::num::NonZeroU32::get),
        anchor = %anchor.start,
        span_days = anchor.span_days(),
        count = slots.len(),
        "Generated day slots"
    );

    slots
}
