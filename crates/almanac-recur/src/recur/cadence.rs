//! Occurrence date unfolding shared by the day and time generators.
//!
//! Produces the start dates of every occurrence of a rule, in chronological
//! order. The day generator uses them directly; the time generator pairs each
//! one with the anchor's wall-clock time.

use almanac_core::constants::{DAYS_PER_WEEK, MONTHS_PER_YEAR};
use chrono::{Datelike, Days, Months, NaiveDate};

use super::calendar::{
    YearMonth, adjust_for_month_length, find_occurrence_index, nth_weekday_of_month,
    shift_to_weekday,
};
use super::rule::{DurationMode, MonthlyType, Pattern, RecurrenceRule, WeeklyDays};

/// Termination state for one unfold.
struct Bound {
    until: Option<NaiveDate>,
    remaining: Option<u32>,
}

impl Bound {
    /// ## Panics
    /// Panics on `Forever`, which callers must bound first.
    fn new(duration: DurationMode) -> Self {
        match duration {
            DurationMode::UntilDate(until) => Self {
                until: Some(until),
                remaining: None,
            },
            DurationMode::Occurrences(count) => Self {
                until: None,
                remaining: Some(count.get()),
            },
            DurationMode::Forever => {
                panic!("FOREVER recurrence must be bounded with RecurrenceRule::bounded before generation")
            }
        }
    }

    fn exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    fn within_until(&self, date: NaiveDate) -> bool {
        self.until.is_none_or(|until| date <= until)
    }

    fn admits(&self, date: NaiveDate) -> bool {
        !self.exhausted() && self.within_until(date)
    }

    fn accept(&mut self, date: NaiveDate, out: &mut Vec<NaiveDate>) {
        out.push(date);
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
    }
}

/// ## Summary
/// Returns the start date of every occurrence of `rule` anchored at `anchor`.
///
/// `Never` yields the anchor alone. An `UntilDate` earlier than the anchor
/// yields nothing.
///
/// ## Panics
/// Panics if the rule still carries a `Forever` duration.
pub(crate) fn occurrence_dates(rule: &RecurrenceRule, anchor: NaiveDate) -> Vec<NaiveDate> {
    let RecurrenceRule::Repeating {
        pattern,
        step,
        duration,
    } = *rule
    else {
        return vec![anchor];
    };

    let mut bound = Bound::new(duration);
    let mut out = Vec::new();
    let step = step.get();

    match pattern {
        Pattern::Daily => daily(anchor, step, &mut bound, &mut out),
        Pattern::Weekly(days) => weekly(anchor, step, days, &mut bound, &mut out),
        Pattern::Monthly(MonthlyType::SameWeekday) => {
            monthly_same_weekday(anchor, step, &mut bound, &mut out);
        }
        Pattern::Monthly(MonthlyType::SameDay) => {
            same_day_of_month(anchor, step, &mut bound, &mut out);
        }
        Pattern::Annually => {
            if let Some(months) = step.checked_mul(MONTHS_PER_YEAR) {
                same_day_of_month(anchor, months, &mut bound, &mut out);
            } else if bound.admits(anchor) {
                bound.accept(anchor, &mut out);
            }
        }
    }

    out
}

fn daily(anchor: NaiveDate, step: u32, bound: &mut Bound, out: &mut Vec<NaiveDate>) {
    let mut current = Some(anchor);
    while let Some(date) = current.filter(|date| bound.admits(*date)) {
        bound.accept(date, out);
        current = date.checked_add_days(Days::new(u64::from(step)));
    }
}

/// Walks week windows `step` weeks apart. Each window emits every selected
/// weekday of its Monday-based week, skipping days before the anchor, in
/// chronological order.
fn weekly(
    anchor: NaiveDate,
    step: u32,
    days: WeeklyDays,
    bound: &mut Bound,
    out: &mut Vec<NaiveDate>,
) {
    let stride = Days::new(u64::from(step) * u64::from(DAYS_PER_WEEK));
    let mut window = Some(anchor);

    while let Some(window_anchor) = window {
        let week_start = shift_to_weekday(window_anchor, chrono::Weekday::Mon);
        if bound.exhausted() || !bound.within_until(week_start) {
            return;
        }

        // WeeklyDays iterates Monday first, so candidates are already sorted.
        for candidate in days
            .iter()
            .map(|day| shift_to_weekday(window_anchor, day))
            .filter(|candidate| *candidate >= anchor)
        {
            if !bound.admits(candidate) {
                return;
            }
            bound.accept(candidate, out);
        }

        window = window_anchor.checked_add_days(stride);
    }
}

fn monthly_same_weekday(anchor: NaiveDate, step: u32, bound: &mut Bound, out: &mut Vec<NaiveDate>) {
    let index = find_occurrence_index(anchor);
    let weekday = anchor.weekday();
    let first_month = YearMonth::of(anchor);

    for offset in (0u32..).step_by(step as usize) {
        let Some(month) = first_month.checked_add_months(offset) else {
            return;
        };
        let date = nth_weekday_of_month(month, weekday, index);
        if !bound.admits(date) {
            return;
        }
        bound.accept(date, out);
    }
}

/// Same day-of-month every `months` months. The logical cadence is always
/// measured from the anchor, so a clamp in a short month never carries over.
fn same_day_of_month(anchor: NaiveDate, months: u32, bound: &mut Bound, out: &mut Vec<NaiveDate>) {
    let day_of_month = anchor.day();

    for offset in (0u32..).step_by(months as usize) {
        let Some(current) = anchor.checked_add_months(Months::new(offset)) else {
            return;
        };
        let date = adjust_for_month_length(day_of_month, current);
        if !bound.admits(date) {
            return;
        }
        bound.accept(date, out);
    }
}
