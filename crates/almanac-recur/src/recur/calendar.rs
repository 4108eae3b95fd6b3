//! Calendar arithmetic shared by the day and time generators.
//!
//! Every function here is total over well-formed input. Out-of-range
//! arguments (weekday index 0, day-of-month 0) are caller contract
//! violations and panic.

use almanac_core::constants::{DAYS_PER_WEEK, MAX_WEEKDAY_INDEX};
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

/// A calendar month, anchored on its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    /// Creates a month from a year and a 1-based month number.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// The month containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date - Days::new(u64::from(date.day0())),
        }
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.first.year()
    }

    #[must_use]
    pub fn month(self) -> u32 {
        self.first.month()
    }

    #[must_use]
    pub const fn first_day(self) -> NaiveDate {
        self.first
    }

    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.first + Days::new(u64::from(self.len_days() - 1))
    }

    /// Number of days in this month, accounting for leap years.
    #[must_use]
    pub fn len_days(self) -> u32 {
        let year = self.year();
        match self.month() {
            2 if is_leap_year(year) => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// Advances by `months`, returning `None` past the representable calendar.
    #[must_use]
    pub fn checked_add_months(self, months: u32) -> Option<Self> {
        self.first
            .checked_add_months(Months::new(months))
            .map(|first| Self { first })
    }

    /// Returns the date with the given day-of-month, if it exists.
    #[must_use]
    pub fn day(self, day: u32) -> Option<NaiveDate> {
        if day == 0 || day > self.len_days() {
            return None;
        }
        Some(self.first + Days::new(u64::from(day - 1)))
    }
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in the month containing `date`.
#[must_use]
pub fn days_in_month(date: NaiveDate) -> u32 {
    YearMonth::of(date).len_days()
}

/// ## Summary
/// Returns which occurrence (1st..5th) of its weekday `date` is within its month.
///
/// Counting starts at day 1, so days 1-7 are always index 1.
#[must_use]
pub fn find_occurrence_index(date: NaiveDate) -> u32 {
    date.day0() / DAYS_PER_WEEK + 1
}

/// ## Summary
/// Returns the date of the `index`-th `weekday` in `month`.
///
/// When the month has fewer than `index` occurrences of `weekday`, the last
/// one is returned instead. A month is never skipped.
///
/// ## Panics
/// Panics if `index` is outside `1..=5`.
#[must_use]
pub fn nth_weekday_of_month(month: YearMonth, weekday: Weekday, index: u32) -> NaiveDate {
    assert!(
        (1..=MAX_WEEKDAY_INDEX).contains(&index),
        "weekday index must be within 1..=5, got {index}"
    );

    let first = month.first_day();
    let lead = (DAYS_PER_WEEK + weekday.num_days_from_monday()
        - first.weekday().num_days_from_monday())
        % DAYS_PER_WEEK;

    let mut day = 1 + lead + DAYS_PER_WEEK * (index - 1);
    while day > month.len_days() {
        day -= DAYS_PER_WEEK;
    }

    first + Days::new(u64::from(day - 1))
}

/// ## Summary
/// Returns `true` if the `index`-th occurrence of `date`'s weekday is the
/// last one in `date`'s month.
///
/// ## Panics
/// Panics if `index` is outside `1..=5`.
#[must_use]
pub fn is_last_occurrence_in_month(date: NaiveDate, index: u32) -> bool {
    let month = YearMonth::of(date);
    let nth = nth_weekday_of_month(month, date.weekday(), index);
    nth.day() + DAYS_PER_WEEK > month.len_days()
}

/// ## Summary
/// Moves `candidate` to `desired_day` within its own month, clamping to the
/// month's last day when the month is too short.
///
/// `adjust_for_month_length(31, 2024-02-10)` is `2024-02-29`.
///
/// ## Panics
/// Panics if `desired_day` is zero.
#[must_use]
pub fn adjust_for_month_length(desired_day: u32, candidate: NaiveDate) -> NaiveDate {
    assert!(desired_day >= 1, "day-of-month must be positive");

    let month = YearMonth::of(candidate);
    let day = desired_day.min(month.len_days());
    month.first_day() + Days::new(u64::from(day - 1))
}

/// ## Summary
/// Shifts `anchor` to `target` within the Monday-based week containing it.
///
/// A target earlier in the week moves backwards; a later (or equal) one moves
/// forwards.
#[must_use]
pub fn shift_to_weekday(anchor: NaiveDate, target: Weekday) -> NaiveDate {
    let shift = i64::from(anchor.weekday().num_days_from_monday())
        - i64::from(target.num_days_from_monday());
    let days = Days::new(shift.unsigned_abs());

    if shift > 0 { anchor - days } else { anchor + days }
}
