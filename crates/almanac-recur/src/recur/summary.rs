//! Human-readable recurrence summaries for notification text.

use almanac_core::constants::MAX_WEEKDAY_INDEX;
use chrono::{Datelike, NaiveDate, Weekday};

use super::calendar::find_occurrence_index;
use super::rule::{DurationMode, MonthlyType, Pattern, RecurrenceRule};

const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

const fn ordinal_name(index: u32) -> &'static str {
    match index {
        1 => "first",
        2 => "second",
        3 => "third",
        4 => "fourth",
        _ => "last",
    }
}

/// "A", "A and B", "A, B and C".
fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

/// "Daily" for a step of one, "Every 3 days" otherwise.
fn cadence(step: u32, single: &str, unit: &str) -> String {
    if step == 1 {
        single.to_string()
    } else {
        format!("Every {step} {unit}")
    }
}

/// ## Summary
/// Describes `rule`, anchored at `anchor`, in a short English sentence.
///
/// ```rust
/// use std::num::NonZeroU32;
/// use chrono::NaiveDate;
/// use almanac_recur::recur::{describe, DurationMode, MonthlyType, Pattern, RecurrenceRule};
///
/// let rule = RecurrenceRule::Repeating {
///     pattern: Pattern::Monthly(MonthlyType::SameWeekday),
///     step: NonZeroU32::MIN,
///     duration: DurationMode::Forever,
/// };
/// let anchor = NaiveDate::from_ymd_opt(2024, 8, 13).unwrap();
/// assert_eq!(describe(&rule, anchor), "Monthly on the second Tuesday");
/// ```
#[must_use]
pub fn describe(rule: &RecurrenceRule, anchor: NaiveDate) -> String {
    let RecurrenceRule::Repeating {
        pattern,
        step,
        duration,
    } = *rule
    else {
        return "Does not repeat".to_string();
    };
    let step = step.get();

    let mut text = match pattern {
        Pattern::Daily => cadence(step, "Daily", "days"),
        Pattern::Weekly(days) => {
            let names: Vec<&str> = days.iter().map(weekday_name).collect();
            format!("{} on {}", cadence(step, "Weekly", "weeks"), join_names(&names))
        }
        Pattern::Monthly(MonthlyType::SameDay) => {
            format!("{} on day {}", cadence(step, "Monthly", "months"), anchor.day())
        }
        Pattern::Monthly(MonthlyType::SameWeekday) => {
            let index = find_occurrence_index(anchor).min(MAX_WEEKDAY_INDEX);
            format!(
                "{} on the {} {}",
                cadence(step, "Monthly", "months"),
                ordinal_name(index),
                weekday_name(anchor.weekday())
            )
        }
        Pattern::Annually => format!(
            "{} on {}",
            cadence(step, "Annually", "years"),
            anchor.format("%B %-d")
        ),
    };

    match duration {
        DurationMode::Forever => {}
        DurationMode::UntilDate(until) => text.push_str(&format!(", until {until}")),
        DurationMode::Occurrences(count) if count.get() == 1 => text.push_str(", once"),
        DurationMode::Occurrences(count) => text.push_str(&format!(", {count} times")),
    }

    text
}
