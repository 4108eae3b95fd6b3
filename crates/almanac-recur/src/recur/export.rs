//! RFC 5545 `RRULE` export.
//!
//! Renders a [`RecurrenceRule`] as an iCalendar recurrence rule that expands
//! to exactly the same dates as the generators:
//! - same-day monthly rules on the 29th-31st use `BYMONTHDAY` with
//!   `BYSETPOS=-1` so short months clamp instead of being skipped
//! - a fifth-weekday monthly rule becomes the last weekday (`BYDAY=-1FR`)
//! - a February 29 annual rule falls back to February 28 in common years

use almanac_core::constants::MAX_WEEKDAY_INDEX;
use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use rrule::{RRule, RRuleSet, Tz, Unvalidated};

use super::calendar::find_occurrence_index;
use super::rule::{DurationMode, MonthlyType, Pattern, RecurrenceRule};
use crate::error::{RecurError, RecurResult};

/// Last day every month has.
const SHORTEST_MONTH_DAYS: u32 = 28;

const fn ical_weekday(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// `BYMONTHDAY` clause selecting `day`, or the month's last day when shorter.
fn clamped_month_day(day: u32) -> String {
    if day <= SHORTEST_MONTH_DAYS {
        return format!(";BYMONTHDAY={day}");
    }
    let days: Vec<String> = (SHORTEST_MONTH_DAYS..=day).map(|d| d.to_string()).collect();
    format!(";BYMONTHDAY={};BYSETPOS=-1", days.join(","))
}

/// ## Summary
/// Renders `rule` as an `RRULE` value (without the `RRULE:` prefix).
///
/// Returns `None` for non-repeating rules. `UNTIL` is emitted as the end of
/// the until date in UTC.
#[must_use]
pub fn to_rrule_text(rule: &RecurrenceRule, anchor: NaiveDate) -> Option<String> {
    let RecurrenceRule::Repeating {
        pattern,
        step,
        duration,
    } = *rule
    else {
        return None;
    };

    let mut text = match pattern {
        Pattern::Daily => "FREQ=DAILY".to_string(),
        Pattern::Weekly(days) => {
            let by_day: Vec<&str> = days.iter().map(ical_weekday).collect();
            format!("FREQ=WEEKLY;BYDAY={}", by_day.join(","))
        }
        Pattern::Monthly(MonthlyType::SameDay) => {
            format!("FREQ=MONTHLY{}", clamped_month_day(anchor.day()))
        }
        Pattern::Monthly(MonthlyType::SameWeekday) => {
            let index = find_occurrence_index(anchor);
            let ordinal = if index == MAX_WEEKDAY_INDEX {
                "-1".to_string()
            } else {
                index.to_string()
            };
            format!("FREQ=MONTHLY;BYDAY={ordinal}{}", ical_weekday(anchor.weekday()))
        }
        Pattern::Annually => format!(
            "FREQ=YEARLY;BYMONTH={}{}",
            anchor.month(),
            clamped_month_day(anchor.day())
        ),
    };

    text.push_str(&format!(";INTERVAL={step}"));
    match duration {
        DurationMode::Forever => {}
        DurationMode::UntilDate(until) => {
            text.push_str(&format!(";UNTIL={}T235959Z", until.format("%Y%m%d")));
        }
        DurationMode::Occurrences(count) => text.push_str(&format!(";COUNT={count}")),
    }

    Some(text)
}

/// ## Summary
/// Builds an `rrule::RRuleSet` for `rule` starting at `dtstart`.
///
/// Returns `Ok(None)` for non-repeating rules.
///
/// ## Errors
/// Returns `RecurError::RRuleError` if the `rrule` crate rejects the rendered
/// rule or the start date.
pub fn to_rrule_set(
    rule: &RecurrenceRule,
    dtstart: DateTime<Utc>,
) -> RecurResult<Option<RRuleSet>> {
    let Some(text) = to_rrule_text(rule, dtstart.date_naive()) else {
        return Ok(None);
    };

    let rrule = text
        .parse::<RRule<Unvalidated>>()
        .map_err(|err| RecurError::RRuleError(err.to_string()))?;
    let set = rrule
        .build(dtstart.with_timezone(&Tz::UTC))
        .map_err(|err| RecurError::RRuleError(err.to_string()))?;

    tracing::trace!(rrule = %text, "Built RRULE set");
    Ok(Some(set))
}
