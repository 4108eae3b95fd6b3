//! Recurrence materialization engine.
//!
//! Expands a [`RecurrenceRule`] plus an anchor interval into occurrence slots.
//! Two domains are supported:
//! - whole-day events ([`DayAnchor`] → [`DaySlot`])
//! - zoned events ([`TimeAnchor`] → [`TimeSlot`], normalised to UTC)
//!
//! Generation is pure and synchronous. Rules must be bounded before they
//! reach the generators: a `Forever` duration is replaced with an
//! `UntilDate` by the caller (see [`RecurrenceRule::bounded`]).
//!
//! ## Usage
//!
//! ```rust
//! use std::num::NonZeroU32;
//! use chrono::NaiveDate;
//! use almanac_recur::recur::{
//!     DayAnchor, DurationMode, MonthlyType, Pattern, RecurrenceRule, SlotDetails,
//!     generate_day_slots,
//! };
//!
//! let start = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
//! let rule = RecurrenceRule::Repeating {
//!     pattern: Pattern::Monthly(MonthlyType::SameDay),
//!     step: NonZeroU32::MIN,
//!     duration: DurationMode::Occurrences(NonZeroU32::new(2).unwrap()),
//! };
//!
//! let slots = generate_day_slots(&rule, &DayAnchor::new(start, start), &SlotDetails::default());
//! assert_eq!(slots[1].start, NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
//! ```

mod cadence;
mod calendar;
mod day;
mod export;
mod rule;
mod slot;
mod summary;
mod time;
mod timezone;


pub use calendar::{
    YearMonth, adjust_for_month_length, days_in_month, find_occurrence_index,
    is_last_occurrence_in_month, nth_weekday_of_month, shift_to_weekday,
};
pub use day::{DayAnchor, generate_day_slots};
pub use export::{to_rrule_set, to_rrule_text};
pub use rule::{
    DurationMode, DurationModeKind, Frequency, MonthlyType, Pattern, RecurrenceFields,
    RecurrenceRule, RuleError, WeeklyDays,
};
pub use slot::{DaySlot, OccurrenceSlot, SlotDetails, TimeSlot, compare_slots, sort_timeline};
pub use summary::describe;
pub use time::{GenerationZone, TimeAnchor, generate_time_slots};
pub use timezone::{
    ConversionError, DurationUnit, TimeZoneResolver, convert_to_utc, to_utc, zone_aware_duration,
};
