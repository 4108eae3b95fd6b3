//! Recurrence rule model.
//!
//! [`RecurrenceRule`] is the validated, tagged form the generators consume.
//! [`RecurrenceFields`] is the flat form requests carry; it converts into a
//! rule through [`TryFrom`], rejecting every combination the model forbids.

use std::num::NonZeroU32;

use chrono::{Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// How often an event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Never,
    Daily,
    Weekly,
    Monthly,
    Annually,
}

impl Frequency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Never => "NEVER",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Annually => "ANNUALLY",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monthly recurrence flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonthlyType {
    /// Same day-of-month, clamped to the month's last day.
    SameDay,
    /// Same ordinal weekday, e.g. "2nd Tuesday".
    SameWeekday,
}

/// Flat duration mode tag as carried by [`RecurrenceFields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DurationModeKind {
    Forever,
    UntilDate,
    NOccurrences,
}

/// Non-empty set of weekdays, iterated Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeeklyDays {
    bits: u8,
}

impl WeeklyDays {
    /// Builds a set from `days`, returning `None` if it would be empty.
    #[must_use]
    pub fn new(days: impl IntoIterator<Item = Weekday>) -> Option<Self> {
        let bits = days
            .into_iter()
            .fold(0u8, |bits, day| bits | Self::bit(day));
        (bits != 0).then_some(Self { bits })
    }

    #[must_use]
    pub fn single(day: Weekday) -> Self {
        Self {
            bits: Self::bit(day),
        }
    }

    const fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }

    #[must_use]
    pub const fn contains(self, day: Weekday) -> bool {
        self.bits & Self::bit(day) != 0
    }

    #[must_use]
    pub const fn len(self) -> u32 {
        self.bits.count_ones()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Weekdays in the set, Monday first.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        let mut day = Weekday::Mon;
        (0..7).filter_map(move |_| {
            let current = day;
            day = day.succ();
            self.contains(current).then_some(current)
        })
    }
}

/// The repeating shape of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    Daily,
    Weekly(WeeklyDays),
    Monthly(MonthlyType),
    Annually,
}

impl Pattern {
    #[must_use]
    pub const fn frequency(self) -> Frequency {
        match self {
            Self::Daily => Frequency::Daily,
            Self::Weekly(_) => Frequency::Weekly,
            Self::Monthly(_) => Frequency::Monthly,
            Self::Annually => Frequency::Annually,
        }
    }
}

/// How a repeating series terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationMode {
    /// Unbounded. Must be replaced via [`RecurrenceRule::bounded`] before generation.
    Forever,
    /// Inclusive last date an occurrence may start on.
    UntilDate(NaiveDate),
    /// Total number of occurrences, the first one included.
    Occurrences(NonZeroU32),
}

impl DurationMode {
    #[must_use]
    pub const fn kind(self) -> DurationModeKind {
        match self {
            Self::Forever => DurationModeKind::Forever,
            Self::UntilDate(_) => DurationModeKind::UntilDate,
            Self::Occurrences(_) => DurationModeKind::NOccurrences,
        }
    }
}

/// A validated recurrence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecurrenceRule {
    /// A single occurrence at the anchor.
    Never,
    Repeating {
        pattern: Pattern,
        /// "Every `step` units".
        step: NonZeroU32,
        duration: DurationMode,
    },
}

impl RecurrenceRule {
    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        match self {
            Self::Never => Frequency::Never,
            Self::Repeating { pattern, .. } => pattern.frequency(),
        }
    }

    #[must_use]
    pub const fn step(&self) -> Option<NonZeroU32> {
        match self {
            Self::Never => None,
            Self::Repeating { step, .. } => Some(*step),
        }
    }

    #[must_use]
    pub const fn duration_mode(&self) -> Option<DurationMode> {
        match self {
            Self::Never => None,
            Self::Repeating { duration, .. } => Some(*duration),
        }
    }

    /// ## Summary
    /// Replaces a `Forever` duration with `UntilDate(anchor + horizon_years)`.
    ///
    /// Other rules are returned unchanged. If the horizon overflows the
    /// calendar the bound saturates at the latest representable date.
    #[must_use]
    pub fn bounded(self, anchor: NaiveDate, horizon_years: u32) -> Self {
        match self {
            Self::Repeating {
                pattern,
                step,
                duration: DurationMode::Forever,
            } => {
                let until = horizon_years
                    .checked_mul(almanac_core::constants::MONTHS_PER_YEAR)
                    .and_then(|months| anchor.checked_add_months(Months::new(months)))
                    .unwrap_or(NaiveDate::MAX);
                Self::Repeating {
                    pattern,
                    step,
                    duration: DurationMode::UntilDate(until),
                }
            }
            other => other,
        }
    }
}

/// Why a [`RecurrenceFields`] value does not describe a valid rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("{0} recurrence requires a step")]
    MissingStep(Frequency),

    #[error("step must be at least 1")]
    ZeroStep,

    #[error("WEEKLY recurrence requires at least one weekday")]
    MissingWeeklyDays,

    #[error("weekly days are only allowed for WEEKLY recurrence, not {0}")]
    UnexpectedWeeklyDays(Frequency),

    #[error("MONTHLY recurrence requires a monthly type")]
    MissingMonthlyType,

    #[error("monthly type is only allowed for MONTHLY recurrence, not {0}")]
    UnexpectedMonthlyType(Frequency),

    #[error("{0} recurrence requires a duration mode")]
    MissingDurationMode(Frequency),

    #[error("NEVER recurrence cannot have a duration mode")]
    UnexpectedDurationMode,

    #[error("NEVER recurrence cannot carry an end date or occurrence count")]
    UnexpectedNeverBound,

    #[error("UNTIL_DATE duration requires an end date")]
    MissingEndDate,

    #[error("N_OCCURRENCES duration requires an occurrence count")]
    MissingOccurrenceCount,

    #[error("occurrence count must be at least 1")]
    ZeroOccurrenceCount,

    #[error("end date and occurrence count are mutually exclusive")]
    ConflictingBounds,

    #[error("{0:?} duration cannot carry an end date or occurrence count")]
    UnexpectedBound(DurationModeKind),
}

/// Flat recurrence description, as carried by event requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceFields {
    pub frequency: Frequency,
    #[serde(default)]
    pub step: Option<u32>,
    #[serde(default)]
    pub weekly_days: Vec<Weekday>,
    #[serde(default)]
    pub monthly_type: Option<MonthlyType>,
    #[serde(default)]
    pub duration_mode: Option<DurationModeKind>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub occurrence_count: Option<u32>,
}

impl RecurrenceFields {
    /// Fields describing a non-repeating event.
    #[must_use]
    pub const fn never() -> Self {
        Self {
            frequency: Frequency::Never,
            step: None,
            weekly_days: Vec::new(),
            monthly_type: None,
            duration_mode: None,
            end_date: None,
            occurrence_count: None,
        }
    }

    fn pattern(&self) -> Result<Pattern, RuleError> {
        let frequency = self.frequency;

        if frequency != Frequency::Weekly && !self.weekly_days.is_empty() {
            return Err(RuleError::UnexpectedWeeklyDays(frequency));
        }
        if frequency != Frequency::Monthly && self.monthly_type.is_some() {
            return Err(RuleError::UnexpectedMonthlyType(frequency));
        }

        match frequency {
            Frequency::Daily => Ok(Pattern::Daily),
            Frequency::Weekly => WeeklyDays::new(self.weekly_days.iter().copied())
                .map(Pattern::Weekly)
                .ok_or(RuleError::MissingWeeklyDays),
            Frequency::Monthly => self
                .monthly_type
                .map(Pattern::Monthly)
                .ok_or(RuleError::MissingMonthlyType),
            Frequency::Annually => Ok(Pattern::Annually),
            Frequency::Never => unreachable!("NEVER has no pattern"),
        }
    }

    fn duration(&self) -> Result<DurationMode, RuleError> {
        let kind = self
            .duration_mode
            .ok_or(RuleError::MissingDurationMode(self.frequency))?;

        match (kind, self.end_date, self.occurrence_count) {
            (_, Some(_), Some(_)) => Err(RuleError::ConflictingBounds),
            (DurationModeKind::Forever, None, None) => Ok(DurationMode::Forever),
            (DurationModeKind::UntilDate, Some(end), None) => Ok(DurationMode::UntilDate(end)),
            (DurationModeKind::UntilDate, None, _) => Err(RuleError::MissingEndDate),
            (DurationModeKind::NOccurrences, None, Some(count)) => NonZeroU32::new(count)
                .map(DurationMode::Occurrences)
                .ok_or(RuleError::ZeroOccurrenceCount),
            (DurationModeKind::NOccurrences, _, None) => Err(RuleError::MissingOccurrenceCount),
            (kind, _, _) => Err(RuleError::UnexpectedBound(kind)),
        }
    }
}

impl TryFrom<&RecurrenceFields> for RecurrenceRule {
    type Error = RuleError;

    fn try_from(fields: &RecurrenceFields) -> Result<Self, Self::Error> {
        if fields.frequency == Frequency::Never {
            if fields.duration_mode.is_some() {
                return Err(RuleError::UnexpectedDurationMode);
            }
            if fields.end_date.is_some() || fields.occurrence_count.is_some() {
                return Err(RuleError::UnexpectedNeverBound);
            }
            if !fields.weekly_days.is_empty() {
                return Err(RuleError::UnexpectedWeeklyDays(Frequency::Never));
            }
            if fields.monthly_type.is_some() {
                return Err(RuleError::UnexpectedMonthlyType(Frequency::Never));
            }
            return Ok(Self::Never);
        }

        let pattern = fields.pattern()?;
        let step = fields
            .step
            .ok_or(RuleError::MissingStep(fields.frequency))
            .and_then(|step| NonZeroU32::new(step).ok_or(RuleError::ZeroStep))?;
        let duration = fields.duration()?;

        Ok(Self::Repeating {
            pattern,
            step,
            duration,
        })
    }
}

impl From<&RecurrenceRule> for RecurrenceFields {
    fn from(rule: &RecurrenceRule) -> Self {
        let RecurrenceRule::Repeating {
            pattern,
            step,
            duration,
        } = *rule
        else {
            return Self::never();
        };

        let (weekly_days, monthly_type) = match pattern {
            Pattern::Weekly(days) => (days.iter().collect(), None),
            Pattern::Monthly(monthly_type) => (Vec::new(), Some(monthly_type)),
            Pattern::Daily | Pattern::Annually => (Vec::new(), None),
        };
        let (end_date, occurrence_count) = match duration {
            DurationMode::Forever => (None, None),
            DurationMode::UntilDate(end) => (Some(end), None),
            DurationMode::Occurrences(count) => (None, Some(count.get())),
        };

        Self {
            frequency: pattern.frequency(),
            step: Some(step.get()),
            weekly_days,
            monthly_type,
            duration_mode: Some(duration.kind()),
            end_date,
            occurrence_count,
        }
    }
}
