//! Request to slots: validation, rule conversion, FOREVER bounding, the
//! occurrence guard and generation.

use almanac_core::config::RecurrenceConfig;
use almanac_recur::recur::{
    DurationMode, OccurrenceSlot, Pattern, RecurrenceRule, TimeZoneResolver, YearMonth, describe,
    generate_day_slots, generate_time_slots, to_rrule_text,
};
use chrono::NaiveDate;

use crate::error::{ServiceError, ServiceResult};
use crate::request::{EventRequest, MaterializedEvent};
use crate::validation::{ResolvedAnchor, validate_request};

/// ## Summary
/// Upper bound on the number of slots `rule` produces from `anchor`.
///
/// Exact for counted series. For date-bounded series it counts cadence
/// periods that start on or before the bound, which may overshoot by the
/// days of a final partial week. A rule still carrying `Forever` is
/// unbounded and estimates as `u64::MAX`.
#[must_use]
pub fn estimate_occurrences(rule: &RecurrenceRule, anchor: NaiveDate) -> u64 {
    let RecurrenceRule::Repeating {
        pattern,
        step,
        duration,
    } = *rule
    else {
        return 1;
    };

    let until = match duration {
        DurationMode::Forever => return u64::MAX,
        DurationMode::Occurrences(count) => return u64::from(count.get()),
        DurationMode::UntilDate(until) if until < anchor => return 0,
        DurationMode::UntilDate(until) => until,
    };

    let step = u64::from(step.get());
    let periods = |span: u64| span / step + 1;

    match pattern {
        Pattern::Daily => periods(until.signed_duration_since(anchor).num_days().unsigned_abs()),
        Pattern::Weekly(days) => {
            let weeks = until.signed_duration_since(anchor).num_weeks().unsigned_abs();
            periods(weeks).saturating_mul(u64::from(days.len()))
        }
        Pattern::Monthly(_) => periods(months_between(anchor, until)),
        Pattern::Annually => periods(months_between(anchor, until) / 12),
    }
}

/// Whole calendar months from `from`'s month to `to`'s month.
fn months_between(from: NaiveDate, to: NaiveDate) -> u64 {
    let from = YearMonth::of(from);
    let to = YearMonth::of(to);
    let months = (i64::from(to.year()) - i64::from(from.year())) * 12 + i64::from(to.month())
        - i64::from(from.month());
    months.unsigned_abs()
}

/// Turns event requests into materialized slots.
#[derive(Debug)]
pub struct Materializer {
    config: RecurrenceConfig,
    resolver: TimeZoneResolver,
}

impl Materializer {
    /// ## Summary
    /// Creates a materializer enforcing `config`'s limits.
    ///
    /// ## Errors
    /// Returns `ServiceError::CoreError` if the limits are unusable.
    pub fn new(config: RecurrenceConfig) -> ServiceResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            resolver: TimeZoneResolver::new(),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &RecurrenceConfig {
        &self.config
    }

    /// ## Summary
    /// Materializes every occurrence of `request`.
    ///
    /// FOREVER series are bounded at the configured horizon past the anchor.
    /// The summary and RRULE describe the rule as requested, before bounding.
    ///
    /// ## Errors
    /// - `ServiceError::ValidationError` if the request fails validation
    /// - `ServiceError::RuleError` if the recurrence fields do not form a rule
    /// - `ServiceError::TooManyOccurrences` if the series may exceed the limit
    pub fn materialize(&mut self, request: &EventRequest) -> ServiceResult<MaterializedEvent> {
        let resolved = validate_request(request, &mut self.resolver)?;
        let requested = RecurrenceRule::try_from(&request.recurrence)?;

        let anchor_date = request.schedule.start_date();
        let rule = requested.bounded(anchor_date, self.config.forever_horizon_years);

        let estimated = estimate_occurrences(&rule, anchor_date);
        if estimated > self.config.max_occurrences {
            tracing::warn!(
                event_id = %request.event_id,
                estimated,
                limit = self.config.max_occurrences,
                "Rejected request exceeding occurrence limit"
            );
            return Err(ServiceError::TooManyOccurrences {
                estimated,
                limit: self.config.max_occurrences,
            });
        }

        let slots: Vec<OccurrenceSlot> = match resolved {
            ResolvedAnchor::Day(anchor) => generate_day_slots(&rule, &anchor, &request.details)
                .into_iter()
                .map(OccurrenceSlot::from)
                .collect(),
            ResolvedAnchor::Time { anchor, zone } => {
                generate_time_slots(&rule, &anchor, &zone, &request.details)
                    .into_iter()
                    .map(OccurrenceSlot::from)
                    .collect()
            }
        };

        tracing::debug!(
            event_id = %request.event_id,
            frequency = %rule.frequency(),
            estimated,
            count = slots.len(),
            "Materialized event"
        );

        Ok(MaterializedEvent {
            event_id: request.event_id,
            summary: describe(&requested, anchor_date),
            rrule: to_rrule_text(&requested, anchor_date),
            slots,
        })
    }
}
