//! Upstream checks run before a request reaches the engine.
//!
//! The engine trusts its input. Everything it cannot represent or would
//! treat as a contract violation is rejected here with a
//! `ServiceError::ValidationError`, and the schedule is resolved into the
//! anchor form the generators take.

use almanac_recur::recur::{
    DayAnchor, DurationModeKind, DurationUnit, Frequency, GenerationZone, TimeAnchor,
    TimeZoneResolver,
};
use chrono::{Datelike, FixedOffset};
use chrono_tz::Tz;

use crate::error::{ServiceError, ServiceResult};
use crate::request::{EventRequest, Schedule};

/// A schedule resolved into generator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedAnchor {
    Day(DayAnchor),
    Time {
        anchor: TimeAnchor,
        zone: GenerationZone,
    },
}

fn invalid(message: impl Into<String>) -> ServiceError {
    ServiceError::ValidationError(message.into())
}

fn resolve_zone(resolver: &mut TimeZoneResolver, tzid: &str) -> ServiceResult<Tz> {
    resolver.resolve(tzid).map_err(|err| invalid(err.to_string()))
}

fn preferred_offset(minutes: Option<i32>) -> ServiceResult<Option<FixedOffset>> {
    minutes
        .map(|minutes| {
            minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| invalid(format!("preferred offset of {minutes} minutes is out of range")))
        })
        .transpose()
}

fn resolve_schedule(
    schedule: &Schedule,
    resolver: &mut TimeZoneResolver,
) -> ServiceResult<ResolvedAnchor> {
    match schedule {
        Schedule::Day {
            start_date,
            end_date,
        } => {
            if end_date < start_date {
                return Err(invalid(format!(
                    "end date {end_date} is before start date {start_date}"
                )));
            }
            Ok(ResolvedAnchor::Day(DayAnchor::new(*start_date, *end_date)))
        }
        Schedule::Time {
            start,
            start_zone,
            end,
            end_zone,
            zone,
            preferred_offset_minutes,
        } => {
            let anchor = TimeAnchor {
                start: *start,
                start_zone: resolve_zone(resolver, start_zone)?,
                end: *end,
                end_zone: resolve_zone(resolver, end_zone)?,
            };

            let generation_zone = GenerationZone {
                zone: match zone {
                    Some(tzid) => resolve_zone(resolver, tzid)?,
                    None => anchor.start_zone,
                },
                preferred_offset: preferred_offset(*preferred_offset_minutes)?,
            };

            if anchor.elapsed(&generation_zone, DurationUnit::Seconds) <= 0 {
                return Err(invalid(format!(
                    "end {end} {end_zone} is not after start {start} {start_zone}"
                )));
            }

            Ok(ResolvedAnchor::Time {
                anchor,
                zone: generation_zone,
            })
        }
    }
}

/// ## Summary
/// Validates `request` and resolves its schedule into generator input.
///
/// Checks that the anchor ends after it starts, that step and occurrence
/// count are positive, that an end date is not combined with a count, that
/// a weekly series includes the anchor's weekday, and that every zone is
/// known. Rule shapes the model cannot represent are left to the rule
/// conversion.
///
/// ## Errors
/// Returns `ServiceError::ValidationError` describing the first failed check.
pub fn validate_request(
    request: &EventRequest,
    resolver: &mut TimeZoneResolver,
) -> ServiceResult<ResolvedAnchor> {
    let recurrence = &request.recurrence;

    if recurrence.step == Some(0) {
        return Err(invalid("step must be at least 1"));
    }
    if recurrence.occurrence_count == Some(0) {
        return Err(invalid("occurrence count must be at least 1"));
    }
    if recurrence.duration_mode == Some(DurationModeKind::UntilDate)
        && recurrence.occurrence_count.is_some()
    {
        return Err(invalid("an end date cannot be combined with an occurrence count"));
    }

    let anchor_weekday = request.schedule.start_date().weekday();
    if recurrence.frequency == Frequency::Weekly
        && !recurrence.weekly_days.is_empty()
        && !recurrence.weekly_days.contains(&anchor_weekday)
    {
        return Err(invalid(format!(
            "weekly days must include the first occurrence's weekday ({anchor_weekday})"
        )));
    }

    let resolved = resolve_schedule(&request.schedule, resolver)?;
    tracing::trace!(event_id = %request.event_id, "Request validated");
    Ok(resolved)
}
