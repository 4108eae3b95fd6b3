//! Event requests as callers submit them.

use almanac_recur::recur::{OccurrenceSlot, RecurrenceFields, SlotDetails};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ServiceResult;

/// A recurring event to materialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRequest {
    pub event_id: Uuid,
    /// Copied verbatim onto every slot.
    #[serde(flatten)]
    pub details: SlotDetails,
    pub schedule: Schedule,
    #[serde(default = "RecurrenceFields::never")]
    pub recurrence: RecurrenceFields,
}

impl EventRequest {
    /// ## Summary
    /// Parses a request from its JSON form.
    ///
    /// ## Errors
    /// Returns `ServiceError::ParseError` if the document does not describe a request.
    pub fn from_json(source: &str) -> ServiceResult<Self> {
        Ok(serde_json::from_str(source)?)
    }
}

/// The first occurrence of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    /// Whole days, both dates inclusive.
    Day {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    /// Local wall-clock times, each in its own zone.
    Time {
        start: NaiveDateTime,
        start_zone: String,
        end: NaiveDateTime,
        end_zone: String,
        /// Zone the series is generated in; defaults to `start_zone`.
        #[serde(default)]
        zone: Option<String>,
        /// UTC offset in minutes to prefer when a local time is ambiguous.
        #[serde(default)]
        preferred_offset_minutes: Option<i32>,
    },
}

impl Schedule {
    /// Local date of the first occurrence.
    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        match self {
            Self::Day { start_date, .. } => *start_date,
            Self::Time { start, .. } => start.date(),
        }
    }
}

/// The materialized form of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedEvent {
    pub event_id: Uuid,
    /// Human-readable recurrence, e.g. "Every 2 weeks on Monday".
    pub summary: String,
    /// Equivalent RFC 5545 rule, absent for one-off events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rrule: Option<String>,
    pub slots: Vec<OccurrenceSlot>,
}
