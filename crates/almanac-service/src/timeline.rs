//! Range queries over materialized slots.

use almanac_recur::recur::{OccurrenceSlot, sort_timeline};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

/// Half-open UTC range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// ## Errors
    /// Returns `ServiceError::ValidationError` if `end` is not after `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> ServiceResult<Self> {
        if end <= start {
            return Err(ServiceError::ValidationError(format!(
                "range end {end} is not after start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// ## Summary
    /// Returns `true` if `slot` shares any instant with this range.
    ///
    /// Day slots cover their dates from midnight UTC. A zero-length slot
    /// overlaps when its start lies inside the range.
    #[must_use]
    pub fn overlaps(&self, slot: &OccurrenceSlot) -> bool {
        let start = slot.start_instant();
        let end = slot.end_instant();
        if start == end {
            return self.contains(start);
        }
        start < self.end && end > self.start
    }
}

/// ## Summary
/// Merges slots from several events into one timeline.
///
/// The result is ordered by the slot comparator. Slots that tie keep the
/// order of their sources, then their order within a source.
#[must_use]
pub fn merge_timeline<I>(sources: I) -> Vec<OccurrenceSlot>
where
    I: IntoIterator,
    I::Item: IntoIterator<Item = OccurrenceSlot>,
{
    let mut merged: Vec<OccurrenceSlot> = sources.into_iter().flatten().collect();
    sort_timeline(&mut merged);
    merged
}
