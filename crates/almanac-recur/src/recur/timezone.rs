//! Zone lookup, local-to-UTC conversion and elapsed time across zones.
//!
//! Zone names arrive from clients in several spellings. [`TimeZoneResolver`]
//! maps all of them onto the IANA database that `chrono-tz` ships, using ICU4X
//! tables for the Windows names and for retired IANA aliases.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;

/// A zone name that maps to nothing in the IANA database.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Vendor prefixes some calendar clients put in front of IANA names.
const VENDOR_PREFIXES: [&str; 2] = ["/mozilla.org/", "/softwarestudio.org/"];

/// Caching zone-name lookup.
///
/// Entries are keyed by the name as supplied, so repeated requests in the
/// same spelling skip normalisation entirely.
#[derive(Debug, Default)]
pub struct TimeZoneResolver {
    cache: HashMap<String, Tz>,
}

impl TimeZoneResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Looks up the zone named `tzid`.
    ///
    /// Accepts IANA names and aliases (`US/Eastern`), Windows names
    /// (`W. Europe Standard Time`) and vendor-prefixed IANA names.
    ///
    /// ## Errors
    /// Returns `ConversionError::UnknownTimezone` carrying `tzid` as given.
    pub fn resolve(&mut self, tzid: &str) -> Result<Tz, ConversionError> {
        if let Some(zone) = self.cache.get(tzid) {
            return Ok(*zone);
        }

        let zone = Tz::from_str(&normalize_tzid(tzid))
            .map_err(|_e| ConversionError::UnknownTimezone(tzid.to_string()))?;

        tracing::trace!(tzid, resolved = %zone, "Resolved timezone");
        self.cache.insert(tzid.to_string(), zone);
        Ok(zone)
    }
}

fn strip_vendor_prefix(tzid: &str) -> &str {
    VENDOR_PREFIXES
        .iter()
        .find_map(|prefix| tzid.strip_prefix(prefix))
        .unwrap_or(tzid)
}

/// Canonical IANA name for `tzid`, or the prefix-stripped input when neither
/// the Windows table nor the IANA alias table knows it.
fn normalize_tzid(tzid: &str) -> String {
    let name = strip_vendor_prefix(tzid);
    let iana = IanaParserExtended::new();

    let from_windows = WindowsParser::new()
        .parse(name, None)
        .and_then(|zone| iana.iter().find(|entry| entry.time_zone == zone));
    if let Some(entry) = from_windows {
        return entry.canonical.to_string();
    }

    let parsed = iana.parse(name);
    if parsed.time_zone == icu::time::TimeZone::UNKNOWN {
        name.to_string()
    } else {
        parsed.canonical.to_string()
    }
}

/// ## Summary
/// Converts a local wall-clock time in `zone` to a UTC instant.
///
/// - DST gap (the local time does not exist): the wall-clock time is moved
///   forward by the length of the gap, i.e. the pre-transition offset is
///   applied. `02:30` on a spring-forward day in New York becomes `03:30-04:00`.
/// - DST overlap (the local time exists twice): the earlier instant, which
///   carries the pre-transition offset, is chosen unless `preferred` matches
///   the offset of the later one.
#[must_use]
pub fn to_utc(local: NaiveDateTime, zone: Tz, preferred: Option<FixedOffset>) -> DateTime<Utc> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(first, second) => {
            let (earlier, later) = if first <= second {
                (first, second)
            } else {
                (second, first)
            };

            if preferred.is_some_and(|offset| later.offset().fix() == offset) {
                later.with_timezone(&Utc)
            } else {
                earlier.with_timezone(&Utc)
            }
        }
        LocalResult::None => {
            let before = offset_before_gap(local, zone);
            tracing::trace!(%local, %zone, offset = %before, "Local time falls in a DST gap");
            (local - TimeDelta::seconds(i64::from(before.local_minus_utc()))).and_utc()
        }
    }
}

/// The offset in force a day before `local`, which for a gap is the
/// offset the transition moves away from.
fn offset_before_gap(local: NaiveDateTime, zone: Tz) -> FixedOffset {
    let probe = local - TimeDelta::days(1);
    zone.offset_from_local_datetime(&probe)
        .earliest()
        .map_or_else(|| zone.offset_from_utc_datetime(&local).fix(), |o| o.fix())
}

/// ## Summary
/// [`to_utc`] for a zone given by name, with no overlap preference.
///
/// ## Errors
/// Returns `ConversionError::UnknownTimezone` if `tzid` does not resolve.
pub fn convert_to_utc(
    local: NaiveDateTime,
    tzid: &str,
    resolver: &mut TimeZoneResolver,
) -> Result<DateTime<Utc>, ConversionError> {
    resolver.resolve(tzid).map(|zone| to_utc(local, zone, None))
}

/// Truncating unit for [`zone_aware_duration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl DurationUnit {
    /// Whole units in `delta`, truncated toward zero.
    #[must_use]
    pub fn count(self, delta: TimeDelta) -> i64 {
        match self {
            Self::Seconds => delta.num_seconds(),
            Self::Minutes => delta.num_minutes(),
            Self::Hours => delta.num_hours(),
            Self::Days => delta.num_days(),
        }
    }
}

/// ## Summary
/// Returns the elapsed time between two zoned wall-clock values in `unit`.
///
/// Both sides are converted to UTC first, so an event starting in one zone
/// and ending in another is measured by real elapsed time.
#[must_use]
pub fn zone_aware_duration(
    start: NaiveDateTime,
    start_zone: Tz,
    end: NaiveDateTime,
    end_zone: Tz,
    unit: DurationUnit,
) -> i64 {
    let start_utc = to_utc(start, start_zone, None);
    let end_utc = to_utc(end, end_zone, None);
    unit.count(end_utc.signed_duration_since(start_utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn local(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDateTime::new(
            NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
        )
    }

    #[test]
    fn test_normalize_tzid_spellings() {
        let cases = [
            ("America/New_York", "America/New_York"),
            ("Eastern Standard Time", "America/New_York"),
            ("Pacific Standard Time", "America/Los_Angeles"),
            ("/mozilla.org/Europe/Paris", "Europe/Paris"),
            ("/softwarestudio.org/Asia/Tokyo", "Asia/Tokyo"),
            ("US/Eastern", "America/New_York"),
            ("Europe/Kiev", "Europe/Kyiv"),
            ("Mars/Olympus_Mons", "Mars/Olympus_Mons"),
        ];

        for (input, expected) in cases {
            assert_eq!(normalize_tzid(input), expected, "normalizing {input}");
        }
    }

    #[test]
    fn test_resolve_windows_name() {
        let mut resolver = TimeZoneResolver::new();

        let zone = resolver.resolve("W. Europe Standard Time").unwrap();
        assert_eq!(zone, Tz::Europe__Berlin);
    }

    #[test]
    fn test_resolve_unknown_keeps_caller_spelling() {
        let mut resolver = TimeZoneResolver::new();

        let err = resolver.resolve("/mozilla.org/Mars/Olympus_Mons").unwrap_err();
        assert!(matches!(
            err,
            ConversionError::UnknownTimezone(ref id) if id == "/mozilla.org/Mars/Olympus_Mons"
        ));
        assert!(resolver.cache.is_empty());
    }

    #[test]
    fn test_resolve_caches_by_input() {
        let mut resolver = TimeZoneResolver::new();

        resolver.resolve("US/Eastern").unwrap();
        resolver.resolve("America/New_York").unwrap();

        assert_eq!(resolver.cache.len(), 2);
        assert_eq!(resolver.cache.get("US/Eastern"), Some(&Tz::America__New_York));
    }

    #[test]
    fn test_to_utc_standard_time() {
        let utc = to_utc(local(2026, 1, 15, 10, 0), Tz::America__New_York, None);
        assert_eq!(utc, Utc.with_ymd_and_hms(2026, 1, 15, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_to_utc_daylight_time() {
        let utc = to_utc(local(2026, 7, 15, 10, 0), Tz::America__New_York, None);
        assert_eq!(utc, Utc.with_ymd_and_hms(2026, 7, 15, 14, 0, 0).unwrap());
    }

    #[test_log::test]
    fn test_to_utc_gap_moves_forward_by_gap_length() {
        let utc = to_utc(local(2024, 3, 10, 2, 30), Tz::America__New_York, None);

        // 03:30 EDT
        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 3, 10, 7, 30, 0).unwrap());
        let wall = utc.with_timezone(&Tz::America__New_York);
        assert_eq!(wall.time(), NaiveTime::from_hms_opt(3, 30, 0).unwrap());
        assert_eq!(wall.offset().fix().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn test_to_utc_half_hour_gap() {
        // Lord Howe moves from +10:30 to +11:00
        let utc = to_utc(local(2024, 10, 6, 2, 15), Tz::Australia__Lord_Howe, None);
        let wall = utc.with_timezone(&Tz::Australia__Lord_Howe);
        assert_eq!(wall.time(), NaiveTime::from_hms_opt(2, 45, 0).unwrap());
    }

    #[test]
    fn test_to_utc_overlap_prefers_pre_transition_offset() {
        let utc = to_utc(local(2024, 11, 3, 1, 30), Tz::America__New_York, None);

        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap());
    }

    #[test]
    fn test_to_utc_overlap_honors_preferred_offset() {
        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        let utc = to_utc(local(2024, 11, 3, 1, 30), Tz::America__New_York, Some(est));

        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 11, 3, 6, 30, 0).unwrap());
    }

    #[test]
    fn test_to_utc_ignores_preferred_offset_outside_overlap() {
        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        let utc = to_utc(local(2024, 7, 1, 9, 0), Tz::America__New_York, Some(est));

        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 7, 1, 13, 0, 0).unwrap());
    }

    #[test]
    fn test_convert_to_utc_with_resolver() {
        let mut resolver = TimeZoneResolver::new();

        let utc = convert_to_utc(local(2026, 1, 15, 10, 0), "W. Europe Standard Time", &mut resolver)
            .expect("conversion should succeed");

        assert_eq!(utc, Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_zone_aware_duration_across_zones() {
        // Departs Berlin 10:00 CET, lands New York 12:30 EST: 8.5 hours elapsed
        let minutes = zone_aware_duration(
            local(2026, 1, 15, 10, 0),
            Tz::Europe__Berlin,
            local(2026, 1, 15, 12, 30),
            Tz::America__New_York,
            DurationUnit::Minutes,
        );

        assert_eq!(minutes, 510);
    }

    #[test]
    fn test_zone_aware_duration_across_dst_change() {
        // Three hours on the wall clock, one of which is skipped by the spring-forward gap.
        let hours = zone_aware_duration(
            local(2024, 3, 10, 1, 0),
            Tz::America__New_York,
            local(2024, 3, 10, 4, 0),
            Tz::America__New_York,
            DurationUnit::Hours,
        );

        assert_eq!(hours, 2);
    }

    #[test]
    fn test_duration_unit_truncates() {
        let delta = TimeDelta::minutes(90);
        assert_eq!(DurationUnit::Hours.count(delta), 1);
        assert_eq!(DurationUnit::Minutes.count(delta), 90);
        assert_eq!(DurationUnit::Seconds.count(delta), 5400);
        assert_eq!(DurationUnit::Days.count(delta), 0);
    }
}
