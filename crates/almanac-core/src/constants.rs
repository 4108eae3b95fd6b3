/// Years added to the anchor when a FOREVER series is bounded for generation.
pub const DEFAULT_FOREVER_HORIZON_YEARS: u32 = 100;

/// Upper bound on the occurrences a single request may materialize.
///
/// A daily series bounded by the default horizon produces 36 525 slots and must fit.
pub const DEFAULT_MAX_OCCURRENCES: u64 = 40_000;

pub const DAYS_PER_WEEK: u32 = 7;
pub const MONTHS_PER_YEAR: u32 = 12;

/// No weekday occurs more than five times in a month.
pub const MAX_WEEKDAY_INDEX: u32 = 5;

/// Prefix for environment variables read by the configuration loader.
pub const ENV_PREFIX: &str = "ALMANAC";
