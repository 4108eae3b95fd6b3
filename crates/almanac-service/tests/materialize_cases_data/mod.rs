use almanac_core::config::RecurrenceConfig;
use almanac_recur::recur::OccurrenceSlot;
use almanac_service::materialize::Materializer;
use almanac_service::request::EventRequest;
use chrono::SecondsFormat;

pub const EVENT_ID: &str = "0191e7a2-7c1e-7d4b-9a51-0cbf3f1d2a44";

pub struct MaterializeCase {
    pub name: &'static str,
    pub schedule: &'static str,
    pub recurrence: &'static str,
    pub expected: &'static [&'static str],
}

pub fn materialize_cases() -> Vec<MaterializeCase> {
    vec![
        MaterializeCase {
            name: "never_single_day",
            schedule: r#"{"kind": "day", "start_date": "2024-05-01", "end_date": "2024-05-03"}"#,
            recurrence: r#"{"frequency": "NEVER"}"#,
            expected: &["2024-05-01"],
        },
        MaterializeCase {
            name: "leap_day_annual",
            schedule: r#"{"kind": "day", "start_date": "2024-02-29", "end_date": "2024-02-29"}"#,
            recurrence: r#"{"frequency": "ANNUALLY", "step": 1, "duration_mode": "UNTIL_DATE", "end_date": "2028-12-04"}"#,
            expected: &[
                "2024-02-29",
                "2025-02-28",
                "2026-02-28",
                "2027-02-28",
                "2028-02-29",
            ],
        },
        MaterializeCase {
            name: "weekly_multi_day",
            schedule: r#"{"kind": "day", "start_date": "2024-08-12", "end_date": "2024-08-12"}"#,
            recurrence: r#"{"frequency": "WEEKLY", "step": 2, "weekly_days": ["Sat", "Mon"], "duration_mode": "UNTIL_DATE", "end_date": "2024-08-28"}"#,
            expected: &["2024-08-12", "2024-08-17", "2024-08-26"],
        },
        MaterializeCase {
            name: "monthly_same_day_month_end",
            schedule: r#"{"kind": "day", "start_date": "2023-01-31", "end_date": "2023-01-31"}"#,
            recurrence: r#"{"frequency": "MONTHLY", "step": 1, "monthly_type": "SAME_DAY", "duration_mode": "UNTIL_DATE", "end_date": "2023-06-30"}"#,
            expected: &[
                "2023-01-31",
                "2023-02-28",
                "2023-03-31",
                "2023-04-30",
                "2023-05-31",
                "2023-06-30",
            ],
        },
        MaterializeCase {
            name: "monthly_fifth_weekday",
            schedule: r#"{"kind": "day", "start_date": "2024-03-29", "end_date": "2024-03-29"}"#,
            recurrence: r#"{"frequency": "MONTHLY", "step": 1, "monthly_type": "SAME_WEEKDAY", "duration_mode": "N_OCCURRENCES", "occurrence_count": 3}"#,
            expected: &["2024-03-29", "2024-04-26", "2024-05-31"],
        },
        MaterializeCase {
            name: "until_before_anchor",
            schedule: r#"{"kind": "day", "start_date": "2024-05-01", "end_date": "2024-05-01"}"#,
            recurrence: r#"{"frequency": "DAILY", "step": 1, "duration_mode": "UNTIL_DATE", "end_date": "2024-04-30"}"#,
            expected: &[],
        },
        MaterializeCase {
            name: "dst_gap_new_york",
            schedule: r#"{"kind": "time", "start": "2024-03-09T02:30:00", "start_zone": "America/New_York", "end": "2024-03-09T03:00:00", "end_zone": "America/New_York"}"#,
            recurrence: r#"{"frequency": "DAILY", "step": 1, "duration_mode": "N_OCCURRENCES", "occurrence_count": 2}"#,
            expected: &["2024-03-09T07:30:00Z", "2024-03-10T07:30:00Z"],
        },
        MaterializeCase {
            name: "dst_overlap_new_york",
            schedule: r#"{"kind": "time", "start": "2024-11-02T01:30:00", "start_zone": "America/New_York", "end": "2024-11-02T02:00:00", "end_zone": "America/New_York"}"#,
            recurrence: r#"{"frequency": "DAILY", "step": 1, "duration_mode": "N_OCCURRENCES", "occurrence_count": 2}"#,
            expected: &["2024-11-02T05:30:00Z", "2024-11-03T05:30:00Z"],
        },
        MaterializeCase {
            name: "windows_zone_across_dst_end",
            schedule: r#"{"kind": "time", "start": "2024-10-21T09:00:00", "start_zone": "W. Europe Standard Time", "end": "2024-10-21T10:00:00", "end_zone": "W. Europe Standard Time"}"#,
            recurrence: r#"{"frequency": "WEEKLY", "step": 1, "weekly_days": ["Mon"], "duration_mode": "N_OCCURRENCES", "occurrence_count": 2}"#,
            expected: &["2024-10-21T07:00:00Z", "2024-10-28T08:00:00Z"],
        },
        MaterializeCase {
            name: "respecified_generation_zone",
            schedule: r#"{"kind": "time", "start": "2024-06-03T09:00:00", "start_zone": "America/New_York", "end": "2024-06-03T10:00:00", "end_zone": "America/New_York", "zone": "Asia/Tokyo"}"#,
            recurrence: r#"{"frequency": "DAILY", "step": 2, "duration_mode": "N_OCCURRENCES", "occurrence_count": 2}"#,
            expected: &["2024-06-03T00:00:00Z", "2024-06-05T00:00:00Z"],
        },
    ]
}

pub fn request_json(schedule: &str, recurrence: &str) -> String {
    format!(
        r#"{{"event_id": "{EVENT_ID}", "title": "Case", "schedule": {schedule}, "recurrence": {recurrence}}}"#
    )
}

pub fn slot_start(slot: &OccurrenceSlot) -> String {
    match slot {
        OccurrenceSlot::Day(day) => day.start.to_string(),
        OccurrenceSlot::Time(time) => time.start.to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}

pub fn assert_case(case: &MaterializeCase) {
    let request = EventRequest::from_json(&request_json(case.schedule, case.recurrence))
        .unwrap_or_else(|err| panic!("Failed to parse {}: {}", case.name, err));

    let mut materializer = Materializer::new(RecurrenceConfig::default())
        .unwrap_or_else(|err| panic!("Failed to build materializer: {err}"));
    let event = materializer
        .materialize(&request)
        .unwrap_or_else(|err| panic!("Failed to materialize {}: {}", case.name, err));

    let actual: Vec<String> = event.slots.iter().map(slot_start).collect();
    assert_eq!(actual, case.expected, "Case {} did not match", case.name);
}
