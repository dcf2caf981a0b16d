// libs/availability-cell/tests/normalize_test.rs
//
// Boundary mapping of the two persisted schedule shapes into WeeklySchedule.

use chrono::{NaiveTime, NaiveDate};
use serde_json::json;
use uuid::Uuid;

use availability_cell::models::{SessionSettings, WeeklyAvailabilityRow};
use availability_cell::services::{generator, normalize};

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 8).unwrap()
}

#[test]
fn weekly_rows_map_to_general_hours() {
    let rows = vec![WeeklyAvailabilityRow {
        id: Uuid::new_v4(),
        therapist_id: Uuid::new_v4(),
        day_of_week: 1,
        enabled: true,
        start_time: Some(time(9, 0)),
        end_time: Some(time(11, 0)),
        session_duration_minutes: Some(60),
        time_slots: None,
    }];

    let schedule = normalize::from_weekly_rows(&rows);
    let day = schedule.day(1).expect("monday should be present");
    assert!(day.enabled);
    assert_eq!(day.general_hours.as_ref().unwrap().start, time(9, 0));

    let slots = generator::generate(&schedule, &SessionSettings::default(), monday());
    assert_eq!(slots.len(), 2);
}

#[test]
fn out_of_range_day_rows_are_skipped() {
    let rows = vec![WeeklyAvailabilityRow {
        id: Uuid::new_v4(),
        therapist_id: Uuid::new_v4(),
        day_of_week: 9,
        enabled: true,
        start_time: Some(time(9, 0)),
        end_time: Some(time(17, 0)),
        session_duration_minutes: Some(60),
        time_slots: None,
    }];

    let schedule = normalize::from_weekly_rows(&rows);
    assert!(schedule.is_empty());
}

#[test]
fn legacy_template_round_trips_through_the_generator() {
    let document = json!({
        "monday": {
            "enabled": true,
            "generalHours": { "start": "09:00", "end": "11:00", "sessionDuration": 60 }
        },
        "tuesday": {
            "enabled": true,
            "timeSlots": [
                { "start": "10:00", "end": "12:00", "type": "individual" },
                { "start": "12:00", "end": "13:00", "type": "break" }
            ]
        },
        "wednesday": { "enabled": false }
    });

    let schedule = normalize::from_template(&document);

    let monday_slots = generator::generate(&schedule, &SessionSettings::default(), monday());
    assert_eq!(monday_slots.len(), 2);

    // 2025-09-09 is a Tuesday.
    let tuesday = NaiveDate::from_ymd_opt(2025, 9, 9).unwrap();
    let tuesday_slots = generator::generate(&schedule, &SessionSettings::default(), tuesday);
    assert_eq!(tuesday_slots.len(), 2);
    assert_eq!(tuesday_slots[0].start_time, time(10, 0));

    // 2025-09-10 is a Wednesday.
    let wednesday = NaiveDate::from_ymd_opt(2025, 9, 10).unwrap();
    assert!(generator::generate(&schedule, &SessionSettings::default(), wednesday).is_empty());
}

#[test]
fn malformed_times_degrade_to_no_slots_instead_of_failing() {
    let document = json!({
        "monday": {
            "enabled": true,
            "generalHours": { "start": "9am", "end": "five" }
        }
    });

    let schedule = normalize::from_template(&document);
    let slots = generator::generate(&schedule, &SessionSettings::default(), monday());
    assert!(slots.is_empty());
}

#[test]
fn non_object_template_degrades_to_empty_schedule() {
    let schedule = normalize::from_template(&json!("not a schedule"));
    assert!(schedule.is_empty());
}

#[test]
fn parse_hhmm_accepts_both_precision_levels() {
    assert_eq!(normalize::parse_hhmm("09:30"), Some(time(9, 30)));
    assert_eq!(normalize::parse_hhmm("09:30:00"), Some(time(9, 30)));
    assert_eq!(normalize::parse_hhmm("25:00"), None);
    assert_eq!(normalize::parse_hhmm(""), None);
}
