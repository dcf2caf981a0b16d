// libs/availability-cell/tests/slot_pipeline_test.rs
//
// Pure pipeline coverage: slot generation, override precedence and conflict
// filtering, all over in-memory fixtures.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use availability_cell::models::{
    AvailabilityOverride, DayAvailability, GeneralHours, SessionSettings, SessionStatus,
    SlotFilterMode, TherapySession, TimeSlotEntry, WeeklySchedule,
};
use availability_cell::services::{conflicts, generator, overrides};

// ==============================================================================
// FIXTURES
// ==============================================================================

// 2025-09-08 is a Monday (day_of_week 1).
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 8).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn schedule_with_general_hours(start: NaiveTime, end: NaiveTime, duration: Option<i32>) -> WeeklySchedule {
    let mut schedule = WeeklySchedule::new();
    schedule.set_day(
        1,
        DayAvailability {
            enabled: true,
            general_hours: Some(GeneralHours {
                start,
                end,
                session_duration_minutes: duration,
            }),
            time_slots: Vec::new(),
        },
    );
    schedule
}

fn settings(duration: i32) -> SessionSettings {
    SessionSettings {
        session_duration_minutes: duration,
    }
}

fn session(status: SessionStatus, start_hm: (u32, u32), end_hm: (u32, u32)) -> TherapySession {
    TherapySession {
        id: Uuid::new_v4(),
        therapist_id: Uuid::new_v4(),
        client_id: Uuid::new_v4(),
        start_time: Utc
            .with_ymd_and_hms(2025, 9, 8, start_hm.0, start_hm.1, 0)
            .unwrap(),
        end_time: Utc
            .with_ymd_and_hms(2025, 9, 8, end_hm.0, end_hm.1, 0)
            .unwrap(),
        status,
    }
}

fn override_entry(is_active: bool, is_available: bool) -> AvailabilityOverride {
    AvailabilityOverride {
        id: Uuid::new_v4(),
        therapist_id: Uuid::new_v4(),
        override_date: monday(),
        is_active,
        is_available,
        start_time: None,
        end_time: None,
        session_duration_minutes: None,
        reason: None,
    }
}

// ==============================================================================
// SLOT GENERATION
// ==============================================================================

#[test]
fn general_hours_produce_back_to_back_fixed_slots() {
    let schedule = schedule_with_general_hours(time(9, 0), time(11, 0), Some(60));
    let slots = generator::generate(&schedule, &settings(30), monday());

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].start_time, time(9, 0));
    assert_eq!(slots[0].end_time, time(10, 0));
    assert_eq!(slots[1].start_time, time(10, 0));
    assert_eq!(slots[1].end_time, time(11, 0));

    for slot in &slots {
        assert!(slot.is_available);
        assert!(!slot.is_override);
        assert_eq!(slot.max_sessions, 1);
        assert_eq!(slot.session_type, "individual");
        assert_eq!(slot.day_of_week, 1);
    }
}

#[test]
fn generation_is_idempotent() {
    let schedule = schedule_with_general_hours(time(9, 0), time(17, 0), Some(50));
    let first = generator::generate(&schedule, &settings(60), monday());
    let second = generator::generate(&schedule, &settings(60), monday());

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.start_time, b.start_time);
        assert_eq!(a.end_time, b.end_time);
    }
}

#[test]
fn consecutive_slots_leave_no_gaps() {
    let schedule = schedule_with_general_hours(time(8, 0), time(16, 0), Some(45));
    let slots = generator::generate(&schedule, &settings(60), monday());

    assert!(!slots.is_empty());
    for pair in slots.windows(2) {
        assert_eq!(pair[0].end_time, pair[1].start_time);
    }
}

#[test]
fn trailing_partial_window_is_discarded() {
    let schedule = schedule_with_general_hours(time(9, 0), time(10, 30), Some(60));
    let slots = generator::generate(&schedule, &settings(60), monday());

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start_time, time(9, 0));
    assert_eq!(slots[0].end_time, time(10, 0));
}

#[test]
fn disabled_day_yields_no_slots_regardless_of_hours() {
    let mut schedule = WeeklySchedule::new();
    schedule.set_day(
        1,
        DayAvailability {
            enabled: false,
            general_hours: Some(GeneralHours {
                start: time(9, 0),
                end: time(17, 0),
                session_duration_minutes: Some(60),
            }),
            time_slots: vec![TimeSlotEntry {
                start: time(9, 0),
                end: time(12, 0),
                slot_type: "available".to_string(),
            }],
        },
    );

    assert!(generator::generate(&schedule, &settings(60), monday()).is_empty());
}

#[test]
fn missing_day_yields_no_slots() {
    let schedule = WeeklySchedule::new();
    assert!(generator::generate(&schedule, &settings(60), monday()).is_empty());
}

#[test]
fn inverted_window_yields_no_slots() {
    let schedule = schedule_with_general_hours(time(14, 0), time(9, 0), Some(60));
    assert!(generator::generate(&schedule, &settings(60), monday()).is_empty());
}

#[test]
fn zero_length_window_yields_no_slots() {
    let schedule = schedule_with_general_hours(time(9, 0), time(9, 0), Some(60));
    assert!(generator::generate(&schedule, &settings(60), monday()).is_empty());
}

#[test]
fn time_slots_are_used_when_general_hours_absent() {
    let mut schedule = WeeklySchedule::new();
    schedule.set_day(
        1,
        DayAvailability {
            enabled: true,
            general_hours: None,
            time_slots: vec![
                TimeSlotEntry {
                    start: time(9, 0),
                    end: time(11, 0),
                    slot_type: "individual".to_string(),
                },
                TimeSlotEntry {
                    start: time(12, 0),
                    end: time(13, 0),
                    slot_type: "break".to_string(),
                },
                TimeSlotEntry {
                    start: time(14, 0),
                    end: time(15, 0),
                    slot_type: "available".to_string(),
                },
            ],
        },
    );

    let slots = generator::generate(&schedule, &settings(60), monday());

    // Two from the morning window, one from the afternoon; the break is skipped.
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0].start_time, time(9, 0));
    assert_eq!(slots[1].start_time, time(10, 0));
    assert_eq!(slots[2].start_time, time(14, 0));
}

#[test]
fn general_hours_win_over_time_slots() {
    let mut schedule = WeeklySchedule::new();
    schedule.set_day(
        1,
        DayAvailability {
            enabled: true,
            general_hours: Some(GeneralHours {
                start: time(9, 0),
                end: time(10, 0),
                session_duration_minutes: Some(60),
            }),
            time_slots: vec![TimeSlotEntry {
                start: time(13, 0),
                end: time(17, 0),
                slot_type: "available".to_string(),
            }],
        },
    );

    let slots = generator::generate(&schedule, &settings(60), monday());
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start_time, time(9, 0));
}

#[test]
fn day_duration_falls_back_to_session_settings() {
    let schedule = schedule_with_general_hours(time(9, 0), time(10, 0), None);
    let slots = generator::generate(&schedule, &settings(30), monday());

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].session_duration_minutes, 30);
}

// ==============================================================================
// OVERRIDE PRECEDENCE
// ==============================================================================

#[test]
fn inactive_override_is_ignored() {
    let schedule = schedule_with_general_hours(time(9, 0), time(11, 0), Some(60));
    let generated = generator::generate(&schedule, &settings(60), monday());

    let mut entry = override_entry(false, false);
    entry.start_time = Some(time(13, 0));
    entry.end_time = Some(time(14, 0));

    let adjusted = overrides::apply(generated.clone(), Some(&entry), &settings(60), monday());
    assert_eq!(adjusted.len(), generated.len());
    assert_eq!(adjusted[0].start_time, time(9, 0));
}

#[test]
fn unavailable_override_blocks_the_whole_date() {
    let schedule = schedule_with_general_hours(time(9, 0), time(17, 0), Some(60));
    let generated = generator::generate(&schedule, &settings(60), monday());
    assert!(!generated.is_empty());

    let entry = override_entry(true, false);
    let adjusted = overrides::apply(generated, Some(&entry), &settings(60), monday());
    assert!(adjusted.is_empty());
}

#[test]
fn custom_hours_override_replaces_generated_slots() {
    let schedule = schedule_with_general_hours(time(9, 0), time(12, 0), Some(60));
    let generated = generator::generate(&schedule, &settings(60), monday());
    assert_eq!(generated.len(), 3);

    let mut entry = override_entry(true, true);
    entry.start_time = Some(time(14, 0));
    entry.end_time = Some(time(16, 0));
    entry.session_duration_minutes = Some(60);

    let adjusted = overrides::apply(generated, Some(&entry), &settings(60), monday());

    // Full replacement, not a union with the weekly slots.
    assert_eq!(adjusted.len(), 2);
    assert_eq!(adjusted[0].start_time, time(14, 0));
    assert_eq!(adjusted[1].start_time, time(15, 0));
    assert!(adjusted.iter().all(|s| s.is_override));
    assert!(adjusted.iter().all(|s| s.start_time >= time(14, 0)));
}

#[test]
fn available_override_without_hours_is_a_noop() {
    let schedule = schedule_with_general_hours(time(9, 0), time(11, 0), Some(60));
    let generated = generator::generate(&schedule, &settings(60), monday());

    let entry = override_entry(true, true);
    let adjusted = overrides::apply(generated.clone(), Some(&entry), &settings(60), monday());

    assert_eq!(adjusted.len(), generated.len());
    assert!(adjusted.iter().all(|s| !s.is_override));
}

#[test]
fn no_override_passes_slots_through() {
    let schedule = schedule_with_general_hours(time(9, 0), time(11, 0), Some(60));
    let generated = generator::generate(&schedule, &settings(60), monday());

    let adjusted = overrides::apply(generated.clone(), None, &settings(60), monday());
    assert_eq!(adjusted.len(), generated.len());
}

// ==============================================================================
// CONFLICT FILTERING
// ==============================================================================

#[test]
fn overlap_predicate_is_symmetric() {
    let a_start = Utc.with_ymd_and_hms(2025, 9, 8, 10, 0, 0).unwrap();
    let a_end = Utc.with_ymd_and_hms(2025, 9, 8, 11, 0, 0).unwrap();
    let b_start = Utc.with_ymd_and_hms(2025, 9, 8, 10, 30, 0).unwrap();
    let b_end = Utc.with_ymd_and_hms(2025, 9, 8, 11, 30, 0).unwrap();

    assert_eq!(
        conflicts::overlaps(a_start, a_end, b_start, b_end),
        conflicts::overlaps(b_start, b_end, a_start, a_end)
    );
    assert!(conflicts::overlaps(a_start, a_end, a_start, a_end));
}

#[test]
fn adjacent_intervals_do_not_overlap() {
    let a_start = Utc.with_ymd_and_hms(2025, 9, 8, 9, 0, 0).unwrap();
    let a_end = Utc.with_ymd_and_hms(2025, 9, 8, 10, 0, 0).unwrap();
    let b_end = Utc.with_ymd_and_hms(2025, 9, 8, 11, 0, 0).unwrap();

    assert!(!conflicts::overlaps(a_start, a_end, a_end, b_end));
}

#[test]
fn scheduled_session_blocks_the_overlapping_slot() {
    let schedule = schedule_with_general_hours(time(10, 0), time(12, 0), Some(60));
    let generated = generator::generate(&schedule, &settings(60), monday());
    assert_eq!(generated.len(), 2);

    let booked = vec![session(SessionStatus::Scheduled, (10, 30), (10, 45))];
    let remaining = conflicts::filter_slots(generated, &booked, SlotFilterMode::Available);

    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].start_time, time(11, 0));
}

#[test]
fn cancelled_session_does_not_block() {
    let schedule = schedule_with_general_hours(time(10, 0), time(11, 0), Some(60));
    let generated = generator::generate(&schedule, &settings(60), monday());

    let booked = vec![
        session(SessionStatus::Cancelled, (10, 30), (10, 45)),
        session(SessionStatus::Completed, (10, 0), (11, 0)),
    ];
    let remaining = conflicts::filter_slots(generated, &booked, SlotFilterMode::Available);

    assert_eq!(remaining.len(), 1);
}

#[test]
fn all_mode_marks_conflicting_slots_instead_of_removing() {
    let schedule = schedule_with_general_hours(time(10, 0), time(12, 0), Some(60));
    let generated = generator::generate(&schedule, &settings(60), monday());

    let booked = vec![session(SessionStatus::Confirmed, (10, 0), (11, 0))];
    let slots = conflicts::filter_slots(generated, &booked, SlotFilterMode::All);

    assert_eq!(slots.len(), 2);
    assert!(!slots[0].is_available);
    assert_eq!(slots[0].booking_status.as_deref(), Some("booked"));
    assert!(slots[1].is_available);
    assert!(slots[1].booking_status.is_none());
}
