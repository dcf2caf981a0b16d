// libs/availability-cell/src/services/generator.rs
//
// Turns a therapist's recurring weekly schedule into the ordered list of
// candidate slots for one calendar date. Pure computation; malformed schedule
// data degrades to an empty result instead of failing the calendar view.

use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::warn;

use crate::models::{
    day_of_week_index, CandidateSlot, SessionSettings, WeeklySchedule,
};

/// Generate candidate slots for `date` from the weekly schedule.
///
/// The day entry's `general_hours` wins over its `time_slots` list when both
/// are present. A disabled or missing day yields no slots.
pub fn generate(
    schedule: &WeeklySchedule,
    settings: &SessionSettings,
    date: NaiveDate,
) -> Vec<CandidateSlot> {
    let day_of_week = day_of_week_index(date);

    let day = match schedule.day(day_of_week) {
        Some(day) if day.enabled => day,
        _ => return Vec::new(),
    };

    let mut slots = Vec::new();

    if let Some(hours) = &day.general_hours {
        let duration = hours
            .session_duration_minutes
            .unwrap_or(settings.session_duration_minutes);
        fill_window(date, day_of_week, hours.start, hours.end, duration, false, &mut slots);
    } else {
        for entry in &day.time_slots {
            if !entry.is_bookable() {
                continue;
            }
            fill_window(
                date,
                day_of_week,
                entry.start,
                entry.end,
                settings.session_duration_minutes,
                false,
                &mut slots,
            );
        }
        slots.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    }

    slots
}

/// Fill `[start, end)` with back-to-back fixed-size windows. A trailing
/// partial window is dropped, not truncated.
pub fn fill_window(
    date: NaiveDate,
    day_of_week: u32,
    start: NaiveTime,
    end: NaiveTime,
    duration_minutes: i32,
    is_override: bool,
    out: &mut Vec<CandidateSlot>,
) {
    if duration_minutes <= 0 {
        warn!(
            "Skipping availability window on {} with non-positive duration {}",
            date, duration_minutes
        );
        return;
    }
    if start >= end {
        return;
    }

    let step = Duration::minutes(duration_minutes as i64);
    let mut current = start;

    loop {
        // NaiveTime addition wraps at midnight; a wrapped end means the
        // window is exhausted.
        let (slot_end, wrapped) = current.overflowing_add_signed(step);
        if wrapped != 0 || slot_end > end {
            break;
        }

        out.push(CandidateSlot {
            date,
            day_of_week,
            start_time: current,
            end_time: slot_end,
            session_duration_minutes: duration_minutes,
            session_type: "individual".to_string(),
            is_available: true,
            is_override,
            max_sessions: 1,
            booking_status: None,
        });

        current = slot_end;
    }
}
