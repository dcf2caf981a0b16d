// libs/availability-cell/src/services/normalize.rs
//
// Boundary mapper that folds the two persisted schedule shapes into the one
// WeeklySchedule model: per-weekday rows (current format) and the legacy
// whole-week JSON template keyed by lowercase day name. Malformed entries are
// logged and skipped so a data error never takes down the calendar view.

use chrono::NaiveTime;
use serde_json::Value;
use tracing::warn;

use crate::models::{
    DayAvailability, GeneralHours, TimeSlotEntry, WeeklyAvailabilityRow, WeeklySchedule,
};

const DAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Parse "HH:MM" (tolerating "HH:MM:SS") into a time of day.
pub fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Build a WeeklySchedule from current-format per-day rows.
pub fn from_weekly_rows(rows: &[WeeklyAvailabilityRow]) -> WeeklySchedule {
    let mut schedule = WeeklySchedule::new();

    for row in rows {
        if !(0..7).contains(&row.day_of_week) {
            warn!(
                "Skipping availability row {} with day_of_week {}",
                row.id, row.day_of_week
            );
            continue;
        }

        let general_hours = match (row.start_time, row.end_time) {
            (Some(start), Some(end)) => Some(GeneralHours {
                start,
                end,
                session_duration_minutes: row.session_duration_minutes,
            }),
            _ => None,
        };

        let time_slots = row
            .time_slots
            .as_ref()
            .map(|value| parse_time_slots(value))
            .unwrap_or_default();

        schedule.set_day(
            row.day_of_week as u32,
            DayAvailability {
                enabled: row.enabled,
                general_hours,
                time_slots,
            },
        );
    }

    schedule
}

/// Build a WeeklySchedule from the legacy template document, e.g.
/// `{"monday": {"enabled": true, "generalHours": {...}, "timeSlots": [...]}}`.
pub fn from_template(document: &Value) -> WeeklySchedule {
    let mut schedule = WeeklySchedule::new();

    let days = match document.as_object() {
        Some(days) => days,
        None => {
            warn!("Legacy availability template is not a JSON object; ignoring");
            return schedule;
        }
    };

    for (index, name) in DAY_NAMES.iter().enumerate() {
        let Some(entry) = days.get(*name) else {
            continue;
        };

        let enabled = entry
            .get("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let general_hours = entry.get("generalHours").and_then(parse_general_hours);

        let time_slots = entry
            .get("timeSlots")
            .map(parse_time_slots)
            .unwrap_or_default();

        schedule.set_day(
            index as u32,
            DayAvailability {
                enabled,
                general_hours,
                time_slots,
            },
        );
    }

    schedule
}

fn parse_general_hours(value: &Value) -> Option<GeneralHours> {
    let start_raw = value.get("start").and_then(Value::as_str)?;
    let end_raw = value.get("end").and_then(Value::as_str)?;

    let (Some(start), Some(end)) = (parse_hhmm(start_raw), parse_hhmm(end_raw)) else {
        warn!(
            "Skipping general hours with malformed times: {} - {}",
            start_raw, end_raw
        );
        return None;
    };

    let session_duration_minutes = value
        .get("sessionDuration")
        .and_then(Value::as_i64)
        .map(|d| d as i32);

    Some(GeneralHours {
        start,
        end,
        session_duration_minutes,
    })
}

fn parse_time_slots(value: &Value) -> Vec<TimeSlotEntry> {
    let entries = match value.as_array() {
        Some(entries) => entries,
        None => {
            warn!("timeSlots is not a JSON array; ignoring");
            return Vec::new();
        }
    };

    entries
        .iter()
        .filter_map(|entry| {
            let start_raw = entry.get("start").and_then(Value::as_str)?;
            let end_raw = entry.get("end").and_then(Value::as_str)?;

            let (Some(start), Some(end)) = (parse_hhmm(start_raw), parse_hhmm(end_raw)) else {
                warn!(
                    "Skipping time slot with malformed times: {} - {}",
                    start_raw, end_raw
                );
                return None;
            };

            let slot_type = entry
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("available")
                .to_string();

            Some(TimeSlotEntry {
                start,
                end,
                slot_type,
            })
        })
        .collect()
}
