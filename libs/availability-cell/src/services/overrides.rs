// libs/availability-cell/src/services/overrides.rs
//
// Applies a date-specific override to the generator's output. An active
// override either blocks the whole date or replaces the generated slots with
// windows computed from its own hours. Inactive overrides are ignored as if
// they did not exist.

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{day_of_week_index, AvailabilityOverride, CandidateSlot, SessionSettings};
use crate::services::generator;

pub fn apply(
    slots: Vec<CandidateSlot>,
    override_entry: Option<&AvailabilityOverride>,
    settings: &SessionSettings,
    date: NaiveDate,
) -> Vec<CandidateSlot> {
    let entry = match override_entry {
        Some(entry) if entry.is_active => entry,
        _ => return slots,
    };

    if !entry.is_available {
        debug!("Date {} blocked by availability override {}", date, entry.id);
        return Vec::new();
    }

    // Custom hours replace the generated slots entirely; this is not a union
    // or intersection with the weekly schedule.
    if let (Some(start), Some(end)) = (entry.start_time, entry.end_time) {
        let duration = entry
            .session_duration_minutes
            .unwrap_or(settings.session_duration_minutes);

        let mut replacement = Vec::new();
        generator::fill_window(
            date,
            day_of_week_index(date),
            start,
            end,
            duration,
            true,
            &mut replacement,
        );
        debug!(
            "Date {} slots replaced by override {}: {} custom slots",
            date,
            entry.id,
            replacement.len()
        );
        return replacement;
    }

    // Available override without custom hours is a no-op.
    slots
}
