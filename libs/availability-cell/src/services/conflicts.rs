// libs/availability-cell/src/services/conflicts.rs
//
// Marks or removes candidate slots that overlap already-booked sessions.
// Only blocking-status sessions (scheduled, confirmed, in_progress) count.

use chrono::{DateTime, Utc};

use crate::models::{CandidateSlot, SlotFilterMode, TherapySession};

/// Half-open interval overlap: `[start1, end1)` intersects `[start2, end2)`.
pub fn overlaps(
    start1: DateTime<Utc>,
    end1: DateTime<Utc>,
    start2: DateTime<Utc>,
    end2: DateTime<Utc>,
) -> bool {
    start1 < end2 && start2 < end1
}

pub fn filter_slots(
    slots: Vec<CandidateSlot>,
    sessions: &[TherapySession],
    mode: SlotFilterMode,
) -> Vec<CandidateSlot> {
    let mut result = Vec::with_capacity(slots.len());

    for mut slot in slots {
        let slot_start = slot.start_datetime();
        let slot_end = slot.end_datetime();

        let booked = sessions.iter().any(|session| {
            session.status.is_blocking()
                && overlaps(slot_start, slot_end, session.start_time, session.end_time)
        });

        match mode {
            SlotFilterMode::Available => {
                if !booked {
                    result.push(slot);
                }
            }
            SlotFilterMode::All => {
                if booked {
                    slot.is_available = false;
                    slot.booking_status = Some("booked".to_string());
                }
                result.push(slot);
            }
        }
    }

    result
}
