// libs/booking-cell/src/services/validator.rs
//
// Pure pre-commit checks for a booking request. "Now" is always an explicit
// parameter so the checks are deterministic under test; there is no hidden
// clock. The validator is advisory only: the database commit function owns
// atomicity, and a passed check can still lose the race to a concurrent
// booking.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use availability_cell::models::TherapySession;
use availability_cell::services::conflicts;

use crate::models::{BookingError, BookingRequest, SessionWindow};

const MAX_SESSION_DURATION_MINUTES: i32 = 480;

pub struct BookingValidator {
    lead_time: Duration,
}

impl BookingValidator {
    pub fn new(lead_time_minutes: i64) -> Self {
        Self {
            lead_time: Duration::minutes(lead_time_minutes),
        }
    }

    /// Checks 1 and 2: well-formed date/time and future-ness. Same-day
    /// requests must start at least the lead time after `now`.
    pub fn validate_timing(
        &self,
        request: &BookingRequest,
        now: DateTime<Utc>,
    ) -> Result<SessionWindow, BookingError> {
        let date = NaiveDate::parse_from_str(&request.session_date, "%Y-%m-%d").map_err(|_| {
            BookingError::Validation(format!(
                "Invalid session date '{}', expected YYYY-MM-DD",
                request.session_date
            ))
        })?;

        let start_time = NaiveTime::parse_from_str(&request.start_time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&request.start_time, "%H:%M:%S"))
            .map_err(|_| {
                BookingError::Validation(format!(
                    "Invalid start time '{}', expected HH:MM",
                    request.start_time
                ))
            })?;

        if request.duration_minutes <= 0 || request.duration_minutes > MAX_SESSION_DURATION_MINUTES
        {
            return Err(BookingError::Validation(format!(
                "Session duration must be between 1 and {} minutes",
                MAX_SESSION_DURATION_MINUTES
            )));
        }

        let today = now.date_naive();
        if date < today {
            return Err(BookingError::Validation(
                "Session date is in the past".to_string(),
            ));
        }

        let start = date.and_time(start_time).and_utc();
        if date == today && start < now + self.lead_time {
            return Err(BookingError::Validation(format!(
                "Same-day sessions must start at least {} minutes from now",
                self.lead_time.num_minutes()
            )));
        }

        let end = start + Duration::minutes(request.duration_minutes as i64);

        Ok(SessionWindow {
            date,
            start_time,
            start,
            end,
        })
    }

    /// Check 4: the requested window must not overlap any blocking-status
    /// session. The first conflicting session's window is reported so the
    /// caller can offer alternatives.
    pub fn check_conflicts(
        &self,
        window: &SessionWindow,
        sessions: &[TherapySession],
    ) -> Result<(), BookingError> {
        let conflicting = sessions.iter().find(|session| {
            session.status.is_blocking()
                && conflicts::overlaps(window.start, window.end, session.start_time, session.end_time)
        });

        match conflicting {
            Some(session) => Err(BookingError::Conflict {
                start: session.start_time,
                end: session.end_time,
            }),
            None => Ok(()),
        }
    }
}
