// libs/availability-cell/src/models.rs
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

pub const DEFAULT_SESSION_DURATION_MINUTES: i32 = 60;

/// Day-of-week index used throughout the cell: 0 = Sunday .. 6 = Saturday.
pub fn day_of_week_index(date: NaiveDate) -> u32 {
    match date.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

// ==============================================================================
// WEEKLY SCHEDULE
// ==============================================================================

/// A therapist's recurring availability template, one entry per weekday.
#[derive(Debug, Clone, Default)]
pub struct WeeklySchedule {
    days: [Option<DayAvailability>; 7],
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_day(&mut self, day_of_week: u32, day: DayAvailability) {
        if let Some(entry) = self.days.get_mut(day_of_week as usize) {
            *entry = Some(day);
        }
    }

    pub fn day(&self, day_of_week: u32) -> Option<&DayAvailability> {
        self.days.get(day_of_week as usize).and_then(|d| d.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(|d| d.is_none())
    }
}

#[derive(Debug, Clone)]
pub struct DayAvailability {
    pub enabled: bool,
    /// Single open window for the day. Takes precedence over `time_slots`.
    pub general_hours: Option<GeneralHours>,
    pub time_slots: Vec<TimeSlotEntry>,
}

#[derive(Debug, Clone)]
pub struct GeneralHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub session_duration_minutes: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct TimeSlotEntry {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub slot_type: String,
}

impl TimeSlotEntry {
    /// Only these slot types produce bookable windows.
    pub fn is_bookable(&self) -> bool {
        matches!(self.slot_type.as_str(), "available" | "individual")
    }
}

/// Per-therapist defaults applied when a day entry omits its own duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub session_duration_minutes: i32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            session_duration_minutes: DEFAULT_SESSION_DURATION_MINUTES,
        }
    }
}

// ==============================================================================
// OVERRIDES AND SESSIONS
// ==============================================================================

/// Date-specific exception to the weekly schedule: block the whole date, or
/// replace the generated slots with custom hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityOverride {
    pub id: Uuid,
    pub therapist_id: Uuid,
    pub override_date: NaiveDate,
    pub is_active: bool,
    pub is_available: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub session_duration_minutes: Option<i32>,
    pub reason: Option<String>,
}

impl AvailabilityOverride {
    pub fn has_custom_hours(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl SessionStatus {
    /// Statuses that count toward conflict detection.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            SessionStatus::Scheduled | SessionStatus::Confirmed | SessionStatus::InProgress
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Scheduled => write!(f, "scheduled"),
            SessionStatus::Confirmed => write!(f, "confirmed"),
            SessionStatus::InProgress => write!(f, "in_progress"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Cancelled => write!(f, "cancelled"),
            SessionStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TherapySession {
    pub id: Uuid,
    pub therapist_id: Uuid,
    pub client_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: SessionStatus,
}

// ==============================================================================
// CANDIDATE SLOTS
// ==============================================================================

/// A computed, not-yet-booked time window. Created fresh on every query and
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub date: NaiveDate,
    pub day_of_week: u32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub session_duration_minutes: i32,
    pub session_type: String,
    pub is_available: bool,
    pub is_override: bool,
    pub max_sessions: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_status: Option<String>,
}

impl CandidateSlot {
    pub fn start_datetime(&self) -> DateTime<Utc> {
        self.date.and_time(self.start_time).and_utc()
    }

    pub fn end_datetime(&self) -> DateTime<Utc> {
        self.date.and_time(self.end_time).and_utc()
    }
}

/// Caller-selected behavior for slots that overlap a booked session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotFilterMode {
    /// Drop conflicting slots from the result.
    Available,
    /// Keep conflicting slots, marked unavailable with `booking_status = "booked"`.
    All,
}

impl Default for SlotFilterMode {
    fn default() -> Self {
        SlotFilterMode::Available
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

/// Failures surfaced by the slot queries. A bad range is the caller's fault;
/// everything else is a delegated-storage failure.
#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::InvalidRange(msg) => AppError::BadRequest(msg),
            AvailabilityError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

// ==============================================================================
// SUPABASE ROW MODELS
// ==============================================================================

/// One row per (therapist, weekday) in `therapist_weekly_availability`.
#[derive(Debug, Clone, Deserialize)]
pub struct WeeklyAvailabilityRow {
    pub id: Uuid,
    pub therapist_id: Uuid,
    pub day_of_week: i32,
    pub enabled: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub session_duration_minutes: Option<i32>,
    /// JSON array of `{start, end, type}` entries with "HH:MM" strings.
    pub time_slots: Option<serde_json::Value>,
}

/// Legacy `availability_templates` row: the whole week as one JSON document
/// keyed by lowercase day name.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityTemplateRow {
    pub therapist_id: Uuid,
    pub schedule: serde_json::Value,
}
