// libs/booking-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// A caller's request to book a session. Date and time arrive as strings
/// ("YYYY-MM-DD" / "HH:MM") and are parsed by the validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub therapist_id: Uuid,
    pub session_date: String,
    pub start_time: String,
    pub duration_minutes: i32,
}

/// HTTP-facing booking payload; the client id comes from the caller's
/// account, the rest mirrors BookingRequest.
#[derive(Debug, Clone, Deserialize)]
pub struct BookSessionRequest {
    pub therapist_id: Uuid,
    pub client_id: Uuid,
    pub session_date: String,
    pub start_time: String,
    pub duration_minutes: i32,
}

impl BookSessionRequest {
    pub fn booking_request(&self) -> BookingRequest {
        BookingRequest {
            therapist_id: self.therapist_id,
            session_date: self.session_date.clone(),
            start_time: self.start_time.clone(),
            duration_minutes: self.duration_minutes,
        }
    }
}

// ==============================================================================
// VALIDATED OUTPUT
// ==============================================================================

/// The concrete half-open window a request resolves to once its date and
/// time parse cleanly.
#[derive(Debug, Clone, Serialize)]
pub struct SessionWindow {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

// ==============================================================================
// COLLABORATOR SNAPSHOTS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TherapistProfile {
    pub id: Uuid,
    pub is_active: bool,
    pub is_verified: bool,
    pub profile_status: String,
}

impl TherapistProfile {
    pub fn is_bookable(&self) -> bool {
        self.is_active && self.is_verified && self.profile_status == "approved"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreditBalance {
    pub client_id: Uuid,
    pub balance: i32,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Therapist not found or not accepting bookings")]
    TherapistNotFound,

    #[error("Requested time conflicts with an existing session from {start} to {end}")]
    Conflict {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Insufficient session credits")]
    InsufficientCredits,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match &err {
            BookingError::Validation(msg) => AppError::ValidationError(msg.clone()),
            BookingError::TherapistNotFound => AppError::NotFound(err.to_string()),
            BookingError::Conflict { .. } => AppError::Conflict(err.to_string()),
            BookingError::InsufficientCredits => AppError::PaymentRequired(err.to_string()),
            BookingError::DatabaseError(msg) => AppError::Database(msg.clone()),
        }
    }
}
