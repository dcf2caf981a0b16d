// libs/booking-cell/src/services/booking.rs
//
// Collaborator layer around the validator: delegated therapist and credit
// lookups, then an atomic commit through the book_session_atomic Postgres
// function. There is deliberately no in-application fallback path for the
// commit; if the database rejects the insert after the advisory check
// passed, the caller sees a conflict.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use availability_cell::models::TherapySession;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    BookingError, BookingRequest, CreditBalance, SessionWindow, TherapistProfile,
};
use crate::services::validator::BookingValidator;

pub struct BookingService {
    supabase: Arc<SupabaseClient>,
    validator: BookingValidator,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            validator: BookingValidator::new(config.booking_lead_time_minutes),
        }
    }

    /// Run every pre-commit check for a booking request without committing.
    /// Safe to call repeatedly; performs reads only.
    pub async fn validate_booking(
        &self,
        request: &BookingRequest,
        client_id: Uuid,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<SessionWindow, BookingError> {
        debug!(
            "Validating booking for therapist {} on {} at {}",
            request.therapist_id, request.session_date, request.start_time
        );

        let window = self.validator.validate_timing(request, now)?;

        let therapist = self
            .fetch_therapist(request.therapist_id, auth_token)
            .await?;
        if !therapist.is_bookable() {
            warn!(
                "Therapist {} is not bookable (active={}, verified={}, status={})",
                therapist.id, therapist.is_active, therapist.is_verified, therapist.profile_status
            );
            return Err(BookingError::TherapistNotFound);
        }

        let sessions = self
            .fetch_blocking_sessions(request.therapist_id, window.date, auth_token)
            .await?;
        self.validator.check_conflicts(&window, &sessions)?;

        let credits = self.fetch_credit_balance(client_id, auth_token).await?;
        if credits.balance <= 0 {
            return Err(BookingError::InsufficientCredits);
        }

        Ok(window)
    }

    /// Validate, then commit atomically. The Postgres function re-checks the
    /// overlap under an exclusion constraint and deducts one credit in the
    /// same transaction, closing the check-then-act race that the advisory
    /// validation alone cannot.
    pub async fn book_session(
        &self,
        request: &BookingRequest,
        client_id: Uuid,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<TherapySession, BookingError> {
        let window = self.validate_booking(request, client_id, now, auth_token).await?;

        let args = json!({
            "p_therapist_id": request.therapist_id,
            "p_client_id": client_id,
            "p_session_date": window.date,
            "p_start_time": window.start_time.format("%H:%M:%S").to_string(),
            "p_duration_minutes": request.duration_minutes,
        });

        let result: Value = self
            .supabase
            .rpc("book_session_atomic", Some(auth_token), args)
            .await
            .map_err(|e| map_commit_error(e, &window))?;

        let session: TherapySession = serde_json::from_value(result)
            .map_err(|e| BookingError::DatabaseError(format!("Failed to parse booked session: {}", e)))?;

        info!(
            "Session {} booked for therapist {} from {} to {}",
            session.id, session.therapist_id, session.start_time, session.end_time
        );

        Ok(session)
    }

    // Private helper methods

    async fn fetch_therapist(
        &self,
        therapist_id: Uuid,
        auth_token: &str,
    ) -> Result<TherapistProfile, BookingError> {
        let path = format!(
            "/rest/v1/therapists?id=eq.{}&select=id,is_active,is_verified,profile_status",
            therapist_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        let Some(value) = result.into_iter().next() else {
            return Err(BookingError::TherapistNotFound);
        };

        serde_json::from_value(value)
            .map_err(|e| BookingError::DatabaseError(format!("Failed to parse therapist: {}", e)))
    }

    async fn fetch_blocking_sessions(
        &self,
        therapist_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<TherapySession>, BookingError> {
        let start_of_day = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let end_of_day = date.and_hms_opt(23, 59, 59).unwrap().and_utc();

        // Overlap query, not a start-bounded one: an overnight session that
        // started the previous day still conflicts with a morning window.
        let path = format!(
            "/rest/v1/therapy_sessions?therapist_id=eq.{}&start_time=lte.{}&end_time=gte.{}&status=in.(scheduled,confirmed,in_progress)&order=start_time.asc",
            therapist_id,
            // Percent-encode the RFC 3339 offset: a raw `+` in a query string
            // decodes as a space.
            end_of_day.to_rfc3339().replace('+', "%2B"),
            start_of_day.to_rfc3339().replace('+', "%2B")
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<TherapySession>, _>>()
            .map_err(|e| BookingError::DatabaseError(format!("Failed to parse sessions: {}", e)))
    }

    async fn fetch_credit_balance(
        &self,
        client_id: Uuid,
        auth_token: &str,
    ) -> Result<CreditBalance, BookingError> {
        let path = format!(
            "/rest/v1/client_credits?client_id=eq.{}&select=client_id,balance",
            client_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        let Some(value) = result.into_iter().next() else {
            // No credit row means the client has never purchased credits.
            return Err(BookingError::InsufficientCredits);
        };

        serde_json::from_value(value)
            .map_err(|e| BookingError::DatabaseError(format!("Failed to parse credits: {}", e)))
    }
}

/// The commit function raises on overlap (exclusion constraint) and on an
/// exhausted balance; map those to the same typed errors the advisory checks
/// use so callers cannot tell which side caught it first.
fn map_commit_error(err: anyhow::Error, window: &SessionWindow) -> BookingError {
    let message = err.to_string();
    let lowered = message.to_lowercase();

    if lowered.contains("conflict") || lowered.contains("overlap") || lowered.contains("23p01") {
        return BookingError::Conflict {
            start: window.start,
            end: window.end,
        };
    }
    if lowered.contains("insufficient") && lowered.contains("credit") {
        return BookingError::InsufficientCredits;
    }

    BookingError::DatabaseError(message)
}
