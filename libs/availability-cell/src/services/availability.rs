// libs/availability-cell/src/services/availability.rs
//
// Collaborator layer around the pure slot pipeline: fetches schedule,
// override and session snapshots from Supabase, then runs
// generate -> apply override -> filter conflicts for the requested date(s).

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    AvailabilityError, AvailabilityOverride, AvailabilityTemplateRow, CandidateSlot,
    SessionSettings, SlotFilterMode, TherapySession, WeeklyAvailabilityRow, WeeklySchedule,
};
use crate::services::{conflicts, generator, overrides};

/// Longest allowed range query, in days.
const MAX_RANGE_DAYS: i64 = 62;

pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Compute the candidate slots for a therapist on one date.
    pub async fn get_available_slots(
        &self,
        therapist_id: Uuid,
        date: NaiveDate,
        mode: SlotFilterMode,
        auth_token: Option<&str>,
    ) -> Result<Vec<CandidateSlot>, AvailabilityError> {
        debug!("Calculating available slots for therapist {} on {}", therapist_id, date);

        let slots = self
            .slots_for_date(therapist_id, date, mode, auth_token)
            .await
            .map_err(storage_error)?;

        debug!("Found {} slots for therapist {} on {}", slots.len(), therapist_id, date);
        Ok(slots)
    }

    /// Compute candidate slots for every date in `[from, to]`, ordered by date
    /// then start time.
    pub async fn get_available_slots_in_range(
        &self,
        therapist_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        mode: SlotFilterMode,
        auth_token: Option<&str>,
    ) -> Result<Vec<CandidateSlot>, AvailabilityError> {
        if to < from {
            return Err(AvailabilityError::InvalidRange(format!(
                "Range end {} is before range start {}",
                to, from
            )));
        }
        let span = (to - from).num_days();
        if span > MAX_RANGE_DAYS {
            return Err(AvailabilityError::InvalidRange(format!(
                "Range of {} days exceeds the {} day maximum",
                span, MAX_RANGE_DAYS
            )));
        }

        self.slots_for_range(therapist_id, from, to, mode, auth_token)
            .await
            .map_err(storage_error)
    }

    // Private helper methods

    async fn slots_for_date(
        &self,
        therapist_id: Uuid,
        date: NaiveDate,
        mode: SlotFilterMode,
        auth_token: Option<&str>,
    ) -> Result<Vec<CandidateSlot>> {
        let schedule = self.fetch_weekly_schedule(therapist_id, auth_token).await?;
        let settings = self.fetch_session_settings(therapist_id, auth_token).await?;
        let override_entry = self.fetch_override_for_date(therapist_id, date, auth_token).await?;
        let sessions = self.fetch_sessions_for_date(therapist_id, date, auth_token).await?;

        Ok(compute_slots(&schedule, &settings, override_entry.as_ref(), &sessions, date, mode))
    }

    async fn slots_for_range(
        &self,
        therapist_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        mode: SlotFilterMode,
        auth_token: Option<&str>,
    ) -> Result<Vec<CandidateSlot>> {
        let schedule = self.fetch_weekly_schedule(therapist_id, auth_token).await?;
        let settings = self.fetch_session_settings(therapist_id, auth_token).await?;
        let override_entries = self
            .fetch_overrides_in_range(therapist_id, from, to, auth_token)
            .await?;
        let sessions = self
            .fetch_sessions_in_range(therapist_id, from, to, auth_token)
            .await?;

        let mut slots = Vec::new();
        let mut date = from;
        while date <= to {
            let override_entry = override_entries.iter().find(|o| o.override_date == date);
            slots.extend(compute_slots(
                &schedule,
                &settings,
                override_entry,
                &sessions,
                date,
                mode,
            ));
            date += Duration::days(1);
        }

        Ok(slots)
    }

    /// Load the weekly schedule, preferring current-format per-day rows and
    /// falling back to the legacy JSON template.
    async fn fetch_weekly_schedule(
        &self,
        therapist_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<WeeklySchedule> {
        let path = format!(
            "/rest/v1/therapist_weekly_availability?therapist_id=eq.{}&order=day_of_week.asc",
            therapist_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        let rows: Vec<WeeklyAvailabilityRow> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<WeeklyAvailabilityRow>, _>>()?;

        if !rows.is_empty() {
            return Ok(crate::services::normalize::from_weekly_rows(&rows));
        }

        debug!(
            "No weekly availability rows for therapist {}, checking legacy template",
            therapist_id
        );

        let path = format!(
            "/rest/v1/availability_templates?therapist_id=eq.{}",
            therapist_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        match result.into_iter().next() {
            Some(value) => {
                let row: AvailabilityTemplateRow = serde_json::from_value(value)?;
                Ok(crate::services::normalize::from_template(&row.schedule))
            }
            None => {
                warn!("Therapist {} has no availability schedule", therapist_id);
                Ok(WeeklySchedule::new())
            }
        }
    }

    async fn fetch_session_settings(
        &self,
        therapist_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<SessionSettings> {
        let path = format!(
            "/rest/v1/session_settings?therapist_id=eq.{}&select=session_duration_minutes",
            therapist_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        match result.into_iter().next() {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(SessionSettings::default()),
        }
    }

    async fn fetch_override_for_date(
        &self,
        therapist_id: Uuid,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Option<AvailabilityOverride>> {
        let entries = self
            .fetch_overrides_in_range(therapist_id, date, date, auth_token)
            .await?;
        Ok(entries.into_iter().next())
    }

    async fn fetch_overrides_in_range(
        &self,
        therapist_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Vec<AvailabilityOverride>> {
        // Inactive overrides are filtered here and ignored again by the
        // resolver, so a stale row can never block a date.
        let path = format!(
            "/rest/v1/availability_overrides?therapist_id=eq.{}&override_date=gte.{}&override_date=lte.{}&is_active=eq.true&order=override_date.asc",
            therapist_id, from, to
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        let entries: Vec<AvailabilityOverride> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<AvailabilityOverride>, _>>()?;

        Ok(entries)
    }

    async fn fetch_sessions_for_date(
        &self,
        therapist_id: Uuid,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Vec<TherapySession>> {
        self.fetch_sessions_in_range(therapist_id, date, date, auth_token)
            .await
    }

    async fn fetch_sessions_in_range(
        &self,
        therapist_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Vec<TherapySession>> {
        let range_start = from.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let range_end = to.and_hms_opt(23, 59, 59).unwrap().and_utc();

        // Overlap query, not a start-bounded one: a session that starts before
        // the range and runs into it still blocks its first slots.
        let path = format!(
            "/rest/v1/therapy_sessions?therapist_id=eq.{}&start_time=lte.{}&end_time=gte.{}&status=in.(scheduled,confirmed,in_progress)&order=start_time.asc",
            therapist_id,
            // Percent-encode the RFC 3339 offset: a raw `+` in a query string
            // decodes as a space.
            range_end.to_rfc3339().replace('+', "%2B"),
            range_start.to_rfc3339().replace('+', "%2B")
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        let sessions: Vec<TherapySession> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<TherapySession>, _>>()?;

        Ok(sessions)
    }
}

fn storage_error(err: anyhow::Error) -> AvailabilityError {
    AvailabilityError::DatabaseError(err.to_string())
}

/// Run the pure pipeline for a single date over pre-fetched snapshots.
fn compute_slots(
    schedule: &WeeklySchedule,
    settings: &SessionSettings,
    override_entry: Option<&AvailabilityOverride>,
    sessions: &[TherapySession],
    date: NaiveDate,
    mode: SlotFilterMode,
) -> Vec<CandidateSlot> {
    let generated = generator::generate(schedule, settings, date);
    let adjusted = overrides::apply(generated, override_entry, settings, date);
    conflicts::filter_slots(adjusted, sessions, mode)
}
