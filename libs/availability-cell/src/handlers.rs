use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::SlotFilterMode;
use crate::services::availability::AvailabilityService;

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
    pub mode: Option<SlotFilterMode>,
}

#[derive(Debug, Deserialize)]
pub struct SlotsRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub mode: Option<SlotFilterMode>,
}

/// Public endpoint: a client browsing a therapist's calendar does not need an
/// account, so these reads go through the anon key.
#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Path(therapist_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);
    let mode = query.mode.unwrap_or_default();

    let slots = service
        .get_available_slots(therapist_id, query.date, mode, None)
        .await
        .map_err(AppError::from)?;

    let total = slots.len();
    Ok(Json(json!({
        "therapist_id": therapist_id,
        "date": query.date,
        "slots": slots,
        "total": total
    })))
}

#[axum::debug_handler]
pub async fn get_available_slots_range(
    State(state): State<Arc<AppConfig>>,
    Path(therapist_id): Path<Uuid>,
    Query(query): Query<SlotsRangeQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);
    let mode = query.mode.unwrap_or_default();

    let slots = service
        .get_available_slots_in_range(therapist_id, query.from, query.to, mode, None)
        .await
        .map_err(AppError::from)?;

    let total = slots.len();
    Ok(Json(json!({
        "therapist_id": therapist_id,
        "from": query.from,
        "to": query.to,
        "slots": slots,
        "total": total
    })))
}
