use std::sync::Arc;

use axum::{extract::State, Json};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::BookSessionRequest;
use crate::services::booking::BookingService;

/// Dry-run the pre-commit checks without booking anything.
#[axum::debug_handler]
pub async fn validate_booking(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(payload): Json<BookSessionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let request = payload.booking_request();

    let window = service
        .validate_booking(&request, payload.client_id, Utc::now(), auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "valid": true,
        "session_start": window.start,
        "session_end": window.end
    })))
}

#[axum::debug_handler]
pub async fn book_session(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(payload): Json<BookSessionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let request = payload.booking_request();

    let session = service
        .book_session(&request, payload.client_id, Utc::now(), auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "session": session
    })))
}
