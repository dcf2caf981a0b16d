use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn availability_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/{therapist_id}/slots", get(handlers::get_available_slots))
        .route(
            "/{therapist_id}/slots/range",
            get(handlers::get_available_slots_range),
        )
        .with_state(state)
}
