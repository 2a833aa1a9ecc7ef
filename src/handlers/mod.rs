pub mod appointments;
pub mod assistant;
pub mod calendar;
pub mod health;

use std::sync::{Arc, MutexGuard};

use axum::http::HeaderMap;
use axum::routing::{get, post, put};
use axum::Router;
use rusqlite::Connection;

use crate::errors::AppError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/assistant/command", post(assistant::submit_command))
        .route("/api/assistant/conversation", get(assistant::get_conversation))
        .route("/api/assistant/status", get(assistant::get_status))
        .route("/api/assistant/events", get(assistant::events_stream))
        .route(
            "/api/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/api/appointments/:id",
            put(appointments::update_appointment).delete(appointments::delete_appointment),
        )
        .route("/calendar/feed.ics", get(calendar::calendar_feed))
        .route("/calendar/:appointment_id", get(calendar::download_ics))
        .with_state(state)
}

/// Bearer-token check shared by the `/api` routes.
pub(crate) fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

pub(crate) fn lock_db(state: &AppState) -> Result<MutexGuard<'_, Connection>, AppError> {
    state
        .db
        .lock()
        .map_err(|_| AppError::Store("database lock poisoned".to_string()))
}
