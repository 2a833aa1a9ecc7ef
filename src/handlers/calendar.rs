use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::lock_db;
use crate::services::calendar::{generate_feed, generate_ics};
use crate::state::AppState;

const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

// GET /calendar/:appointment_id
pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    // Strip .ics suffix if present
    let appointment_id = raw_id.strip_suffix(".ics").unwrap_or(&raw_id);

    let appointment = {
        let db = lock_db(&state)?;
        queries::get_appointment_by_id(&db, appointment_id)?
    }
    .ok_or_else(|| AppError::NotFound(format!("appointment {appointment_id}")))?;

    let ics = generate_ics(&appointment);
    let filename = format!("appointment-{appointment_id}.ics");

    Ok((
        [
            (header::CONTENT_TYPE, CALENDAR_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response())
}

// GET /calendar/feed.ics
pub async fn calendar_feed(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let appointments = {
        let db = lock_db(&state)?;
        queries::list_active_appointments(&db)?
    };

    tracing::debug!(count = appointments.len(), "serving calendar feed");

    Ok((
        [(header::CONTENT_TYPE, CALENDAR_CONTENT_TYPE)],
        generate_feed(&appointments),
    )
        .into_response())
}
