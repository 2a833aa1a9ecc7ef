use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::{check_auth, lock_db};
use crate::models::{validate_appointment, Appointment, AppointmentChanges, NewAppointment};
use crate::state::AppState;

// GET /api/appointments
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Appointment>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let appointments = {
        let db = lock_db(&state)?;
        queries::list_appointments(&db)?
    };

    Ok(Json(appointments))
}

// POST /api/appointments
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<NewAppointment>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let fields = NewAppointment {
        title: body.title.trim().to_string(),
        description: body
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        ..body
    };
    fields
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let appointment = Appointment::from_new(fields, Utc::now().naive_utc());
    {
        let db = lock_db(&state)?;
        queries::create_appointment(&db, &appointment)?;
    }

    tracing::info!(id = %appointment.id, title = %appointment.title, "appointment created");
    Ok((StatusCode::CREATED, Json(appointment)))
}

// PUT /api/appointments/:id
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut changes): Json<AppointmentChanges>,
) -> Result<Json<Appointment>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if let Some(title) = changes.title.as_mut() {
        *title = title.trim().to_string();
    }

    let db = lock_db(&state)?;
    let mut merged = queries::get_appointment_by_id(&db, &id)?
        .ok_or_else(|| AppError::NotFound(format!("appointment {id}")))?;

    // Validate the record as it would be stored, not just the patch
    changes.apply_to(&mut merged);
    validate_appointment(&merged).map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = queries::update_appointment(&db, &id, &changes)?
        .ok_or_else(|| AppError::NotFound(format!("appointment {id}")))?;

    tracing::info!(id = %id, "appointment updated");
    Ok(Json(updated))
}

// DELETE /api/appointments/:id
pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let removed = {
        let db = lock_db(&state)?;
        queries::delete_appointment(&db, &id)?
    };
    if !removed {
        return Err(AppError::NotFound(format!("appointment {id}")));
    }

    tracing::info!(id = %id, "appointment deleted");
    Ok(Json(serde_json::json!({ "ok": true })))
}
