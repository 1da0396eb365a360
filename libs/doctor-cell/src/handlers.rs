use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use appointment_cell::{models::parse_date_filter, AppointmentQueries, AppointmentWorkflow};
use auth_cell::AppState;
use shared_models::{appointment::AppointmentId, auth::Identity, error::AppError};
use shared_utils::extractor::{JsonBody, PathParam, QueryParams};

use crate::models::{AvailabilityRequest, CalendarQuery};
use crate::services::DoctorService;

// ==============================================================================
// DOCTOR HANDLERS
// ==============================================================================

pub async fn accept_appointment(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    PathParam(id): PathParam<AppointmentId>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentWorkflow::new(&state).accept(identity.account_id, id).await?;
    let details = AppointmentQueries::new(&state).details(appointment).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment accepted",
        "data": details
    })))
}

pub async fn refuse_appointment(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    PathParam(id): PathParam<AppointmentId>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentWorkflow::new(&state).refuse(identity.account_id, id).await?;
    let details = AppointmentQueries::new(&state).details(appointment).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment refused",
        "data": details
    })))
}

pub async fn update_availability(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    JsonBody(request): JsonBody<AvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let availability = request.availability()?;
    let doctor = DoctorService::new(&state)
        .set_availability(identity.account_id, availability)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Availability set to {}", availability),
        "data": doctor
    })))
}

pub async fn get_calendar(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    QueryParams(query): QueryParams<CalendarQuery>,
) -> Result<Json<Value>, AppError> {
    let from = parse_date_filter(query.date_debut.as_deref())?;
    let to = parse_date_filter(query.date_fin.as_deref())?;

    let appointments = DoctorService::new(&state)
        .calendar(identity.account_id, from, to)
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": appointments.len(),
        "data": appointments
    })))
}

// ==============================================================================
// DIRECTORY HANDLERS
// ==============================================================================

/// Doctor directory for patients and secretaries choosing a doctor.
pub async fn list_doctors(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let directory = DoctorService::new(&state).directory().await?;

    Ok(Json(json!({
        "success": true,
        "total": directory.total,
        "libres": directory.libres,
        "occupes": directory.occupes,
        "data": directory.doctors
    })))
}
