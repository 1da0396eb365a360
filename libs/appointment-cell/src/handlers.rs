// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use tracing::debug;

use auth_cell::{AppState, AuthorizationError};
use shared_models::{
    appointment::AppointmentId,
    auth::{Identity, Role},
    error::AppError,
};
use shared_utils::extractor::{JsonBody, PathParam, QueryParams};

use crate::models::{
    parse_date_filter, parse_status_filter, AppointmentRequest, AppointmentSearchQuery, AssignDoctorRequest,
    CancelActor, EditAppointmentRequest, ScheduleAppointmentRequest, StatusQuery,
};
use crate::services::{AppointmentQueries, AppointmentWorkflow};

// ==============================================================================
// PATIENT & DOCTOR HANDLERS
// ==============================================================================

pub async fn request_appointment(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    JsonBody(request): JsonBody<AppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = AppointmentWorkflow::new(&state)
        .request_appointment(identity.account_id, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Appointment request sent, a secretary will follow up",
            "data": appointment
        })),
    ))
}

/// Own appointments: a patient's bookings or a doctor's assignments.
pub async fn list_my_appointments(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    QueryParams(query): QueryParams<StatusQuery>,
) -> Result<Json<Value>, AppError> {
    let status = parse_status_filter(query.statut.as_deref())?;
    let queries = AppointmentQueries::new(&state);

    let appointments = match identity.role {
        Role::Patient => queries.for_patient(identity.account_id, status).await?,
        Role::Doctor => queries.for_doctor(identity.account_id, status).await?,
        Role::Admin | Role::Secretary => {
            return Err(AuthorizationError::Forbidden(identity.role).into());
        }
    };

    Ok(Json(json!({
        "success": true,
        "count": appointments.len(),
        "data": appointments
    })))
}

pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    PathParam(id): PathParam<AppointmentId>,
) -> Result<Json<Value>, AppError> {
    let actor = CancelActor::try_from(&identity)?;
    let appointment = AppointmentWorkflow::new(&state).cancel(actor, id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment cancelled",
        "data": appointment
    })))
}

// ==============================================================================
// SECRETARY HANDLERS
// ==============================================================================

pub async fn list_pending_requests(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let requests = AppointmentQueries::new(&state).pending_requests().await?;

    Ok(Json(json!({
        "success": true,
        "count": requests.len(),
        "data": requests
    })))
}

pub async fn search_appointments(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<AppointmentSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let status = parse_status_filter(query.statut.as_deref())?;
    let date = parse_date_filter(query.date.as_deref())?;
    debug!("Searching appointments (status: {:?}, date: {:?})", status, date);

    let appointments = AppointmentQueries::new(&state).search(status, date).await?;

    Ok(Json(json!({
        "success": true,
        "count": appointments.len(),
        "data": appointments
    })))
}

pub async fn schedule_appointment(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<ScheduleAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = AppointmentWorkflow::new(&state).schedule_direct(request).await?;
    let details = AppointmentQueries::new(&state).details(appointment).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Appointment scheduled",
            "data": details
        })),
    ))
}

pub async fn assign_doctor(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<AppointmentId>,
    JsonBody(request): JsonBody<AssignDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentWorkflow::new(&state).assign_doctor(id, request).await?;
    let details = AppointmentQueries::new(&state).details(appointment).await?;

    let message = match &details.doctor {
        Some(doctor) => format!("Appointment assigned to Dr. {}", doctor.last_name),
        None => "Appointment assigned".to_string(),
    };

    Ok(Json(json!({
        "success": true,
        "message": message,
        "data": details
    })))
}

pub async fn edit_appointment(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    PathParam(id): PathParam<AppointmentId>,
    JsonBody(request): JsonBody<EditAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentWorkflow::new(&state)
        .edit(identity.account_id, id, request)
        .await?;
    let details = AppointmentQueries::new(&state).details(appointment).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment updated",
        "data": details
    })))
}

pub async fn get_statistics(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let stats = AppointmentQueries::new(&state).statistics().await?;

    Ok(Json(json!({
        "success": true,
        "data": stats
    })))
}
