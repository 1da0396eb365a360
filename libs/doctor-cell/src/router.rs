use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use auth_cell::{middleware::protect, AppState};
use shared_models::auth::Role;

use crate::handlers;

const DOCTOR: &[Role] = &[Role::Doctor];
const PATIENT_OR_SECRETARY: &[Role] = &[Role::Patient, Role::Secretary];

pub fn doctor_routes(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/appointments/{id}/accept", put(handlers::accept_appointment))
        .route("/appointments/{id}/refuse", put(handlers::refuse_appointment))
        .route("/availability", put(handlers::update_availability))
        .route("/calendar", get(handlers::get_calendar));

    protect(routes, &state, DOCTOR).with_state(state)
}

pub fn directory_routes(state: Arc<AppState>) -> Router {
    let routes = Router::new().route("/", get(handlers::list_doctors));

    protect(routes, &state, PATIENT_OR_SECRETARY).with_state(state)
}
