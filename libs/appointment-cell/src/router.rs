// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use auth_cell::{middleware::protect, AppState};
use shared_models::auth::Role;

use crate::handlers;

const PATIENT: &[Role] = &[Role::Patient];
const PATIENT_OR_DOCTOR: &[Role] = &[Role::Patient, Role::Doctor];
const SECRETARY: &[Role] = &[Role::Secretary];

pub fn appointment_routes(state: Arc<AppState>) -> Router {
    let patient_routes = Router::new()
        .route("/", post(handlers::request_appointment))
        .route("/{id}", delete(handlers::cancel_appointment));

    let shared_routes = Router::new().route("/mine", get(handlers::list_my_appointments));

    Router::new()
        .merge(protect(patient_routes, &state, PATIENT))
        .merge(protect(shared_routes, &state, PATIENT_OR_DOCTOR))
        .with_state(state)
}

pub fn secretary_routes(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/requests", get(handlers::list_pending_requests))
        .route(
            "/appointments",
            get(handlers::search_appointments).post(handlers::schedule_appointment),
        )
        .route(
            "/appointments/{id}",
            put(handlers::edit_appointment).delete(handlers::cancel_appointment),
        )
        .route("/appointments/{id}/assign", put(handlers::assign_doctor))
        .route("/stats", get(handlers::get_statistics));

    protect(routes, &state, SECRETARY).with_state(state)
}
