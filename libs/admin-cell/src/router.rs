use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use auth_cell::{middleware::protect, AppState};
use shared_models::auth::Role;

use crate::handlers;

const ADMIN: &[Role] = &[Role::Admin];

pub fn admin_routes(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/doctors", post(handlers::create_doctor).get(handlers::list_doctors))
        .route("/doctors/{id}", delete(handlers::delete_doctor))
        .route(
            "/secretaries",
            post(handlers::create_secretary).get(handlers::list_secretaries),
        )
        .route("/secretaries/{id}", delete(handlers::delete_secretary))
        .route("/audit", get(handlers::list_audit_entries));

    protect(routes, &state, ADMIN).with_state(state)
}
