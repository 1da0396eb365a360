use std::sync::Arc;

use axum::{routing::post, Router};

use crate::handlers;
use crate::state::AppState;

/// Logout authenticates itself: it accepts an already-ended session so
/// repeating it stays successful.
pub fn auth_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/admin", post(handlers::register_admin))
        .route("/patient", post(handlers::register_patient))
        .route("/{role}/login", post(handlers::login))
        .route("/{role}/logout", post(handlers::logout))
        .with_state(state)
}
