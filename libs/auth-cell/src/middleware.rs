use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};

use shared_models::{
    auth::{Identity, Role},
    error::AppError,
};
use shared_utils::extractor::bearer_token;

use crate::services::RoleGate;
use crate::state::AppState;

/// Resolves the bearer credential into an `Identity` request extension.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;
    let identity = state.sessions.validate(&token).await?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Must run after `auth_middleware`.
pub async fn require_roles(
    State(allowed): State<&'static [Role]>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    RoleGate::authorize(request.extensions().get::<Identity>(), allowed)?;
    Ok(next.run(request).await)
}

/// Wraps `router` so every route requires a live session with one of `roles`.
pub fn protect(
    router: Router<Arc<AppState>>,
    state: &Arc<AppState>,
    roles: &'static [Role],
) -> Router<Arc<AppState>> {
    // Layers added last run first: authentication, then the role check.
    router
        .layer(middleware::from_fn_with_state(roles, require_roles))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}
