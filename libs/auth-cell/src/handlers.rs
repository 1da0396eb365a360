use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_models::{auth::Role, error::AppError};
use shared_utils::extractor::{bearer_token, JsonBody, PathParam};

use crate::models::{LoginRequest, RegisterAccountRequest};
use crate::services::AccountService;
use crate::state::AppState;

pub async fn register_admin(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<RegisterAccountRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let account = AccountService::create_account(&state, Role::Admin, request, None).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Administrator account created",
            "data": account
        })),
    ))
}

pub async fn register_patient(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<RegisterAccountRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let account = AccountService::create_account(&state, Role::Patient, request, None).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Patient account created",
            "data": account
        })),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    PathParam(role): PathParam<String>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let role: Role = role.parse()?;
    debug!("Login attempt for role {}", role);

    let response = AccountService::login(&state, role, request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "data": response
    })))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    PathParam(role): PathParam<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let role: Role = role.parse()?;
    let token = bearer_token(&headers)?;

    AccountService::logout(&state, role, &token).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Logged out"
    })))
}
