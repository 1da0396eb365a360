use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use auth_cell::{models::RegisterAccountRequest, AppState};
use shared_models::{
    account::AccountId,
    auth::{Identity, Role},
    error::AppError,
};
use shared_utils::extractor::{JsonBody, PathParam, QueryParams};

use crate::models::AuditQuery;
use crate::services::StaffService;

// ==============================================================================
// STAFF HANDLERS
// ==============================================================================

async fn create_staff(
    state: &AppState,
    admin: &Identity,
    role: Role,
    request: RegisterAccountRequest,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let account = StaffService::create(state, admin, role, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": format!("{} account created", role),
            "data": account
        })),
    ))
}

async fn list_staff(state: &AppState, role: Role) -> Result<Json<Value>, AppError> {
    let accounts = StaffService::list(state, role).await?;

    Ok(Json(json!({
        "success": true,
        "count": accounts.len(),
        "data": accounts
    })))
}

async fn delete_staff(
    state: &AppState,
    admin: &Identity,
    role: Role,
    id: AccountId,
) -> Result<Json<Value>, AppError> {
    let deletion = StaffService::delete(state, admin, role, id).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("{} account deleted", role),
        "data": deletion
    })))
}

pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<Identity>,
    JsonBody(request): JsonBody<RegisterAccountRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    create_staff(&state, &admin, Role::Doctor, request).await
}

pub async fn create_secretary(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<Identity>,
    JsonBody(request): JsonBody<RegisterAccountRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    create_staff(&state, &admin, Role::Secretary, request).await
}

pub async fn list_doctors(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    list_staff(&state, Role::Doctor).await
}

pub async fn list_secretaries(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    list_staff(&state, Role::Secretary).await
}

pub async fn delete_doctor(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<Identity>,
    PathParam(id): PathParam<AccountId>,
) -> Result<Json<Value>, AppError> {
    delete_staff(&state, &admin, Role::Doctor, id).await
}

pub async fn delete_secretary(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<Identity>,
    PathParam(id): PathParam<AccountId>,
) -> Result<Json<Value>, AppError> {
    delete_staff(&state, &admin, Role::Secretary, id).await
}

// ==============================================================================
// AUDIT HANDLERS
// ==============================================================================

pub async fn list_audit_entries(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<AuditQuery>,
) -> Result<Json<Value>, AppError> {
    let entries = state.audit.recent_entries(query.event_type, query.limit()).await;

    Ok(Json(json!({
        "success": true,
        "count": entries.len(),
        "data": entries
    })))
}
