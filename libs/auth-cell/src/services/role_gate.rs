use thiserror::Error;

use shared_models::{
    auth::{Identity, Role},
    error::AppError,
};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Access denied for role {0}")]
    Forbidden(Role),
}

impl From<AuthorizationError> for AppError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::Unauthenticated => AppError::Auth(err.to_string()),
            AuthorizationError::Forbidden(_) => AppError::Forbidden(err.to_string()),
        }
    }
}

/// Role-set authorization. No hierarchy: a role is allowed only if it is listed.
pub struct RoleGate;

impl RoleGate {
    pub fn authorize(identity: Option<&Identity>, allowed: &[Role]) -> Result<(), AuthorizationError> {
        let identity = identity.ok_or(AuthorizationError::Unauthenticated)?;

        if allowed.iter().any(|role| Self::same_role(*role, identity.role)) {
            Ok(())
        } else {
            Err(AuthorizationError::Forbidden(identity.role))
        }
    }

    fn same_role(allowed: Role, actual: Role) -> bool {
        match (allowed, actual) {
            (Role::Admin, Role::Admin)
            | (Role::Patient, Role::Patient)
            | (Role::Doctor, Role::Doctor)
            | (Role::Secretary, Role::Secretary) => true,
            (Role::Admin | Role::Patient | Role::Doctor | Role::Secretary, _) => false,
        }
    }
}
