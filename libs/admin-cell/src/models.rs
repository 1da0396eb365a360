use serde::{Deserialize, Serialize};
use thiserror::Error;

use security_cell::AuditEventType;
use shared_database::StoreError;
use shared_models::{account::Account, auth::Role, error::AppError};

pub const DEFAULT_AUDIT_LIMIT: usize = 100;
pub const MAX_AUDIT_LIMIT: usize = 1000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub event_type: Option<AuditEventType>,
    pub limit: Option<usize>,
}

impl AuditQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, MAX_AUDIT_LIMIT)
    }
}

/// Result of removing a doctor or secretary.
#[derive(Debug, Clone, Serialize)]
pub struct StaffDeletion {
    #[serde(rename = "compte")]
    pub account: Account,
    /// Appointments handed back to the secretaries' queue.
    #[serde(rename = "rendez_vous_liberes")]
    pub released_appointments: usize,
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("{0} not found")]
    StaffNotFound(Role),

    #[error("{0} accounts are not managed by the administrator")]
    NotStaff(Role),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::StaffNotFound(_) => AppError::NotFound(err.to_string()),
            AdminError::NotStaff(_) => AppError::Validation(err.to_string()),
            AdminError::Store(store) => store.into(),
        }
    }
}
