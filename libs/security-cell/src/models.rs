// =====================================================================================
// SECURITY CELL MODELS
// =====================================================================================

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::{account::AccountId, auth::Role, error::AppError};

// =====================================================================================
// AUDIT MODELS
// =====================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // Authentication
    LoginSuccess,
    LoginFailure,
    LogoutEvent,
    AdminBootstrapped,
    PatientRegistered,
    AccessDenied,

    // Administrative
    StaffCreated,
    StaffDeleted,

    // Clinical
    AppointmentEdited,
    AppointmentCancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure,
    Denied,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventType,
    pub actor_role: Option<Role>,
    pub actor_id: Option<AccountId>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub action: String,
    pub outcome: AuditOutcome,
    pub additional_data: HashMap<String, serde_json::Value>,
}

impl AuditEntry {
    pub fn new(event_type: AuditEventType, action: impl Into<String>, outcome: AuditOutcome) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            actor_role: None,
            actor_id: None,
            resource_type: None,
            resource_id: None,
            action: action.into(),
            outcome,
            additional_data: HashMap::new(),
        }
    }

    pub fn actor(mut self, role: Role, id: AccountId) -> Self {
        self.actor_role = Some(role);
        self.actor_id = Some(id);
        self
    }

    pub fn resource(mut self, resource_type: &str, resource_id: impl ToString) -> Self {
        self.resource_type = Some(resource_type.to_string());
        self.resource_id = Some(resource_id.to_string());
        self
    }

    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.additional_data.insert(key.to_string(), value);
        self
    }
}

// =====================================================================================
// ERRORS
// =====================================================================================

#[derive(Error, Debug)]
pub enum SecurityError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Stored password hash is invalid: {0}")]
    InvalidHash(String),
}

impl From<SecurityError> for AppError {
    fn from(err: SecurityError) -> Self {
        AppError::Internal(err.to_string())
    }
}
