// =====================================================================================
// AUDIT SERVICE - STRUCTURED AUDIT TRAIL
// =====================================================================================

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::models::{AuditEntry, AuditEventType, AuditOutcome};
use shared_models::{account::AccountId, auth::Role};

const DEFAULT_CAPACITY: usize = 1_000;

/// Every entry goes to tracing; the most recent ones are also kept in memory
/// so administrators can read them back.
pub struct AuditService {
    audit_buffer: Arc<RwLock<VecDeque<AuditEntry>>>,
    capacity: usize,
}

impl Default for AuditService {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditService {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            audit_buffer: Arc::new(RwLock::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)))),
            capacity: capacity.max(1),
        }
    }

    #[instrument(skip(self, entry))]
    pub async fn log_audit_entry(&self, entry: AuditEntry) {
        Self::log_to_tracing(&entry);

        let mut buffer = self.audit_buffer.write().await;
        if buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(entry);
    }

    fn log_to_tracing(entry: &AuditEntry) {
        match entry.outcome {
            AuditOutcome::Success => {
                info!(
                    event_id = %entry.event_id,
                    event_type = ?entry.event_type,
                    actor_role = ?entry.actor_role,
                    actor_id = ?entry.actor_id,
                    resource_id = ?entry.resource_id,
                    "AUDIT: {}", entry.action
                );
            }
            AuditOutcome::Failure | AuditOutcome::Denied => {
                warn!(
                    event_id = %entry.event_id,
                    event_type = ?entry.event_type,
                    actor_role = ?entry.actor_role,
                    actor_id = ?entry.actor_id,
                    outcome = ?entry.outcome,
                    "AUDIT FAILURE: {}", entry.action
                );
            }
        }
    }

    /// Newest first, optionally restricted to one event type.
    pub async fn recent_entries(
        &self,
        event_type: Option<AuditEventType>,
        limit: usize,
    ) -> Vec<AuditEntry> {
        let buffer = self.audit_buffer.read().await;
        buffer
            .iter()
            .rev()
            .filter(|entry| event_type.map_or(true, |wanted| entry.event_type == wanted))
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn log_successful_authentication(&self, role: Role, account_id: AccountId) {
        let entry = AuditEntry::new(
            AuditEventType::LoginSuccess,
            "Successful authentication",
            AuditOutcome::Success,
        )
        .actor(role, account_id);

        self.log_audit_entry(entry).await
    }

    pub async fn log_failed_authentication(&self, role: Role, email: &str, reason: &str) {
        let entry = AuditEntry::new(
            AuditEventType::LoginFailure,
            format!("Failed login attempt: {}", reason),
            AuditOutcome::Failure,
        )
        .with_data("role", json!(role))
        .with_data("email", json!(email));

        self.log_audit_entry(entry).await
    }

    pub async fn log_logout(&self, role: Role, account_id: AccountId) {
        let entry = AuditEntry::new(AuditEventType::LogoutEvent, "Session revoked", AuditOutcome::Success)
            .actor(role, account_id);

        self.log_audit_entry(entry).await
    }

    pub async fn log_access_denied(&self, role: Role, account_id: AccountId, attempted: &str) {
        let entry = AuditEntry::new(
            AuditEventType::AccessDenied,
            format!("Denied: {}", attempted),
            AuditOutcome::Denied,
        )
        .actor(role, account_id);

        self.log_audit_entry(entry).await
    }

    pub async fn log_account_created(
        &self,
        event_type: AuditEventType,
        actor: Option<(Role, AccountId)>,
        created_role: Role,
        created_id: AccountId,
    ) {
        let mut entry = AuditEntry::new(
            event_type,
            format!("Created {} account", created_role),
            AuditOutcome::Success,
        )
        .resource(created_role.as_str(), created_id);
        if let Some((role, id)) = actor {
            entry = entry.actor(role, id);
        }

        self.log_audit_entry(entry).await
    }

    pub async fn log_staff_deleted(
        &self,
        admin_id: AccountId,
        deleted_role: Role,
        deleted_id: AccountId,
        released_appointments: usize,
    ) {
        let entry = AuditEntry::new(
            AuditEventType::StaffDeleted,
            format!("Deleted {} account", deleted_role),
            AuditOutcome::Success,
        )
        .actor(Role::Admin, admin_id)
        .resource(deleted_role.as_str(), deleted_id)
        .with_data("released_appointments", json!(released_appointments));

        self.log_audit_entry(entry).await
    }

    pub async fn log_appointment_change(
        &self,
        event_type: AuditEventType,
        actor: (Role, AccountId),
        appointment_id: i64,
        details: serde_json::Value,
    ) {
        let action = match event_type {
            AuditEventType::AppointmentCancelled => "Appointment cancelled",
            _ => "Appointment edited",
        };
        let entry = AuditEntry::new(event_type, action, AuditOutcome::Success)
            .actor(actor.0, actor.1)
            .resource("appointment", appointment_id)
            .with_data("changes", details);

        self.log_audit_entry(entry).await
    }
}
