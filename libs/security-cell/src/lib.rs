// =====================================================================================
// SECURITY CELL - PASSWORD HASHING & AUDIT TRAIL
// =====================================================================================

pub mod models;
pub mod services;

pub use models::{AuditEntry, AuditEventType, AuditOutcome, SecurityError};

pub use services::{AuditService, PasswordSecurityService};
