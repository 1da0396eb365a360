pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AdminError, AuditQuery, StaffDeletion};
pub use services::StaffService;
