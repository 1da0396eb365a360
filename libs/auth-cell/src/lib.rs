pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;
pub mod state;
pub mod test_support;

pub use middleware::{auth_middleware, require_roles};
pub use services::{AuthSession, AuthorizationError, RoleGate, SessionError};
pub use state::AppState;
