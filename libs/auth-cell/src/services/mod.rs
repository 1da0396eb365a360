pub mod accounts;
pub mod role_gate;
pub mod session;

pub use accounts::AccountService;
pub use role_gate::{AuthorizationError, RoleGate};
pub use session::{AuthSession, IssuedCredential, SessionError, CREDENTIAL_LIFETIME_HOURS};
