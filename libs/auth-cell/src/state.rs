use std::sync::Arc;

use security_cell::AuditService;
use shared_config::AppConfig;
use shared_database::{
    AccountStore, AppointmentStore, InMemoryAccountStore, InMemoryAppointmentStore,
    InMemorySessionRegistry, SessionRegistry,
};

use crate::services::AuthSession;

/// Shared by every cell's router.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: Arc<dyn AccountStore>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub sessions: AuthSession,
    pub audit: Arc<AuditService>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        accounts: Arc<dyn AccountStore>,
        appointments: Arc<dyn AppointmentStore>,
        registry: Arc<dyn SessionRegistry>,
    ) -> Self {
        let sessions = AuthSession::new(registry, &config.jwt_secret);
        Self {
            config,
            accounts,
            appointments,
            sessions,
            audit: Arc::new(AuditService::new()),
        }
    }

    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryAccountStore::new()),
            Arc::new(InMemoryAppointmentStore::new()),
            Arc::new(InMemorySessionRegistry::new()),
        )
    }
}
