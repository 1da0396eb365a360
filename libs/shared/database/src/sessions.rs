use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use shared_models::auth::SessionKey;

use crate::store::StoreError;

/// Account → currently live credential. At most one token per key; every
/// operation is atomic with respect to the others for the same key.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Replaces any previous token for `key`.
    async fn store(&self, key: SessionKey, token: &str, expires_at: DateTime<Utc>) -> Result<(), StoreError>;

    /// True only if `token` is byte-for-byte the live token for `key`.
    async fn is_live(&self, key: SessionKey, token: &str) -> Result<bool, StoreError>;

    /// Removing an absent session is not an error.
    async fn remove(&self, key: SessionKey) -> Result<(), StoreError>;

    /// Removes the session only while `token` is still the live one for `key`.
    async fn remove_if(&self, key: SessionKey, token: &str) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone)]
struct LiveSession {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct InMemorySessionRegistry {
    sessions: RwLock<HashMap<SessionKey, LiveSession>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn live_count(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|session| session.expires_at > now)
            .count()
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn store(&self, key: SessionKey, token: &str, expires_at: DateTime<Utc>) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, session| session.expires_at > now);
        sessions.insert(
            key,
            LiveSession {
                token: token.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn is_live(&self, key: SessionKey, token: &str) -> Result<bool, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&key)
            .is_some_and(|session| session.token == token && session.expires_at > Utc::now()))
    }

    async fn remove(&self, key: SessionKey) -> Result<(), StoreError> {
        self.sessions.write().await.remove(&key);
        Ok(())
    }

    async fn remove_if(&self, key: SessionKey, token: &str) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.write().await;
        if sessions.get(&key).is_some_and(|session| session.token == token) {
            sessions.remove(&key);
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use shared_models::auth::Role;

    #[tokio::test]
    async fn newer_token_displaces_older() {
        let registry = InMemorySessionRegistry::new();
        let key = SessionKey::new(Role::Patient, 1);
        let expires = Utc::now() + Duration::hours(24);

        registry.store(key, "first", expires).await.unwrap();
        registry.store(key, "second", expires).await.unwrap();

        assert!(!registry.is_live(key, "first").await.unwrap());
        assert!(registry.is_live(key, "second").await.unwrap());
        assert_eq!(registry.live_count().await, 1);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let registry = InMemorySessionRegistry::new();
        let key = SessionKey::new(Role::Doctor, 3);
        registry.store(key, "token", Utc::now() + Duration::hours(1)).await.unwrap();

        registry.remove(key).await.unwrap();
        registry.remove(key).await.unwrap();
        assert!(!registry.is_live(key, "token").await.unwrap());
    }

    #[tokio::test]
    async fn remove_if_spares_newer_session() {
        let registry = InMemorySessionRegistry::new();
        let key = SessionKey::new(Role::Patient, 1);
        let expires = Utc::now() + Duration::hours(1);
        registry.store(key, "old", expires).await.unwrap();
        registry.store(key, "new", expires).await.unwrap();

        assert!(!registry.remove_if(key, "old").await.unwrap());
        assert!(registry.is_live(key, "new").await.unwrap());
        assert!(registry.remove_if(key, "new").await.unwrap());
        assert!(!registry.is_live(key, "new").await.unwrap());
    }

    #[tokio::test]
    async fn expired_entries_are_not_live() {
        let registry = InMemorySessionRegistry::new();
        let key = SessionKey::new(Role::Secretary, 2);
        registry.store(key, "token", Utc::now() - Duration::seconds(1)).await.unwrap();

        assert!(!registry.is_live(key, "token").await.unwrap());
        assert_eq!(registry.live_count().await, 0);
    }

    #[tokio::test]
    async fn keys_are_role_scoped() {
        let registry = InMemorySessionRegistry::new();
        let expires = Utc::now() + Duration::hours(1);
        registry.store(SessionKey::new(Role::Patient, 1), "patient-token", expires).await.unwrap();
        registry.store(SessionKey::new(Role::Doctor, 1), "doctor-token", expires).await.unwrap();

        assert!(registry.is_live(SessionKey::new(Role::Patient, 1), "patient-token").await.unwrap());
        assert!(registry.is_live(SessionKey::new(Role::Doctor, 1), "doctor-token").await.unwrap());
    }
}
