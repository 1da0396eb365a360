use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_redis::{Config, Connection, Pool, Runtime};
use tracing::{debug, info};

use shared_models::auth::SessionKey;

use crate::sessions::SessionRegistry;
use crate::store::StoreError;

// Compare-and-delete in one round trip.
const REMOVE_IF_MATCHES: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
"#;

/// Session registry backed by Redis: one `token:{role}:{id}` key per account,
/// written with `SET .. EX` so Redis expires it with the credential.
pub struct RedisSessionRegistry {
    pool: Pool,
}

impl RedisSessionRegistry {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let pool = Config::from_url(redis_url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::Backend(format!("Failed to create Redis pool: {}", e)))?;

        let registry = Self { pool };

        // Test connection
        let mut conn = registry.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!("Redis session registry initialized successfully");

        Ok(registry)
    }

    async fn connection(&self) -> Result<Connection, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to connect to Redis: {}", e)))
    }

    fn redis_key(key: SessionKey) -> String {
        format!("token:{}", key)
    }
}

#[async_trait]
impl SessionRegistry for RedisSessionRegistry {
    async fn store(&self, key: SessionKey, token: &str, expires_at: DateTime<Utc>) -> Result<(), StoreError> {
        let ttl_seconds = (expires_at - Utc::now()).num_seconds().max(1);
        let mut conn = self.connection().await?;

        let _: () = redis::cmd("SET")
            .arg(Self::redis_key(key))
            .arg(token)
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await?;

        debug!("Stored session for {} (ttl {}s)", key, ttl_seconds);
        Ok(())
    }

    async fn is_live(&self, key: SessionKey, token: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        let current: Option<String> = redis::cmd("GET")
            .arg(Self::redis_key(key))
            .query_async(&mut conn)
            .await?;

        Ok(current.as_deref() == Some(token))
    }

    async fn remove(&self, key: SessionKey) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: i64 = redis::cmd("DEL")
            .arg(Self::redis_key(key))
            .query_async(&mut conn)
            .await?;

        debug!("Removed session for {}", key);
        Ok(())
    }

    async fn remove_if(&self, key: SessionKey, token: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        let removed: i64 = redis::Script::new(REMOVE_IF_MATCHES)
            .key(Self::redis_key(key))
            .arg(token)
            .invoke_async(&mut conn)
            .await?;

        Ok(removed == 1)
    }
}
