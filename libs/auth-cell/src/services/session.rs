use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{SessionRegistry, StoreError};
use shared_models::{
    account::AccountId,
    auth::{Identity, JwtClaims, Role, SessionKey},
    error::AppError,
};
use shared_utils::jwt::{decode_token, sign_token, TokenError};

pub const CREDENTIAL_LIFETIME_HOURS: i64 = 24;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Signing key is not configured")]
    SigningError,

    #[error("Token expired")]
    ExpiredCredential,

    #[error("Invalid token: {0}")]
    MalformedCredential(&'static str),

    #[error("Session is no longer active")]
    RevokedCredential,

    #[error("Session registry error: {0}")]
    Registry(#[from] StoreError),
}

impl From<TokenError> for SessionError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MissingSecret => SessionError::SigningError,
            TokenError::Expired => SessionError::ExpiredCredential,
            TokenError::Malformed(reason) => SessionError::MalformedCredential(reason),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::SigningError | SessionError::Registry(_) => AppError::Internal(err.to_string()),
            SessionError::ExpiredCredential
            | SessionError::MalformedCredential(_)
            | SessionError::RevokedCredential => AppError::Auth(err.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates signed credentials. A credential is accepted only
/// while it is the live entry in the session registry for its account, so a
/// new login or a logout invalidates earlier tokens before they expire.
#[derive(Clone)]
pub struct AuthSession {
    registry: Arc<dyn SessionRegistry>,
    secret: Arc<str>,
}

impl AuthSession {
    pub fn new(registry: Arc<dyn SessionRegistry>, secret: &str) -> Self {
        Self {
            registry,
            secret: Arc::from(secret),
        }
    }

    pub async fn issue(
        &self,
        account_id: AccountId,
        email: &str,
        role: Role,
    ) -> Result<IssuedCredential, SessionError> {
        let issued_at = Utc::now();
        let expires_at = issued_at + Duration::hours(CREDENTIAL_LIFETIME_HOURS);

        let claims = JwtClaims {
            sub: account_id,
            email: email.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = sign_token(&claims, &self.secret)?;

        let key = SessionKey::new(role, account_id);
        self.registry.store(key, &token, expires_at).await?;
        info!("Issued credential for {}", key);

        Ok(IssuedCredential { token, expires_at })
    }

    /// Signature and expiry only; says nothing about whether the session is live.
    pub fn decode(&self, token: &str) -> Result<Identity, SessionError> {
        Ok(Identity::from(decode_token(token, &self.secret)?))
    }

    pub async fn validate(&self, token: &str) -> Result<Identity, SessionError> {
        let identity = self.decode(token)?;

        if !self.registry.is_live(identity.session_key(), token).await? {
            debug!("Rejected superseded or revoked credential for {}", identity.session_key());
            return Err(SessionError::RevokedCredential);
        }

        Ok(identity)
    }

    /// Removes the session only if `token` is still its live credential, so a
    /// stale token never ends a newer login. Returns whether anything was removed.
    pub async fn end_session(&self, identity: &Identity, token: &str) -> Result<bool, SessionError> {
        let removed = self.registry.remove_if(identity.session_key(), token).await?;
        if removed {
            info!("Session ended for {}", identity.session_key());
        } else {
            debug!("Session for {} was already inactive", identity.session_key());
        }
        Ok(removed)
    }

    pub async fn revoke(&self, key: SessionKey) -> Result<(), SessionError> {
        self.registry.remove(key).await?;
        info!("Revoked session for {}", key);
        Ok(())
    }
}
