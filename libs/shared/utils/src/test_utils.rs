use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use shared_config::{AppConfig, Environment};
use shared_models::{
    account::AccountId,
    auth::{Identity, JwtClaims, Role},
};

use crate::jwt::sign_token;

pub struct TestConfig {
    pub jwt_secret: String,
    pub environment: Environment,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            environment: Environment::Production,
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            jwt_secret: self.jwt_secret.clone(),
            redis_url: None,
            server_port: 0,
            environment: self.environment,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: AccountId,
    pub email: String,
    pub role: Role,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::patient(1, "patient@example.com")
    }
}

impl TestUser {
    pub fn new(id: AccountId, email: &str, role: Role) -> Self {
        Self {
            id,
            email: email.to_string(),
            role,
        }
    }

    pub fn admin(id: AccountId, email: &str) -> Self {
        Self::new(id, email, Role::Admin)
    }

    pub fn patient(id: AccountId, email: &str) -> Self {
        Self::new(id, email, Role::Patient)
    }

    pub fn doctor(id: AccountId, email: &str) -> Self {
        Self::new(id, email, Role::Doctor)
    }

    pub fn secretary(id: AccountId, email: &str) -> Self {
        Self::new(id, email, Role::Secretary)
    }

    pub fn to_identity(&self) -> Identity {
        Identity {
            account_id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Builds credentials outside of any session registry, for codec and middleware tests.
pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn claims(user: &TestUser, exp_hours: i64) -> JwtClaims {
        let now = Utc::now();
        JwtClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(exp_hours)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        sign_token(&Self::claims(user, exp_hours.unwrap_or(24)), secret)
            .expect("test secret must not be empty")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}
