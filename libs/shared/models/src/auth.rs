use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::account::AccountId;

/// The four actor roles. Authorization always matches on this enum
/// exhaustively; unknown role strings never parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Patient,
    #[serde(alias = "docteur")]
    Doctor,
    #[serde(alias = "secretaire")]
    Secretary,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Patient, Role::Doctor, Role::Secretary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Secretary => "secretary",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Role::Admin),
            "patient" => Ok(Role::Patient),
            "doctor" | "docteur" => Ok(Role::Doctor),
            "secretary" | "secretaire" => Ok(Role::Secretary),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Claims carried inside a signed credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: AccountId,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    /// Unique per issuance so two logins in the same second still yield distinct tokens.
    pub jti: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

/// Caller identity resolved from a validated credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub account_id: AccountId,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn session_key(&self) -> SessionKey {
        SessionKey::new(self.role, self.account_id)
    }
}

impl From<JwtClaims> for Identity {
    fn from(claims: JwtClaims) -> Self {
        Self {
            account_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Key of the session registry. Account ids are only unique inside a role
/// partition, so the role is part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub role: Role,
    pub account_id: AccountId,
}

impl SessionKey {
    pub fn new(role: Role, account_id: AccountId) -> Self {
        Self { role, account_id }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role, self.account_id)
    }
}
