use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use shared_models::{
    account::{Account, AccountProfile, Availability, NewAccount},
    auth::Role,
    error::AppError,
};
use shared_utils::validation::{normalize_email, optional_text, require_text, validate_password};

/// Registration body shared by every role; role-specific fields are ignored
/// for roles that do not carry them.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterAccountRequest {
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    pub email: String,
    #[serde(rename = "mot_de_passe")]
    pub password: String,
    #[serde(rename = "telephone", default)]
    pub phone: Option<String>,
    #[serde(rename = "date_naissance", default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(rename = "specialite", default)]
    pub specialty: Option<String>,
}

impl RegisterAccountRequest {
    /// Checks and normalizes the input. The password stays in clear text until hashed.
    pub fn validated(self) -> Result<Self, AppError> {
        validate_password(&self.password)?;
        Ok(Self {
            last_name: require_text("nom", &self.last_name)?,
            first_name: require_text("prenom", &self.first_name)?,
            email: normalize_email(&self.email)?,
            password: self.password,
            phone: optional_text(self.phone),
            birth_date: self.birth_date,
            specialty: optional_text(self.specialty),
        })
    }

    pub fn into_new_account(self, role: Role, password_hash: String) -> NewAccount {
        let profile = match role {
            Role::Admin => AccountProfile::Admin,
            Role::Patient => AccountProfile::Patient {
                birth_date: self.birth_date,
            },
            Role::Doctor => AccountProfile::Doctor {
                specialty: self.specialty,
                availability: Availability::Free,
            },
            Role::Secretary => AccountProfile::Secretary,
        };

        NewAccount {
            last_name: self.last_name,
            first_name: self.first_name,
            email: self.email,
            password_hash,
            phone: self.phone,
            profile,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(rename = "mot_de_passe")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: Account,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
