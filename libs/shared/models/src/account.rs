use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Role;

pub type AccountId = i64;

/// Doctor's self-reported availability. Independent of appointment load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    #[default]
    #[serde(rename = "libre", alias = "free")]
    Free,
    #[serde(rename = "occupe", alias = "busy")]
    Busy,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Free => "libre",
            Availability::Busy => "occupe",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Availability {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "libre" | "free" => Ok(Availability::Free),
            "occupe" | "busy" => Ok(Availability::Busy),
            other => Err(format!("Invalid availability '{}'. Use \"libre\" or \"occupe\"", other)),
        }
    }
}

/// Role-specific part of an account. The role tag is derived from the
/// variant, so it cannot change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum AccountProfile {
    Admin,
    Patient {
        #[serde(rename = "date_naissance", default, skip_serializing_if = "Option::is_none")]
        birth_date: Option<NaiveDate>,
    },
    Doctor {
        #[serde(rename = "specialite", default)]
        specialty: Option<String>,
        #[serde(rename = "statut", default)]
        availability: Availability,
    },
    Secretary,
}

impl AccountProfile {
    pub fn role(&self) -> Role {
        match self {
            AccountProfile::Admin => Role::Admin,
            AccountProfile::Patient { .. } => Role::Patient,
            AccountProfile::Doctor { .. } => Role::Doctor,
            AccountProfile::Secretary => Role::Secretary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(rename = "telephone")]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub profile: AccountProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn availability(&self) -> Option<Availability> {
        match &self.profile {
            AccountProfile::Doctor { availability, .. } => Some(*availability),
            _ => None,
        }
    }

    /// Embedded doctors expose only their name and specialty; contact
    /// details are kept for patients, whom staff need to reach.
    pub fn summary(&self) -> AccountSummary {
        let (email, phone, specialty) = match &self.profile {
            AccountProfile::Doctor { specialty, .. } => (None, None, specialty.clone()),
            AccountProfile::Admin | AccountProfile::Patient { .. } | AccountProfile::Secretary => {
                (Some(self.email.clone()), self.phone.clone(), None)
            }
        };

        AccountSummary {
            id: self.id,
            last_name: self.last_name.clone(),
            first_name: self.first_name.clone(),
            email,
            phone,
            specialty,
        }
    }

    /// Public doctor listing entry, `None` for other roles.
    pub fn doctor_profile(&self) -> Option<DoctorProfile> {
        match &self.profile {
            AccountProfile::Doctor { specialty, availability } => Some(DoctorProfile {
                id: self.id,
                last_name: self.last_name.clone(),
                first_name: self.first_name.clone(),
                specialty: specialty.clone(),
                phone: self.phone.clone(),
                availability: *availability,
            }),
            AccountProfile::Admin | AccountProfile::Patient { .. } | AccountProfile::Secretary => None,
        }
    }
}

/// Compact view embedded in appointment listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: AccountId,
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "telephone", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "specialite", skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
}

/// Doctor as shown in the directory: no email, no timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: AccountId,
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "specialite")]
    pub specialty: Option<String>,
    #[serde(rename = "telephone")]
    pub phone: Option<String>,
    #[serde(rename = "statut")]
    pub availability: Availability,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub profile: AccountProfile,
}

impl NewAccount {
    pub fn role(&self) -> Role {
        self.profile.role()
    }
}
