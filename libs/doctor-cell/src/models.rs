use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::StoreError;
use shared_models::{
    account::{Account, Availability, DoctorProfile},
    error::AppError,
};

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Body of `PUT /doctor/availability`. Kept as a string so an unknown value
/// is reported with the accepted alternatives.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityRequest {
    pub statut: String,
}

impl AvailabilityRequest {
    pub fn availability(&self) -> Result<Availability, DoctorError> {
        self.statut.trim().parse().map_err(DoctorError::InvalidAvailability)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    pub date_debut: Option<String>,
    pub date_fin: Option<String>,
}

// ==============================================================================
// RESPONSE MODELS
// ==============================================================================

/// Doctors visible to patients and secretaries: busy ones first, then by
/// surname.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorDirectory {
    pub total: usize,
    pub libres: usize,
    pub occupes: usize,
    #[serde(rename = "data")]
    pub doctors: Vec<DoctorProfile>,
}

impl DoctorDirectory {
    pub fn from_doctors(doctors: Vec<Account>) -> Self {
        let mut doctors: Vec<DoctorProfile> = doctors.iter().filter_map(Account::doctor_profile).collect();
        doctors.sort_by(|a, b| {
            let rank = |doctor: &DoctorProfile| match doctor.availability {
                Availability::Busy => 0,
                Availability::Free => 1,
            };
            rank(a)
                .cmp(&rank(b))
                .then_with(|| a.last_name.cmp(&b.last_name))
                .then_with(|| a.id.cmp(&b.id))
        });

        let libres = doctors
            .iter()
            .filter(|doctor| doctor.availability == Availability::Free)
            .count();

        Self {
            total: doctors.len(),
            libres,
            occupes: doctors.len() - libres,
            doctors,
        }
    }
}

// ==============================================================================
// ERROR MODELS
// ==============================================================================

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("{0}")]
    InvalidAvailability(String),

    #[error("date_debut must not be after date_fin")]
    InvalidDateRange,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound(err.to_string()),
            DoctorError::InvalidAvailability(msg) => AppError::Validation(msg),
            DoctorError::InvalidDateRange => AppError::Validation(err.to_string()),
            DoctorError::Store(store) => store.into(),
        }
    }
}
