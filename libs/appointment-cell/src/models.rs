// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use auth_cell::AuthorizationError;
use shared_database::StoreError;
use shared_models::{
    account::AccountId,
    appointment::{clock_time, AppointmentStatus},
    auth::{Identity, Role},
    error::AppError,
};

// ==============================================================================
// WORKFLOW MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    RequestAppointment,
    ScheduleDirect,
    AssignDoctor,
    Accept,
    Refuse,
    Cancel,
    Edit,
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowAction::RequestAppointment => "request",
            WorkflowAction::ScheduleDirect => "schedule",
            WorkflowAction::AssignDoctor => "assign a doctor to",
            WorkflowAction::Accept => "accept",
            WorkflowAction::Refuse => "refuse",
            WorkflowAction::Cancel => "cancel",
            WorkflowAction::Edit => "edit",
        };
        f.write_str(name)
    }
}

/// Who is cancelling. Patients may only cancel their own appointments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelActor {
    Patient(AccountId),
    Secretary(AccountId),
}

impl CancelActor {
    pub fn role(&self) -> Role {
        match self {
            CancelActor::Patient(_) => Role::Patient,
            CancelActor::Secretary(_) => Role::Secretary,
        }
    }

    pub fn account_id(&self) -> AccountId {
        match self {
            CancelActor::Patient(id) | CancelActor::Secretary(id) => *id,
        }
    }
}

impl TryFrom<&Identity> for CancelActor {
    type Error = AuthorizationError;

    fn try_from(identity: &Identity) -> Result<Self, Self::Error> {
        match identity.role {
            Role::Patient => Ok(CancelActor::Patient(identity.account_id)),
            Role::Secretary => Ok(CancelActor::Secretary(identity.account_id)),
            Role::Admin | Role::Doctor => Err(AuthorizationError::Forbidden(identity.role)),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentRequest {
    pub date: NaiveDate,
    #[serde(rename = "heure", with = "clock_time")]
    pub time: NaiveTime,
    #[serde(rename = "symptomes", default)]
    pub symptoms: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleAppointmentRequest {
    pub patient_id: AccountId,
    #[serde(rename = "docteur_id")]
    pub doctor_id: AccountId,
    pub date: NaiveDate,
    #[serde(rename = "heure", with = "clock_time")]
    pub time: NaiveTime,
    #[serde(rename = "symptomes", default)]
    pub symptoms: Option<String>,
}

/// Optional `date`/`heure` reschedule in the same update.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignDoctorRequest {
    #[serde(rename = "docteur_id")]
    pub doctor_id: AccountId,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(rename = "heure", default, with = "clock_time::option")]
    pub time: Option<NaiveTime>,
}

/// Secretary correction. `docteur_id: null` clears the assignment, an absent
/// field leaves it unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditAppointmentRequest {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(rename = "heure", default, with = "clock_time::option")]
    pub time: Option<NaiveTime>,
    #[serde(rename = "statut", default)]
    pub status: Option<AppointmentStatus>,
    #[serde(rename = "docteur_id", default, deserialize_with = "present_or_null")]
    pub doctor_id: Option<Option<AccountId>>,
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusQuery {
    pub statut: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentSearchQuery {
    pub statut: Option<String>,
    pub date: Option<String>,
}

// ==============================================================================
// RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppointmentStats {
    pub total_rendez_vous: usize,
    pub en_attente_secretaire: usize,
    pub en_attente_docteur: usize,
    pub acceptes: usize,
    pub refuses: usize,
    pub annules: usize,
    pub total_patients: usize,
    pub total_docteurs: usize,
    pub docteurs_libres: usize,
    pub docteurs_occupes: usize,
}

// ==============================================================================
// ERROR MODELS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Cannot {action} an appointment with status {status}")]
    InvalidTransition {
        action: WorkflowAction,
        status: AppointmentStatus,
    },

    #[error("Appointment is already cancelled")]
    AlreadyCancelled,

    #[error("Appointment was modified concurrently, please retry")]
    ConcurrentModification,

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound
            | AppointmentError::PatientNotFound
            | AppointmentError::DoctorNotFound => AppError::NotFound(err.to_string()),
            AppointmentError::InvalidTransition { .. } => AppError::InvalidTransition(err.to_string()),
            AppointmentError::AlreadyCancelled | AppointmentError::ConcurrentModification => {
                AppError::Conflict(err.to_string())
            }
            AppointmentError::Validation(msg) => AppError::Validation(msg),
            AppointmentError::Store(store) => store.into(),
        }
    }
}

/// Blank query values count as absent.
pub fn parse_status_filter(value: Option<&str>) -> Result<Option<AppointmentStatus>, AppError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value.parse().map(Some).map_err(AppError::Validation),
        None => Ok(None),
    }
}

pub fn parse_date_filter(value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", value))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_edit_distinguishes_null_from_absent() {
        let cleared: EditAppointmentRequest =
            serde_json::from_value(json!({ "docteur_id": null, "statut": "en_attente_secretaire" })).unwrap();
        assert_eq!(cleared.doctor_id, Some(None));
        assert_eq!(cleared.status, Some(AppointmentStatus::Requested));

        let untouched: EditAppointmentRequest = serde_json::from_value(json!({ "heure": "14:30" })).unwrap();
        assert_eq!(untouched.doctor_id, None);
        assert_eq!(untouched.time, NaiveTime::from_hms_opt(14, 30, 0));
    }

    #[test]
    fn test_cancel_actor_from_identity() {
        let patient = Identity { account_id: 4, email: "p@clinic.test".into(), role: Role::Patient };
        assert_eq!(CancelActor::try_from(&patient), Ok(CancelActor::Patient(4)));

        let doctor = Identity { account_id: 3, email: "d@clinic.test".into(), role: Role::Doctor };
        assert_eq!(
            CancelActor::try_from(&doctor),
            Err(AuthorizationError::Forbidden(Role::Doctor))
        );
    }

    #[test]
    fn test_filters() {
        assert_eq!(parse_status_filter(Some("accepte")).unwrap(), Some(AppointmentStatus::Accepted));
        assert_eq!(parse_status_filter(Some("")).unwrap(), None);
        assert_matches!(parse_status_filter(Some("done")), Err(AppError::Validation(_)));
        assert_eq!(
            parse_date_filter(Some("2026-02-15")).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 15)
        );
        assert_matches!(parse_date_filter(Some("15/02/2026")), Err(AppError::Validation(_)));
    }

    #[test]
    fn test_error_classes() {
        assert_matches!(AppError::from(AppointmentError::NotFound), AppError::NotFound(_));
        assert_matches!(AppError::from(AppointmentError::AlreadyCancelled), AppError::Conflict(_));
        assert_matches!(
            AppError::from(AppointmentError::InvalidTransition {
                action: WorkflowAction::Accept,
                status: AppointmentStatus::Requested
            }),
            AppError::InvalidTransition(msg) if msg == "Cannot accept an appointment with status en_attente_secretaire"
        );
    }
}
