use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use shared_models::account::{Account, AccountId, Availability, NewAccount};
use shared_models::appointment::{
    Appointment, AppointmentId, AppointmentPatch, AppointmentStatus, NewAppointment,
};
use shared_models::auth::Role;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("An account with email {email} already exists for role {role}")]
    Duplicate { role: Role, email: String },

    #[error("An administrator already exists")]
    AdminAlreadyExists,

    #[error("Record would violate an invariant: {0}")]
    InvariantViolation(String),

    #[error("Redis connection error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { .. } => AppError::Conflict(err.to_string()),
            StoreError::AdminAlreadyExists => AppError::Forbidden(err.to_string()),
            StoreError::InvariantViolation(msg) => AppError::Validation(msg),
            StoreError::Redis(_) | StoreError::Backend(_) => AppError::Internal(err.to_string()),
        }
    }
}

/// Account records, partitioned by role.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `Duplicate` if the email is taken inside the role partition and
    /// with `AdminAlreadyExists` once any admin has ever been created.
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError>;

    async fn find_by_id(&self, role: Role, id: AccountId) -> Result<Option<Account>, StoreError>;

    async fn find_by_email(&self, role: Role, email: &str) -> Result<Option<Account>, StoreError>;

    async fn list(&self, role: Role) -> Result<Vec<Account>, StoreError>;

    async fn count(&self, role: Role) -> Result<usize, StoreError>;

    /// Returns the removed account, if any.
    async fn delete(&self, role: Role, id: AccountId) -> Result<Option<Account>, StoreError>;

    async fn set_availability(
        &self,
        doctor_id: AccountId,
        availability: Availability,
    ) -> Result<Option<Account>, StoreError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppointmentOrder {
    /// By date then time.
    #[default]
    Schedule,
    /// By creation time, oldest first.
    Oldest,
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub patient_id: Option<AccountId>,
    pub doctor_id: Option<AccountId>,
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub order: AppointmentOrder,
}

impl AppointmentFilter {
    pub fn for_patient(patient_id: AccountId) -> Self {
        Self {
            patient_id: Some(patient_id),
            ..Default::default()
        }
    }

    pub fn for_doctor(doctor_id: AccountId) -> Self {
        Self {
            doctor_id: Some(doctor_id),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: Option<AppointmentStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.patient_id.map_or(true, |id| appointment.patient_id == id)
            && self.doctor_id.map_or(true, |id| appointment.doctor_id == Some(id))
            && self.status.map_or(true, |status| appointment.status == status)
            && self.date.map_or(true, |date| appointment.date == date)
            && self.from.map_or(true, |from| appointment.date >= from)
            && self.to.map_or(true, |to| appointment.date <= to)
    }
}

/// Preconditions checked atomically with an update (compare-and-swap).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentGuard {
    pub status: Option<AppointmentStatus>,
    pub status_not: Option<AppointmentStatus>,
    pub doctor_id: Option<Option<AccountId>>,
    pub patient_id: Option<AccountId>,
}

impl AppointmentGuard {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn in_status(mut self, status: AppointmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn not_in_status(mut self, status: AppointmentStatus) -> Self {
        self.status_not = Some(status);
        self
    }

    pub fn assigned_to(mut self, doctor_id: Option<AccountId>) -> Self {
        self.doctor_id = Some(doctor_id);
        self
    }

    pub fn owned_by(mut self, patient_id: AccountId) -> Self {
        self.patient_id = Some(patient_id);
        self
    }

    pub fn admits(&self, appointment: &Appointment) -> bool {
        self.status.map_or(true, |status| appointment.status == status)
            && self.status_not.map_or(true, |status| appointment.status != status)
            && self.doctor_id.map_or(true, |doctor_id| appointment.doctor_id == doctor_id)
            && self.patient_id.map_or(true, |patient_id| appointment.patient_id == patient_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Appointment),
    NotFound,
    /// The guard did not hold; carries the record as it currently is.
    Rejected(Appointment),
}

/// Appointment records. Never physically deleted.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, StoreError>;

    async fn find(&self, id: AppointmentId) -> Result<Option<Appointment>, StoreError>;

    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StoreError>;

    /// Applies `patch` only if `guard` admits the current record, as one atomic step.
    async fn update_where(
        &self,
        id: AppointmentId,
        guard: &AppointmentGuard,
        patch: &AppointmentPatch,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Clears every reference to a removed doctor. Appointments that are not
    /// cancelled go back to `Requested` so the doctor invariant keeps holding.
    async fn release_doctor(&self, doctor_id: AccountId) -> Result<Vec<Appointment>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{NaiveTime, Utc};

    fn appointment(status: AppointmentStatus, doctor_id: Option<AccountId>) -> Appointment {
        Appointment {
            id: 7,
            date: NaiveDate::from_ymd_opt(2026, 2, 15).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            status,
            symptoms: None,
            patient_id: 1,
            doctor_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn guard_checks_status_and_doctor() {
        let guard = AppointmentGuard::any()
            .in_status(AppointmentStatus::AssignedPendingDoctor)
            .assigned_to(Some(3));

        assert!(guard.admits(&appointment(AppointmentStatus::AssignedPendingDoctor, Some(3))));
        assert!(!guard.admits(&appointment(AppointmentStatus::AssignedPendingDoctor, Some(5))));
        assert!(!guard.admits(&appointment(AppointmentStatus::Accepted, Some(3))));
    }

    #[test]
    fn guard_excludes_status() {
        let guard = AppointmentGuard::any().not_in_status(AppointmentStatus::Cancelled).owned_by(1);
        assert!(guard.admits(&appointment(AppointmentStatus::Requested, None)));
        assert!(!guard.admits(&appointment(AppointmentStatus::Cancelled, None)));
    }

    #[test]
    fn filter_date_range_is_inclusive() {
        let filter = AppointmentFilter {
            from: NaiveDate::from_ymd_opt(2026, 2, 15),
            to: NaiveDate::from_ymd_opt(2026, 2, 15),
            ..AppointmentFilter::for_patient(1)
        };
        assert!(filter.matches(&appointment(AppointmentStatus::Requested, None)));
        assert!(!AppointmentFilter::for_doctor(3).matches(&appointment(AppointmentStatus::Requested, None)));
    }

    #[test]
    fn store_errors_map_to_http_classes() {
        assert_matches!(
            AppError::from(StoreError::Duplicate { role: Role::Patient, email: "a@b.co".into() }),
            AppError::Conflict(_)
        );
        assert_matches!(AppError::from(StoreError::AdminAlreadyExists), AppError::Forbidden(_));
        assert_matches!(AppError::from(StoreError::Backend("down".into())), AppError::Internal(_));
    }
}
