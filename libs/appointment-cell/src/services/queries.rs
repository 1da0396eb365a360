// libs/appointment-cell/src/services/queries.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use auth_cell::AppState;
use shared_database::{AccountStore, AppointmentFilter, AppointmentOrder, AppointmentStore, StoreError};
use shared_models::{
    account::{AccountId, AccountSummary, Availability},
    appointment::{Appointment, AppointmentDetails, AppointmentStatus},
    auth::Role,
};

use crate::models::AppointmentStats;

/// Read side: listings with embedded patient/doctor summaries, and statistics.
pub struct AppointmentQueries {
    appointments: Arc<dyn AppointmentStore>,
    accounts: Arc<dyn AccountStore>,
}

impl AppointmentQueries {
    pub fn new(state: &AppState) -> Self {
        Self {
            appointments: state.appointments.clone(),
            accounts: state.accounts.clone(),
        }
    }

    pub async fn for_patient(
        &self,
        patient_id: AccountId,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<AppointmentDetails>, StoreError> {
        let filter = AppointmentFilter::for_patient(patient_id).with_status(status);
        self.list_with_details(&filter).await
    }

    pub async fn for_doctor(
        &self,
        doctor_id: AccountId,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<AppointmentDetails>, StoreError> {
        let filter = AppointmentFilter::for_doctor(doctor_id).with_status(status);
        self.list_with_details(&filter).await
    }

    /// Appointments waiting for a secretary, oldest request first.
    pub async fn pending_requests(&self) -> Result<Vec<AppointmentDetails>, StoreError> {
        let filter = AppointmentFilter {
            status: Some(AppointmentStatus::Requested),
            order: AppointmentOrder::Oldest,
            ..Default::default()
        };
        self.list_with_details(&filter).await
    }

    pub async fn search(
        &self,
        status: Option<AppointmentStatus>,
        date: Option<NaiveDate>,
    ) -> Result<Vec<AppointmentDetails>, StoreError> {
        let filter = AppointmentFilter {
            status,
            date,
            ..Default::default()
        };
        self.list_with_details(&filter).await
    }

    /// Accepted appointments of one doctor, optionally within an inclusive date range.
    pub async fn calendar(
        &self,
        doctor_id: AccountId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<AppointmentDetails>, StoreError> {
        let filter = AppointmentFilter {
            from,
            to,
            ..AppointmentFilter::for_doctor(doctor_id).with_status(Some(AppointmentStatus::Accepted))
        };
        self.list_with_details(&filter).await
    }

    pub async fn details(&self, appointment: Appointment) -> Result<AppointmentDetails, StoreError> {
        let mut details = self.attach_accounts(vec![appointment]).await?;
        details.pop().ok_or_else(|| StoreError::Backend("appointment lost while attaching accounts".to_string()))
    }

    pub async fn statistics(&self) -> Result<AppointmentStats, StoreError> {
        let appointments = self.appointments.list(&AppointmentFilter::default()).await?;
        let doctors = self.accounts.list(Role::Doctor).await?;

        let mut stats = AppointmentStats {
            total_rendez_vous: appointments.len(),
            total_patients: self.accounts.count(Role::Patient).await?,
            total_docteurs: doctors.len(),
            ..Default::default()
        };

        for appointment in &appointments {
            let counter = match appointment.status {
                AppointmentStatus::Requested => &mut stats.en_attente_secretaire,
                AppointmentStatus::AssignedPendingDoctor => &mut stats.en_attente_docteur,
                AppointmentStatus::Accepted => &mut stats.acceptes,
                AppointmentStatus::Refused => &mut stats.refuses,
                AppointmentStatus::Cancelled => &mut stats.annules,
            };
            *counter += 1;
        }

        for doctor in &doctors {
            match doctor.availability() {
                Some(Availability::Free) => stats.docteurs_libres += 1,
                Some(Availability::Busy) => stats.docteurs_occupes += 1,
                None => {}
            }
        }

        Ok(stats)
    }

    async fn list_with_details(&self, filter: &AppointmentFilter) -> Result<Vec<AppointmentDetails>, StoreError> {
        let appointments = self.appointments.list(filter).await?;
        debug!("Listing {} appointments", appointments.len());
        self.attach_accounts(appointments).await
    }

    async fn attach_accounts(&self, appointments: Vec<Appointment>) -> Result<Vec<AppointmentDetails>, StoreError> {
        let mut patients: HashMap<AccountId, Option<AccountSummary>> = HashMap::new();
        let mut doctors: HashMap<AccountId, Option<AccountSummary>> = HashMap::new();
        let mut details = Vec::with_capacity(appointments.len());

        for appointment in appointments {
            let patient = self.summary(&mut patients, Role::Patient, Some(appointment.patient_id)).await?;
            let doctor = self.summary(&mut doctors, Role::Doctor, appointment.doctor_id).await?;
            details.push(AppointmentDetails {
                appointment,
                patient,
                doctor,
            });
        }

        Ok(details)
    }

    async fn summary(
        &self,
        cache: &mut HashMap<AccountId, Option<AccountSummary>>,
        role: Role,
        id: Option<AccountId>,
    ) -> Result<Option<AccountSummary>, StoreError> {
        let Some(id) = id else {
            return Ok(None);
        };
        if let Some(cached) = cache.get(&id) {
            return Ok(cached.clone());
        }

        let summary = self.accounts.find_by_id(role, id).await?.map(|account| account.summary());
        cache.insert(id, summary.clone());
        Ok(summary)
    }
}
