use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use appointment_cell::AppointmentQueries;
use auth_cell::AppState;
use shared_database::AccountStore;
use shared_models::{
    account::{Account, AccountId, Availability},
    appointment::AppointmentDetails,
    auth::Role,
};

use crate::models::{DoctorDirectory, DoctorError};

pub struct DoctorService {
    accounts: Arc<dyn AccountStore>,
    queries: AppointmentQueries,
}

impl DoctorService {
    pub fn new(state: &AppState) -> Self {
        Self {
            accounts: state.accounts.clone(),
            queries: AppointmentQueries::new(state),
        }
    }

    /// Self-reported toggle; appointment load never changes it.
    pub async fn set_availability(
        &self,
        doctor_id: AccountId,
        availability: Availability,
    ) -> Result<Account, DoctorError> {
        let doctor = self
            .accounts
            .set_availability(doctor_id, availability)
            .await?
            .ok_or(DoctorError::NotFound)?;

        info!("Doctor {} is now {}", doctor_id, availability);
        Ok(doctor)
    }

    pub async fn calendar(
        &self,
        doctor_id: AccountId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<AppointmentDetails>, DoctorError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(DoctorError::InvalidDateRange);
            }
        }

        debug!("Loading calendar of doctor {} ({:?} to {:?})", doctor_id, from, to);
        Ok(self.queries.calendar(doctor_id, from, to).await?)
    }

    pub async fn directory(&self) -> Result<DoctorDirectory, DoctorError> {
        let doctors = self.accounts.list(Role::Doctor).await?;
        Ok(DoctorDirectory::from_doctors(doctors))
    }
}
