use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use shared_models::account::{Account, AccountId, AccountProfile, Availability, NewAccount};
use shared_models::appointment::{
    Appointment, AppointmentId, AppointmentPatch, AppointmentStatus, NewAppointment,
};
use shared_models::auth::Role;

use crate::store::{
    AccountStore, AppointmentFilter, AppointmentGuard, AppointmentOrder, AppointmentStore,
    StoreError, UpdateOutcome,
};

#[derive(Default)]
struct AccountTables {
    partitions: HashMap<Role, BTreeMap<AccountId, Account>>,
    next_ids: HashMap<Role, AccountId>,
    admin_created: bool,
}

impl AccountTables {
    fn partition(&self, role: Role) -> impl Iterator<Item = &Account> {
        self.partitions.get(&role).into_iter().flat_map(|accounts| accounts.values())
    }

    fn next_id(&mut self, role: Role) -> AccountId {
        let next = self.next_ids.entry(role).or_insert(1);
        let id = *next;
        *next += 1;
        id
    }
}

/// Account store kept in process memory. Ids are sequential per role partition.
#[derive(Default)]
pub struct InMemoryAccountStore {
    tables: RwLock<AccountTables>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let role = account.role();
        let mut tables = self.tables.write().await;

        if role == Role::Admin && tables.admin_created {
            return Err(StoreError::AdminAlreadyExists);
        }

        if tables.partition(role).any(|existing| existing.email.eq_ignore_ascii_case(&account.email)) {
            return Err(StoreError::Duplicate { role, email: account.email });
        }

        let now = Utc::now();
        let record = Account {
            id: tables.next_id(role),
            last_name: account.last_name,
            first_name: account.first_name,
            email: account.email,
            password_hash: account.password_hash,
            phone: account.phone,
            profile: account.profile,
            created_at: now,
            updated_at: now,
        };

        if role == Role::Admin {
            tables.admin_created = true;
        }
        tables.partitions.entry(role).or_default().insert(record.id, record.clone());

        debug!("Inserted {} account {}", role, record.id);
        Ok(record)
    }

    async fn find_by_id(&self, role: Role, id: AccountId) -> Result<Option<Account>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.partitions.get(&role).and_then(|accounts| accounts.get(&id)).cloned())
    }

    async fn find_by_email(&self, role: Role, email: &str) -> Result<Option<Account>, StoreError> {
        let tables = self.tables.read().await;
        let found = tables
            .partition(role)
            .find(|account| account.email.eq_ignore_ascii_case(email))
            .cloned();
        Ok(found)
    }

    async fn list(&self, role: Role) -> Result<Vec<Account>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.partition(role).cloned().collect())
    }

    async fn count(&self, role: Role) -> Result<usize, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.partition(role).count())
    }

    async fn delete(&self, role: Role, id: AccountId) -> Result<Option<Account>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.partitions.get_mut(&role).and_then(|accounts| accounts.remove(&id)))
    }

    async fn set_availability(
        &self,
        doctor_id: AccountId,
        availability: Availability,
    ) -> Result<Option<Account>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(account) = tables
            .partitions
            .get_mut(&Role::Doctor)
            .and_then(|accounts| accounts.get_mut(&doctor_id))
        else {
            return Ok(None);
        };

        if let AccountProfile::Doctor { availability: current, .. } = &mut account.profile {
            *current = availability;
            account.updated_at = Utc::now();
        }

        Ok(Some(account.clone()))
    }
}

#[derive(Default)]
struct AppointmentTable {
    rows: BTreeMap<AppointmentId, Appointment>,
    next_id: AppointmentId,
}

/// Appointment store kept in process memory. Every write holds the table
/// lock, so guard checks and updates cannot interleave.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    table: RwLock<AppointmentTable>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        if !shared_models::appointment::is_consistent(appointment.status, appointment.doctor_id) {
            return Err(StoreError::InvariantViolation(format!(
                "status {} requires an assigned doctor",
                appointment.status
            )));
        }

        let mut table = self.table.write().await;
        table.next_id += 1;
        let now = Utc::now();
        let record = Appointment {
            id: table.next_id,
            date: appointment.date,
            time: appointment.time,
            status: appointment.status,
            symptoms: appointment.symptoms,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(record.id, record.clone());

        debug!("Inserted appointment {} with status {}", record.id, record.status);
        Ok(record)
    }

    async fn find(&self, id: AppointmentId) -> Result<Option<Appointment>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StoreError> {
        let table = self.table.read().await;
        let mut appointments: Vec<Appointment> = table
            .rows
            .values()
            .filter(|appointment| filter.matches(appointment))
            .cloned()
            .collect();

        match filter.order {
            AppointmentOrder::Schedule => {
                appointments.sort_by(|a, b| (a.date, a.time, a.id).cmp(&(b.date, b.time, b.id)))
            }
            AppointmentOrder::Oldest => {
                appointments.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)))
            }
        }

        Ok(appointments)
    }

    async fn update_where(
        &self,
        id: AppointmentId,
        guard: &AppointmentGuard,
        patch: &AppointmentPatch,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut table = self.table.write().await;
        let Some(current) = table.rows.get_mut(&id) else {
            return Ok(UpdateOutcome::NotFound);
        };

        if !guard.admits(current) {
            return Ok(UpdateOutcome::Rejected(current.clone()));
        }

        let mut updated = current.clone();
        patch.apply(&mut updated);
        if !updated.is_consistent() {
            return Err(StoreError::InvariantViolation(format!(
                "status {} requires an assigned doctor",
                updated.status
            )));
        }

        updated.updated_at = Utc::now();
        *current = updated.clone();
        Ok(UpdateOutcome::Updated(updated))
    }

    async fn release_doctor(&self, doctor_id: AccountId) -> Result<Vec<Appointment>, StoreError> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let mut released = Vec::new();

        for appointment in table.rows.values_mut() {
            if appointment.doctor_id != Some(doctor_id) {
                continue;
            }

            appointment.doctor_id = None;
            if appointment.status != AppointmentStatus::Cancelled {
                appointment.status = AppointmentStatus::Requested;
            }
            appointment.updated_at = now;
            released.push(appointment.clone());
        }

        debug!("Released {} appointments from doctor {}", released.len(), doctor_id);
        Ok(released)
    }
}
