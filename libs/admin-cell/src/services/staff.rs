use tracing::{info, instrument};

use auth_cell::{models::RegisterAccountRequest, services::AccountService, AppState};
use shared_models::{
    account::{Account, AccountId},
    auth::{Identity, Role, SessionKey},
    error::AppError,
};

use crate::models::{AdminError, StaffDeletion};

/// Doctor and secretary accounts, managed by the administrator.
pub struct StaffService;

impl StaffService {
    pub async fn create(
        state: &AppState,
        admin: &Identity,
        role: Role,
        request: RegisterAccountRequest,
    ) -> Result<Account, AppError> {
        ensure_staff(role)?;
        AccountService::create_account(state, role, request, Some(admin)).await
    }

    pub async fn list(state: &AppState, role: Role) -> Result<Vec<Account>, AdminError> {
        ensure_staff(role)?;
        let mut accounts = state.accounts.list(role).await?;
        accounts.sort_by(|a, b| a.last_name.cmp(&b.last_name).then_with(|| a.id.cmp(&b.id)));
        Ok(accounts)
    }

    /// Removes the account, hands a doctor's appointments back to the
    /// secretaries and ends any live session of the removed account.
    #[instrument(skip(state, admin), fields(admin_id = admin.account_id))]
    pub async fn delete(
        state: &AppState,
        admin: &Identity,
        role: Role,
        id: AccountId,
    ) -> Result<StaffDeletion, AppError> {
        ensure_staff(role)?;
        let account = state
            .accounts
            .delete(role, id)
            .await?
            .ok_or(AdminError::StaffNotFound(role))?;

        let released_appointments = match role {
            Role::Doctor => state.appointments.release_doctor(id).await?.len(),
            Role::Secretary | Role::Admin | Role::Patient => 0,
        };

        state.sessions.revoke(SessionKey::new(role, id)).await?;
        state
            .audit
            .log_staff_deleted(admin.account_id, role, id, released_appointments)
            .await;

        info!(
            "Deleted {} account {} ({} appointments released)",
            role, id, released_appointments
        );
        Ok(StaffDeletion {
            account,
            released_appointments,
        })
    }
}

fn ensure_staff(role: Role) -> Result<(), AdminError> {
    match role {
        Role::Doctor | Role::Secretary => Ok(()),
        Role::Admin | Role::Patient => Err(AdminError::NotStaff(role)),
    }
}
