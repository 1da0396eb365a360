use tracing::{debug, info, instrument};

use security_cell::{AuditEventType, PasswordSecurityService};
use shared_models::{
    account::Account,
    auth::{Identity, Role},
    error::AppError,
};

use crate::models::{LoginRequest, LoginResponse, RegisterAccountRequest};
use crate::services::RoleGate;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Registration, login and logout for every role.
pub struct AccountService;

impl AccountService {
    /// Creates an account of `role`. `actor` is the administrator creating
    /// staff; self-registration passes `None`.
    #[instrument(skip(state, request), fields(email = %request.email))]
    pub async fn create_account(
        state: &AppState,
        role: Role,
        request: RegisterAccountRequest,
        actor: Option<&Identity>,
    ) -> Result<Account, AppError> {
        if role == Role::Admin && state.accounts.count(Role::Admin).await? > 0 {
            return Err(AppError::Forbidden("An administrator account already exists".to_string()));
        }

        let request = request.validated()?;
        if state.accounts.find_by_email(role, &request.email).await?.is_some() {
            return Err(AppError::Conflict(format!("Email {} is already in use", request.email)));
        }

        let password_hash = hash_password(request.password.clone()).await?;
        let account = state
            .accounts
            .insert(request.into_new_account(role, password_hash))
            .await?;

        let event_type = match role {
            Role::Admin => AuditEventType::AdminBootstrapped,
            Role::Patient => AuditEventType::PatientRegistered,
            Role::Doctor | Role::Secretary => AuditEventType::StaffCreated,
        };
        state
            .audit
            .log_account_created(
                event_type,
                actor.map(|identity| (identity.role, identity.account_id)),
                role,
                account.id,
            )
            .await;

        info!("Created {} account {}", role, account.id);
        Ok(account)
    }

    #[instrument(skip(state, request), fields(email = %request.email))]
    pub async fn login(
        state: &AppState,
        role: Role,
        request: LoginRequest,
    ) -> Result<LoginResponse, AppError> {
        let email = request.email.trim().to_lowercase();

        let Some(account) = state.accounts.find_by_email(role, &email).await? else {
            debug!("No {} account for {}", role, email);
            state.audit.log_failed_authentication(role, &email, "unknown email").await;
            return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(request.password, account.password_hash.clone()).await? {
            state.audit.log_failed_authentication(role, &email, "wrong password").await;
            return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
        }

        let credential = state.sessions.issue(account.id, &account.email, role).await?;
        state.audit.log_successful_authentication(role, account.id).await;

        Ok(LoginResponse {
            user: account,
            token: credential.token,
            expires_at: credential.expires_at,
        })
    }

    /// Idempotent: logging out with an already-ended session still succeeds.
    pub async fn logout(state: &AppState, role: Role, token: &str) -> Result<(), AppError> {
        let identity = state.sessions.decode(token)?;
        if let Err(err) = RoleGate::authorize(Some(&identity), &[role]) {
            state
                .audit
                .log_access_denied(identity.role, identity.account_id, &format!("{} logout", role))
                .await;
            return Err(err.into());
        }

        state.sessions.end_session(&identity, token).await?;
        state.audit.log_logout(identity.role, identity.account_id).await;
        Ok(())
    }
}

/// Argon2 is CPU-bound, so it runs off the async workers.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    let hash = tokio::task::spawn_blocking(move || PasswordSecurityService::hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))??;
    Ok(hash)
}

async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let matches =
        tokio::task::spawn_blocking(move || PasswordSecurityService::verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))??;
    Ok(matches)
}
