//! Fixtures for route tests across cells: an in-memory `AppState`, seeded
//! accounts and appointments, and a one-shot request helper.

use std::sync::{Arc, OnceLock};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;
use tower::ServiceExt;

use security_cell::PasswordSecurityService;
use shared_models::{
    account::{Account, AccountId, AccountProfile, Availability, NewAccount},
    appointment::{Appointment, AppointmentStatus, NewAppointment},
    auth::Role,
};
use shared_utils::test_utils::TestConfig;

use crate::state::AppState;

pub const TEST_PASSWORD: &str = "password123";

fn test_password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| {
        PasswordSecurityService::hash_password(TEST_PASSWORD).expect("hashing test password")
    })
    .clone()
}

pub struct TestApp {
    pub state: Arc<AppState>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AppState::in_memory(TestConfig::default().to_arc())),
        }
    }

    pub async fn seed_account(&self, last_name: &str, email: &str, profile: AccountProfile) -> Account {
        self.state
            .accounts
            .insert(NewAccount {
                last_name: last_name.to_string(),
                first_name: "Test".to_string(),
                email: email.to_string(),
                password_hash: test_password_hash(),
                phone: None,
                profile,
            })
            .await
            .expect("seeding account")
    }

    pub async fn seed_admin(&self) -> Account {
        self.seed_account("Admin", "admin@clinic.test", AccountProfile::Admin).await
    }

    pub async fn seed_patient(&self, last_name: &str, email: &str) -> Account {
        self.seed_account(last_name, email, AccountProfile::Patient { birth_date: None })
            .await
    }

    pub async fn seed_doctor(&self, last_name: &str, email: &str, availability: Availability) -> Account {
        self.seed_account(
            last_name,
            email,
            AccountProfile::Doctor {
                specialty: Some("Cardiologie".to_string()),
                availability,
            },
        )
        .await
    }

    pub async fn seed_secretary(&self, last_name: &str, email: &str) -> Account {
        self.seed_account(last_name, email, AccountProfile::Secretary).await
    }

    /// Issues a live credential without going through password verification.
    pub async fn token_for(&self, account: &Account) -> String {
        self.state
            .sessions
            .issue(account.id, &account.email, account.role())
            .await
            .expect("issuing test credential")
            .token
    }

    pub async fn seed_appointment(
        &self,
        patient_id: AccountId,
        doctor_id: Option<AccountId>,
        status: AppointmentStatus,
        date: &str,
        time: &str,
    ) -> Appointment {
        self.state
            .appointments
            .insert(NewAppointment {
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("test date"),
                time: NaiveTime::parse_from_str(time, "%H:%M").expect("test time"),
                symptoms: Some("Checkup".to_string()),
                patient_id,
                doctor_id,
                status,
            })
            .await
            .expect("seeding appointment")
    }

    pub async fn role_count(&self, role: Role) -> usize {
        self.state.accounts.count(role).await.expect("counting accounts")
    }
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let body = match body {
        Some(body) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    builder.body(body).expect("building test request")
}

/// Sends one request through `router` and decodes the JSON envelope.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("reading response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is JSON")
    };
    (status, body)
}
