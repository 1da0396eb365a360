use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};

use appointment_cell::models::{
    AppointmentRequest, AssignDoctorRequest, EditAppointmentRequest, ScheduleAppointmentRequest,
};
use appointment_cell::{AppointmentError, AppointmentWorkflow, CancelActor};
use auth_cell::test_support::TestApp;
use security_cell::AuditEventType;
use shared_models::{
    account::{Account, Availability},
    appointment::AppointmentStatus,
};

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn time(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M").unwrap()
}

async fn seed_doctors(app: &TestApp, count: usize) -> Vec<Account> {
    let mut doctors = Vec::new();
    for n in 1..=count {
        doctors.push(
            app.seed_doctor(&format!("Doctor{}", n), &format!("doc{}@clinic.test", n), Availability::Free)
                .await,
        );
    }
    doctors
}

#[tokio::test]
async fn test_patient_request_starts_unassigned() {
    let app = TestApp::new();
    let patient = app.seed_patient("Durand", "durand@clinic.test").await;

    let appointment = AppointmentWorkflow::new(&app.state)
        .request_appointment(
            patient.id,
            AppointmentRequest {
                date: date("2026-02-15"),
                time: time("10:00"),
                symptoms: Some("chest pain".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Requested);
    assert_eq!(appointment.doctor_id, None);
    assert_eq!(appointment.patient_id, patient.id);
}

#[tokio::test]
async fn test_schedule_direct_requires_existing_accounts() {
    let app = TestApp::new();
    let patient = app.seed_patient("Durand", "durand@clinic.test").await;
    let doctor = app.seed_doctor("House", "house@clinic.test", Availability::Free).await;
    let workflow = AppointmentWorkflow::new(&app.state);

    let request = |patient_id, doctor_id| ScheduleAppointmentRequest {
        patient_id,
        doctor_id,
        date: date("2026-03-01"),
        time: time("09:30"),
        symptoms: None,
    };

    assert_matches!(
        workflow.schedule_direct(request(99, doctor.id)).await,
        Err(AppointmentError::PatientNotFound)
    );
    assert_matches!(
        workflow.schedule_direct(request(patient.id, 99)).await,
        Err(AppointmentError::DoctorNotFound)
    );

    let appointment = workflow.schedule_direct(request(patient.id, doctor.id)).await.unwrap();
    assert_eq!(appointment.status, AppointmentStatus::AssignedPendingDoctor);
    assert_eq!(appointment.doctor_id, Some(doctor.id));
}

#[tokio::test]
async fn test_assign_accept_scenario() {
    let app = TestApp::new();
    let patient = app.seed_patient("Durand", "durand@clinic.test").await;
    let doctors = seed_doctors(&app, 5).await;
    for _ in 0..6 {
        app.seed_appointment(patient.id, None, AppointmentStatus::Requested, "2026-02-10", "08:00")
            .await;
    }
    let target = app
        .seed_appointment(patient.id, None, AppointmentStatus::Requested, "2026-02-15", "10:00")
        .await;
    assert_eq!(target.id, 7);
    assert_eq!(doctors[2].id, 3);

    let workflow = AppointmentWorkflow::new(&app.state);
    let assigned = workflow
        .assign_doctor(7, AssignDoctorRequest { doctor_id: 3, date: None, time: None })
        .await
        .unwrap();
    assert_eq!(assigned.status, AppointmentStatus::AssignedPendingDoctor);
    assert_eq!(assigned.doctor_id, Some(3));

    // Not the assignee: reported as missing.
    assert_matches!(workflow.accept(5, 7).await, Err(AppointmentError::NotFound));

    let accepted = workflow.accept(3, 7).await.unwrap();
    assert_eq!(accepted.status, AppointmentStatus::Accepted);

    assert_matches!(
        workflow.refuse(3, 7).await,
        Err(AppointmentError::InvalidTransition { status: AppointmentStatus::Accepted, .. })
    );
}

#[tokio::test]
async fn test_assign_guards() {
    let app = TestApp::new();
    let patient = app.seed_patient("Durand", "durand@clinic.test").await;
    let doctor = app.seed_doctor("House", "house@clinic.test", Availability::Free).await;
    let requested = app
        .seed_appointment(patient.id, None, AppointmentStatus::Requested, "2026-02-15", "10:00")
        .await;
    let workflow = AppointmentWorkflow::new(&app.state);

    assert_matches!(
        workflow
            .assign_doctor(requested.id, AssignDoctorRequest { doctor_id: 42, date: None, time: None })
            .await,
        Err(AppointmentError::DoctorNotFound)
    );
    assert_matches!(
        workflow
            .assign_doctor(404, AssignDoctorRequest { doctor_id: doctor.id, date: None, time: None })
            .await,
        Err(AppointmentError::NotFound)
    );

    let rescheduled = workflow
        .assign_doctor(
            requested.id,
            AssignDoctorRequest {
                doctor_id: doctor.id,
                date: Some(date("2026-02-20")),
                time: Some(time("15:45")),
            },
        )
        .await
        .unwrap();
    assert_eq!(rescheduled.date, date("2026-02-20"));
    assert_eq!(rescheduled.time, time("15:45"));

    assert_matches!(
        workflow
            .assign_doctor(requested.id, AssignDoctorRequest { doctor_id: doctor.id, date: None, time: None })
            .await,
        Err(AppointmentError::InvalidTransition {
            status: AppointmentStatus::AssignedPendingDoctor,
            ..
        })
    );
}

#[tokio::test]
async fn test_accept_requires_pending_doctor_status() {
    let app = TestApp::new();
    let patient = app.seed_patient("Durand", "durand@clinic.test").await;
    let doctor = app.seed_doctor("House", "house@clinic.test", Availability::Free).await;
    let unassigned = app
        .seed_appointment(patient.id, None, AppointmentStatus::Requested, "2026-02-15", "10:00")
        .await;
    let workflow = AppointmentWorkflow::new(&app.state);

    assert_matches!(workflow.accept(doctor.id, unassigned.id).await, Err(AppointmentError::NotFound));
    assert_matches!(workflow.refuse(doctor.id, 999).await, Err(AppointmentError::NotFound));

    let pending = app
        .seed_appointment(patient.id, Some(doctor.id), AppointmentStatus::AssignedPendingDoctor, "2026-02-16", "11:00")
        .await;
    let refused = workflow.refuse(doctor.id, pending.id).await.unwrap();
    assert_eq!(refused.status, AppointmentStatus::Refused);
    assert_eq!(refused.doctor_id, Some(doctor.id));
}

#[tokio::test]
async fn test_patient_cancel_rules() {
    let app = TestApp::new();
    let owner = app.seed_patient("Durand", "durand@clinic.test").await;
    let other = app.seed_patient("Leroy", "leroy@clinic.test").await;
    let doctor = app.seed_doctor("House", "house@clinic.test", Availability::Free).await;
    let appointment = app
        .seed_appointment(owner.id, Some(doctor.id), AppointmentStatus::Accepted, "2026-02-15", "10:00")
        .await;
    let workflow = AppointmentWorkflow::new(&app.state);

    assert_matches!(
        workflow.cancel(CancelActor::Patient(other.id), appointment.id).await,
        Err(AppointmentError::NotFound)
    );

    let cancelled = workflow.cancel(CancelActor::Patient(owner.id), appointment.id).await.unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    assert_matches!(
        workflow.cancel(CancelActor::Patient(owner.id), appointment.id).await,
        Err(AppointmentError::AlreadyCancelled)
    );
    assert_matches!(
        workflow.cancel(CancelActor::Secretary(1), appointment.id).await,
        Err(AppointmentError::AlreadyCancelled)
    );

    // Terminal: nothing moves it back.
    assert_matches!(workflow.accept(doctor.id, appointment.id).await, Err(AppointmentError::InvalidTransition { .. }));
    assert_matches!(
        workflow
            .assign_doctor(appointment.id, AssignDoctorRequest { doctor_id: doctor.id, date: None, time: None })
            .await,
        Err(AppointmentError::InvalidTransition { .. })
    );
}

#[tokio::test]
async fn test_secretary_cancels_any_appointment() {
    let app = TestApp::new();
    let patient = app.seed_patient("Durand", "durand@clinic.test").await;
    let secretary = app.seed_secretary("Petit", "petit@clinic.test").await;
    let appointment = app
        .seed_appointment(patient.id, None, AppointmentStatus::Requested, "2026-02-15", "10:00")
        .await;

    let cancelled = AppointmentWorkflow::new(&app.state)
        .cancel(CancelActor::Secretary(secretary.id), appointment.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    let entries = app
        .state
        .audit
        .recent_entries(Some(AuditEventType::AppointmentCancelled), 10)
        .await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].actor_id, Some(secretary.id));
}

#[tokio::test]
async fn test_edit_escape_hatch() {
    let app = TestApp::new();
    let patient = app.seed_patient("Durand", "durand@clinic.test").await;
    let doctor = app.seed_doctor("House", "house@clinic.test", Availability::Free).await;
    let appointment = app
        .seed_appointment(patient.id, None, AppointmentStatus::Requested, "2026-02-15", "10:00")
        .await;
    let workflow = AppointmentWorkflow::new(&app.state);

    // Skipping straight to Accepted is allowed, but only with a doctor.
    assert_matches!(
        workflow
            .edit(
                1,
                appointment.id,
                EditAppointmentRequest { status: Some(AppointmentStatus::Accepted), ..Default::default() }
            )
            .await,
        Err(AppointmentError::Validation(_))
    );

    let edited = workflow
        .edit(
            1,
            appointment.id,
            EditAppointmentRequest {
                status: Some(AppointmentStatus::Accepted),
                doctor_id: Some(Some(doctor.id)),
                time: Some(time("16:00")),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.status, AppointmentStatus::Accepted);
    assert_eq!(edited.doctor_id, Some(doctor.id));
    assert_eq!(edited.time, time("16:00"));

    assert_matches!(
        workflow
            .edit(
                1,
                appointment.id,
                EditAppointmentRequest { doctor_id: Some(Some(77)), ..Default::default() }
            )
            .await,
        Err(AppointmentError::DoctorNotFound)
    );
    assert_matches!(
        workflow.edit(1, appointment.id, EditAppointmentRequest::default()).await,
        Err(AppointmentError::Validation(_))
    );

    let entries = app.state.audit.recent_entries(Some(AuditEventType::AppointmentEdited), 10).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].resource_id.as_deref(), Some(appointment.id.to_string().as_str()));
}

#[tokio::test]
async fn test_edit_cannot_leave_cancelled() {
    let app = TestApp::new();
    let patient = app.seed_patient("Durand", "durand@clinic.test").await;
    let appointment = app
        .seed_appointment(patient.id, None, AppointmentStatus::Cancelled, "2026-02-15", "10:00")
        .await;
    let workflow = AppointmentWorkflow::new(&app.state);

    assert_matches!(
        workflow
            .edit(
                1,
                appointment.id,
                EditAppointmentRequest { status: Some(AppointmentStatus::Requested), ..Default::default() }
            )
            .await,
        Err(AppointmentError::InvalidTransition { status: AppointmentStatus::Cancelled, .. })
    );

    let moved = workflow
        .edit(1, appointment.id, EditAppointmentRequest { date: Some(date("2026-03-01")), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(moved.status, AppointmentStatus::Cancelled);
    assert_eq!(moved.date, date("2026-03-01"));
}
