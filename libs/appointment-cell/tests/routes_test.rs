use axum::http::{Method, StatusCode};
use serde_json::json;

use appointment_cell::router::{appointment_routes, secretary_routes};
use auth_cell::test_support::{json_request, send, TestApp};
use shared_models::{account::Availability, appointment::AppointmentStatus};

#[tokio::test]
async fn test_patient_round_trip() {
    let app = TestApp::new();
    let patient = app.seed_patient("Durand", "durand@clinic.test").await;
    let token = app.token_for(&patient).await;

    let (status, body) = send(
        appointment_routes(app.state.clone()),
        json_request(
            Method::POST,
            "/",
            Some(&token),
            Some(json!({ "date": "2026-02-15", "heure": "10:00", "symptomes": "chest pain" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["statut"], "en_attente_secretaire");
    assert_eq!(body["data"]["docteur_id"], serde_json::Value::Null);
    let id = body["data"]["id"].clone();

    let (status, body) = send(
        appointment_routes(app.state.clone()),
        json_request(Method::GET, "/mine", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    let listed = &body["data"][0];
    assert_eq!(listed["id"], id);
    assert_eq!(listed["date"], "2026-02-15");
    assert_eq!(listed["heure"], "10:00");
    assert_eq!(listed["symptomes"], "chest pain");
    assert_eq!(listed["patient"]["nom"], "Durand");
}

#[tokio::test]
async fn test_invalid_request_bodies() {
    let app = TestApp::new();
    let patient = app.seed_patient("Durand", "durand@clinic.test").await;
    let token = app.token_for(&patient).await;

    for body in [
        json!({ "heure": "10:00" }),
        json!({ "date": "15/02/2026", "heure": "10:00" }),
        json!({ "date": "2026-02-15", "heure": "25:99" }),
    ] {
        let (status, body) = send(
            appointment_routes(app.state.clone()),
            json_request(Method::POST, "/", Some(&token), Some(body)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    let (status, _) = send(
        appointment_routes(app.state.clone()),
        json_request(Method::GET, "/mine?statut=finished", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_role_gating() {
    let app = TestApp::new();
    let doctor = app.seed_doctor("House", "house@clinic.test", Availability::Free).await;
    let secretary = app.seed_secretary("Petit", "petit@clinic.test").await;
    let doctor_token = app.token_for(&doctor).await;
    let secretary_token = app.token_for(&secretary).await;

    let (status, _) = send(
        appointment_routes(app.state.clone()),
        json_request(
            Method::POST,
            "/",
            Some(&doctor_token),
            Some(json!({ "date": "2026-02-15", "heure": "10:00" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        appointment_routes(app.state.clone()),
        json_request(Method::GET, "/mine", Some(&secretary_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        secretary_routes(app.state.clone()),
        json_request(Method::GET, "/requests", Some(&doctor_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        secretary_routes(app.state.clone()),
        json_request(Method::GET, "/requests", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing token");
}

#[tokio::test]
async fn test_doctor_lists_assigned_appointments() {
    let app = TestApp::new();
    let patient = app.seed_patient("Durand", "durand@clinic.test").await;
    let doctor = app.seed_doctor("House", "house@clinic.test", Availability::Free).await;
    app.seed_appointment(patient.id, Some(doctor.id), AppointmentStatus::Accepted, "2026-02-16", "09:00")
        .await;
    app.seed_appointment(patient.id, Some(doctor.id), AppointmentStatus::AssignedPendingDoctor, "2026-02-15", "09:00")
        .await;
    app.seed_appointment(patient.id, None, AppointmentStatus::Requested, "2026-02-14", "09:00")
        .await;
    let token = app.token_for(&doctor).await;

    let (status, body) = send(
        appointment_routes(app.state.clone()),
        json_request(Method::GET, "/mine", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["date"], "2026-02-15");
    assert_eq!(body["data"][0]["docteur"]["specialite"], "Cardiologie");
    assert!(body["data"][0]["docteur"].get("email").is_none());
    assert_eq!(body["data"][0]["patient"]["email"], "durand@clinic.test");

    let (_, body) = send(
        appointment_routes(app.state.clone()),
        json_request(Method::GET, "/mine?statut=accepte", Some(&token), None),
    )
    .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["statut"], "accepte");
}

#[tokio::test]
async fn test_patient_cancel_twice_conflicts() {
    let app = TestApp::new();
    let owner = app.seed_patient("Durand", "durand@clinic.test").await;
    let stranger = app.seed_patient("Leroy", "leroy@clinic.test").await;
    let appointment = app
        .seed_appointment(owner.id, None, AppointmentStatus::Requested, "2026-02-15", "10:00")
        .await;
    let owner_token = app.token_for(&owner).await;
    let stranger_token = app.token_for(&stranger).await;
    let uri = format!("/{}", appointment.id);

    let (status, _) = send(
        appointment_routes(app.state.clone()),
        json_request(Method::DELETE, &uri, Some(&stranger_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        appointment_routes(app.state.clone()),
        json_request(Method::DELETE, &uri, Some(&owner_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["statut"], "annule");

    let (status, body) = send(
        appointment_routes(app.state.clone()),
        json_request(Method::DELETE, &uri, Some(&owner_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Appointment is already cancelled");
}

#[tokio::test]
async fn test_secretary_assigns_doctor() {
    let app = TestApp::new();
    let patient = app.seed_patient("Durand", "durand@clinic.test").await;
    for n in 1..=3 {
        app.seed_doctor(&format!("Doctor{}", n), &format!("doc{}@clinic.test", n), Availability::Free)
            .await;
    }
    for _ in 0..7 {
        app.seed_appointment(patient.id, None, AppointmentStatus::Requested, "2026-02-15", "10:00")
            .await;
    }
    let secretary = app.seed_secretary("Petit", "petit@clinic.test").await;
    let token = app.token_for(&secretary).await;

    let (status, body) = send(
        secretary_routes(app.state.clone()),
        json_request(Method::PUT, "/appointments/7/assign", Some(&token), Some(json!({ "docteur_id": 3 }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["statut"], "en_attente_docteur");
    assert_eq!(body["data"]["docteur_id"], 3);
    assert_eq!(body["data"]["docteur"]["nom"], "Doctor3");
    assert_eq!(body["message"], "Appointment assigned to Dr. Doctor3");

    let (status, _) = send(
        secretary_routes(app.state.clone()),
        json_request(Method::PUT, "/appointments/7/assign", Some(&token), Some(json!({ "docteur_id": 2 }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        secretary_routes(app.state.clone()),
        json_request(Method::PUT, "/appointments/6/assign", Some(&token), Some(json!({ "docteur_id": 9 }))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_secretary_listings_and_stats() {
    let app = TestApp::new();
    let patient = app.seed_patient("Durand", "durand@clinic.test").await;
    let doctor = app.seed_doctor("House", "house@clinic.test", Availability::Busy).await;
    app.seed_doctor("Wilson", "wilson@clinic.test", Availability::Free).await;
    let first = app
        .seed_appointment(patient.id, None, AppointmentStatus::Requested, "2026-03-10", "10:00")
        .await;
    let second = app
        .seed_appointment(patient.id, None, AppointmentStatus::Requested, "2026-02-01", "10:00")
        .await;
    app.seed_appointment(patient.id, Some(doctor.id), AppointmentStatus::Accepted, "2026-02-01", "09:00")
        .await;
    let secretary = app.seed_secretary("Petit", "petit@clinic.test").await;
    let token = app.token_for(&secretary).await;

    let (status, body) = send(
        secretary_routes(app.state.clone()),
        json_request(Method::GET, "/requests", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["id"], first.id);
    assert_eq!(body["data"][1]["id"], second.id);

    let (_, body) = send(
        secretary_routes(app.state.clone()),
        json_request(Method::GET, "/appointments?date=2026-02-01", Some(&token), None),
    )
    .await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["heure"], "09:00");
    assert_eq!(body["data"][0]["docteur"]["nom"], "House");

    let (_, body) = send(
        secretary_routes(app.state.clone()),
        json_request(Method::GET, "/appointments?statut=en_attente_secretaire&date=", Some(&token), None),
    )
    .await;
    assert_eq!(body["count"], 2);

    let (status, body) = send(
        secretary_routes(app.state.clone()),
        json_request(Method::GET, "/stats", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({
            "total_rendez_vous": 3,
            "en_attente_secretaire": 2,
            "en_attente_docteur": 0,
            "acceptes": 1,
            "refuses": 0,
            "annules": 0,
            "total_patients": 1,
            "total_docteurs": 2,
            "docteurs_libres": 1,
            "docteurs_occupes": 1
        })
    );
}

#[tokio::test]
async fn test_secretary_schedules_edits_and_cancels() {
    let app = TestApp::new();
    let patient = app.seed_patient("Durand", "durand@clinic.test").await;
    let doctor = app.seed_doctor("House", "house@clinic.test", Availability::Free).await;
    let secretary = app.seed_secretary("Petit", "petit@clinic.test").await;
    let token = app.token_for(&secretary).await;

    let (status, body) = send(
        secretary_routes(app.state.clone()),
        json_request(
            Method::POST,
            "/appointments",
            Some(&token),
            Some(json!({
                "patient_id": patient.id,
                "docteur_id": doctor.id,
                "date": "2026-04-02",
                "heure": "14:00",
                "symptomes": "follow-up"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["statut"], "en_attente_docteur");
    assert_eq!(body["data"]["patient"]["nom"], "Durand");
    let uri = format!("/appointments/{}", body["data"]["id"]);

    let (status, body) = send(
        secretary_routes(app.state.clone()),
        json_request(Method::PUT, &uri, Some(&token), Some(json!({ "heure": "15:30", "statut": "accepte" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["heure"], "15:30");
    assert_eq!(body["data"]["statut"], "accepte");

    let (status, _) = send(
        secretary_routes(app.state.clone()),
        json_request(Method::PUT, &uri, Some(&token), Some(json!({ "docteur_id": null }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        secretary_routes(app.state.clone()),
        json_request(Method::DELETE, &uri, Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["statut"], "annule");

    let (status, _) = send(
        secretary_routes(app.state.clone()),
        json_request(Method::DELETE, &uri, Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
