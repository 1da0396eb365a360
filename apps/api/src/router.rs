use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use admin_cell::router::admin_routes;
use appointment_cell::router::{appointment_routes, secretary_routes};
use auth_cell::{router::auth_routes, AppState};
use doctor_cell::router::{directory_routes, doctor_routes};

async fn status() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Clinic booking API is running"
    }))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(status))
        .nest("/accounts", auth_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/secretary", secretary_routes(state.clone()))
        .nest("/doctor", doctor_routes(state.clone()))
        .nest("/doctors", directory_routes(state.clone()))
        .nest("/admin", admin_routes(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode};

    use auth_cell::test_support::{json_request, send, TestApp, TEST_PASSWORD};
    use shared_models::account::Availability;

    #[tokio::test]
    async fn test_booking_flow_across_cells() {
        let app = TestApp::new();
        let secretary = app.seed_secretary("Petit", "petit@clinic.test").await;
        let doctor = app.seed_doctor("House", "house@clinic.test", Availability::Free).await;
        let router = || create_router(app.state.clone());

        let (status, _) = send(
            router(),
            json_request(
                Method::POST,
                "/accounts/patient",
                None,
                Some(json!({
                    "nom": "Durand",
                    "prenom": "Claire",
                    "email": "claire@clinic.test",
                    "mot_de_passe": TEST_PASSWORD
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            router(),
            json_request(
                Method::POST,
                "/accounts/patient/login",
                None,
                Some(json!({ "email": "claire@clinic.test", "mot_de_passe": TEST_PASSWORD })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let patient_token = body["data"]["token"].as_str().unwrap().to_string();

        let (status, body) = send(
            router(),
            json_request(
                Method::POST,
                "/appointments",
                Some(&patient_token),
                Some(json!({ "date": "2026-02-15", "heure": "10:00", "symptomes": "fever" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["data"]["id"].as_i64().unwrap();

        let secretary_token = app.token_for(&secretary).await;
        let (status, body) = send(
            router(),
            json_request(
                Method::PUT,
                &format!("/secretary/appointments/{}/assign", id),
                Some(&secretary_token),
                Some(json!({ "docteur_id": doctor.id })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["statut"], "en_attente_docteur");

        let doctor_token = app.token_for(&doctor).await;
        let (status, body) = send(
            router(),
            json_request(
                Method::PUT,
                &format!("/doctor/appointments/{}/accept", id),
                Some(&doctor_token),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["statut"], "accepte");

        let (_, body) = send(
            router(),
            json_request(Method::GET, "/appointments/mine", Some(&patient_token), None),
        )
        .await;
        assert_eq!(body["data"][0]["statut"], "accepte");
        assert_eq!(body["data"][0]["docteur"]["nom"], "House");
    }

    #[tokio::test]
    async fn test_status_route_is_public() {
        let app = TestApp::new();
        let (status, body) = send(
            create_router(app.state.clone()),
            json_request(Method::GET, "/", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }
}
