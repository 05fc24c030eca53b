//! HTTP API tests against the router, without a socket.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use dose_tracker_core::{DoseTracker, MedicineRegistry};
use dose_tracker_server::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let tracker = DoseTracker::open_in_memory(MedicineRegistry::default()).unwrap();
    router(AppState::new(tracker))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Sign up, log in and return the bearer token.
async fn sign_in(app: &Router, email: &str) -> String {
    let credentials = json!({ "email": email, "password": "hunter22" });
    let (status, _) = send(app, Method::POST, "/api/auth/signup", None, Some(credentials.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, Method::POST, "/api/auth/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn new_patient(app: &Router, token: &str, name: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/patients",
        Some(token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_requires_bearer_token() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/patients", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::GET, "/api/patients", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_conflict_and_bad_login() {
    let app = app();
    sign_in(&app, "carer@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "email": "Carer@example.com", "password": "whatever1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "carer@example.com", "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_body_hides_password_hash() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "email": "carer@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "carer@example.com");
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_logout_invalidates_token() {
    let app = app();
    let token = sign_in(&app, "carer@example.com").await;

    let (status, body) = send(&app, Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(&app, Method::GET, "/api/patients", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_medicines_listing() {
    let app = app();
    let token = sign_in(&app, "carer@example.com").await;

    let (status, body) = send(&app, Method::GET, "/api/medicines", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let medicines = body.as_array().unwrap();
    assert_eq!(medicines.len(), MedicineRegistry::default().len());
    let motrin = medicines.iter().find(|m| m["name"] == "Motrin").unwrap();
    assert_eq!(motrin["intervalHours"], 6);
}

#[tokio::test]
async fn test_patients_are_scoped_to_user() {
    let app = app();
    let alice = sign_in(&app, "alice@example.com").await;
    let bob = sign_in(&app, "bob@example.com").await;

    let first = new_patient(&app, &alice, "Emma").await;
    new_patient(&app, &bob, "Liam").await;
    let second = new_patient(&app, &alice, "Noah").await;

    let (status, body) = send(&app, Method::GET, "/api/patients", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![first, second]);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/patients/{}", first),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Emma");

    let (status, _) = send(&app, Method::GET, "/api/patients/9999", Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/patients/abc", Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_entry_validation() {
    let app = app();
    let token = sign_in(&app, "carer@example.com").await;
    let patient = new_patient(&app, &token, "Emma").await;

    // Temperature type without a temperature
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(&token),
        Some(json!({ "patientId": patient, "type": "temperature" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("temperature is required"));

    // Unknown medicine
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(&token),
        Some(json!({ "patientId": patient, "type": "medicine", "medicine": "Tylenl" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Tylenol"));

    // Malformed body
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(&token),
        Some(json!({ "type": "medicine", "medicine": "Motrin" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/patients/{}/entries", patient),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_recorded_at_outside_four_digit_years_rejected() {
    let app = app();
    let token = sign_in(&app, "carer@example.com").await;
    let patient = new_patient(&app, &token, "Emma").await;

    for recorded_at in ["+10000-01-01T00:00:00Z", "-0001-01-01T00:00:00Z"] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/entries",
            Some(&token),
            Some(json!({
                "patientId": patient,
                "type": "temperature",
                "temperature": 99.1,
                "recordedAt": recorded_at
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", recorded_at);
        assert!(body["error"].as_str().unwrap().contains("Recorded time"));
    }

    let (status, entry) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(&token),
        Some(json!({
            "patientId": patient,
            "type": "temperature",
            "temperature": 99.1,
            "recordedAt": "2024-01-01T08:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/entries/{}", entry["id"].as_i64().unwrap()),
        Some(&token),
        Some(json!({
            "type": "temperature",
            "temperature": 99.5,
            "recordedAt": "+10000-01-01T00:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The stored entry is untouched and still readable
    let (status, entries) = send(
        &app,
        Method::GET,
        &format!("/api/patients/{}/entries", patient),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["recordedAt"], "2024-01-01T08:00:00Z");
}

#[tokio::test]
async fn test_entry_crud_and_timeline() {
    let app = app();
    let token = sign_in(&app, "carer@example.com").await;
    let patient = new_patient(&app, &token, "Emma").await;

    let (status, morning) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(&token),
        Some(json!({
            "patientId": patient,
            "type": "medicine",
            "medicine": "Motrin",
            "recordedAt": "2024-01-01T08:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(morning["wasGiven"], false);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(&token),
        Some(json!({
            "patientId": patient,
            "type": "medicine",
            "medicine": "Motrin",
            "recordedAt": "2024-01-01T14:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, fever) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(&token),
        Some(json!({
            "patientId": patient,
            "type": "temperature",
            "temperature": 102.4,
            "recordedAt": "2024-01-01T13:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, timeline) = send(
        &app,
        Method::GET,
        &format!("/api/patients/{}/timeline", patient),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let upcoming = timeline["upcoming"].as_array().unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0]["lastDose"]["recordedAt"], "2024-01-01T14:00:00Z");
    assert_eq!(upcoming[0]["schedule"]["isOverdue"], true);
    assert_eq!(timeline["past"].as_array().unwrap().len(), 2);
    assert_eq!(timeline["past"][1]["entry"]["wasGiven"], true);
    assert_eq!(timeline["temperatures"][0]["severity"], "high_alert");

    // Correct the reading
    let fever_id = fever["id"].as_i64().unwrap();
    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/entries/{}", fever_id),
        Some(&token),
        Some(json!({
            "type": "temperature",
            "temperature": 100.5,
            "recordedAt": "2024-01-01T13:30:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["temperature"], 100.5);
    assert_eq!(updated["recordedAt"], "2024-01-01T13:30:00Z");

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/entries/9999",
        Some(&token),
        Some(json!({
            "type": "temperature",
            "temperature": 99.0,
            "recordedAt": "2024-01-01T13:30:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Deleting is idempotent
    for _ in 0..2 {
        let (status, body) = send(
            &app,
            Method::DELETE,
            &format!("/api/entries/{}", fever_id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    let (_, entries) = send(
        &app,
        Method::GET,
        &format!("/api/patients/{}/entries", patient),
        Some(&token),
        None,
    )
    .await;
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e["id"].as_i64() != Some(fever_id)));
}

#[tokio::test]
async fn test_give_dose_now_and_early_check() {
    let app = app();
    let token = sign_in(&app, "carer@example.com").await;
    let patient = new_patient(&app, &token, "Emma").await;

    let check_uri = format!("/api/patients/{}/doses/Motrin/early-check", patient);
    let (status, body) = send(&app, Method::GET, &check_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["early"], false);

    let (status, dose) = send(
        &app,
        Method::POST,
        &format!("/api/patients/{}/doses", patient),
        Some(&token),
        Some(json!({ "medicine": "Motrin" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dose["medicine"], "Motrin");

    let (status, body) = send(&app, Method::GET, &check_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["early"], true);
    assert_eq!(body["warning"]["lastDoseId"], dose["id"]);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/patients/{}/doses/Aspirin/early-check", patient),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_patient_removes_entries() {
    let app = app();
    let token = sign_in(&app, "carer@example.com").await;
    let patient = new_patient(&app, &token, "Emma").await;

    send(
        &app,
        Method::POST,
        &format!("/api/patients/{}/doses", patient),
        Some(&token),
        Some(json!({ "medicine": "Tylenol" })),
    )
    .await;

    let uri = format!("/api/patients/{}", patient);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/patients/{}/entries", patient),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
