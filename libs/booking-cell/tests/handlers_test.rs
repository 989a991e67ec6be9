// libs/booking-cell/tests/handlers_test.rs
// Handler tests against a wiremock stand-in for the Supabase REST API.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::{Extension, Path, Query, State},
    http::{Request, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::handlers::*;
use booking_cell::models::{Booking, PaymentConfirmation};
use booking_cell::router::booking_routes;
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig, TestUser};

fn config_for(mock_server: &MockServer) -> Arc<AppConfig> {
    TestConfig::with_mock_server(&mock_server.uri()).to_arc()
}

fn booking_request(patient: &str) -> Booking {
    serde_json::from_value(json!({
        "treatment": "Cleaning",
        "date": "Jan 1, 2023",
        "slot": "09:00 AM",
        "patient": patient,
        "patientName": "Ann",
        "price": 25.0
    }))
    .unwrap()
}

#[tokio::test]
async fn test_list_services_returns_names() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .and(query_param("select", "id,name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "svc-1", "name": "Cleaning"},
            {"id": "svc-2", "name": "Whitening"}
        ])))
        .mount(&mock_server)
        .await;

    let services = list_services(State(config_for(&mock_server))).await.unwrap().0;

    assert_eq!(services.len(), 2);
    assert_eq!(services[0].name, "Cleaning");
    assert_eq!(services[1].id.as_deref(), Some("svc-2"));
}

#[tokio::test]
async fn test_get_available_removes_booked_slots() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::service_response("Cleaning", &["08:00 AM", "09:00 AM", "10:00 AM"]),
            MockSupabaseResponses::service_response("Whitening", &["08:00 AM", "09:00 AM"])
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("date", "eq.Jan 1, 2023"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::booking_response("Cleaning", "Jan 1, 2023", "a@x.com", "09:00 AM")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = AvailabilityQuery { date: Some("Jan 1, 2023".to_string()) };
    let views = get_available(State(config_for(&mock_server)), Query(query)).await.unwrap().0;

    assert_eq!(views.len(), 2);
    assert_eq!(views[0].slots, vec!["08:00 AM", "10:00 AM"]);
    assert_eq!(views[1].slots, vec!["08:00 AM", "09:00 AM"]);
}

#[tokio::test]
async fn test_get_available_surfaces_store_outage() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&mock_server)
        .await;

    let query = AvailabilityQuery { date: Some("Jan 1, 2023".to_string()) };
    let result = get_available(State(config_for(&mock_server)), Query(query)).await;

    assert!(matches!(result, Err(AppError::Database(_))));
}

#[tokio::test]
async fn test_create_booking_admits_new_booking() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("treatment", "eq.Cleaning"))
        .and(query_param("patient", "eq.a@x.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("on_conflict", "treatment,date,patient"))
        .and(body_partial_json(json!({"treatment": "Cleaning", "patient": "a@x.com", "paid": false})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {
                "id": "booking-1",
                "treatment": "Cleaning",
                "date": "Jan 1, 2023",
                "slot": "09:00 AM",
                "patient": "a@x.com",
                "patientName": "Ann",
                "price": 25.0,
                "paid": false
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(header("authorization", "Bearer test-email-key"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&mock_server)
        .await;

    let body = create_booking(State(config_for(&mock_server)), Json(booking_request("a@x.com")))
        .await
        .unwrap()
        .0;

    assert_eq!(body["success"], true);
    assert_eq!(body["result"]["id"], "booking-1");
    assert_eq!(body["result"]["patientName"], "Ann");
}

#[tokio::test]
async fn test_create_booking_sends_confirmation_email() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::booking_response("Cleaning", "Jan 1, 2023", "a@x.com", "09:00 AM")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(body_partial_json(json!({
            "personalizations": [{"to": [{"email": "a@x.com"}]}],
            "from": {"email": "clinic@example.com"}
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = create_booking(State(config_for(&mock_server)), Json(booking_request("a@x.com")))
        .await
        .unwrap()
        .0;
    assert_eq!(body["success"], true);

    // The confirmation is sent from a detached task.
    for _ in 0..50 {
        let received = mock_server.received_requests().await.unwrap_or_default();
        if received.iter().any(|r| r.url.path() == "/v3/mail/send") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn test_create_booking_rejects_duplicate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "booking-1",
                "treatment": "Cleaning",
                "date": "Jan 1, 2023",
                "slot": "09:00 AM",
                "patient": "a@x.com",
                "patientName": "Ann",
                "paid": false
            }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&mock_server)
        .await;

    let body = create_booking(State(config_for(&mock_server)), Json(booking_request("a@x.com")))
        .await
        .unwrap()
        .0;

    assert_eq!(body["success"], false);
    assert_eq!(body["booking"]["id"], "booking-1");
}

#[tokio::test]
async fn test_create_booking_lost_insert_race_returns_winner() {
    let mock_server = MockServer::start().await;

    // First lookup sees nothing; the competing request commits before our insert.
    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("patient", "eq.a@x.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("on_conflict", "treatment,date,patient"))
        .and(|req: &wiremock::Request| {
            req.headers
                .get("prefer")
                .and_then(|value| value.to_str().ok())
                == Some("return=representation,resolution=ignore-duplicates")
        })
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("patient", "eq.a@x.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "booking-winner",
                "treatment": "Cleaning",
                "date": "Jan 1, 2023",
                "slot": "10:00 AM",
                "patient": "a@x.com",
                "patientName": "Ann",
                "paid": false
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&mock_server)
        .await;

    let body = create_booking(State(config_for(&mock_server)), Json(booking_request("a@x.com")))
        .await
        .unwrap()
        .0;

    assert_eq!(body["success"], false);
    assert_eq!(body["booking"]["id"], "booking-winner");
    assert_eq!(body["booking"]["slot"], "10:00 AM");

    tokio::time::sleep(Duration::from_millis(50)).await;
    let received = mock_server.received_requests().await.unwrap_or_default();
    assert!(!received.iter().any(|r| r.url.path() == "/v3/mail/send"));
}

#[tokio::test]
async fn test_booking_route_accepts_null_patient_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .and(body_partial_json(json!({"patient": "a@x.com", "patientName": ""})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::booking_response("Cleaning", "Jan 1, 2023", "a@x.com", "09:00 AM")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&mock_server)
        .await;

    let payload = json!({
        "treatment": "Cleaning",
        "date": "Jan 1, 2023",
        "slot": "09:00 AM",
        "patient": "a@x.com",
        "patientName": null
    });
    let request = Request::builder()
        .method("POST")
        .uri("/booking")
        .header("Content-Type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = booking_routes(config_for(&mock_server)).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_create_booking_strict_mode_rejects_partial_payload() {
    let mock_server = MockServer::start().await;
    let mut config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    config.strict_booking_validation = true;

    let partial: Booking = serde_json::from_value(json!({"treatment": "Cleaning"})).unwrap();
    let result = create_booking(State(Arc::new(config)), Json(partial)).await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn test_patient_bookings_require_matching_email() {
    let mock_server = MockServer::start().await;
    let user = TestUser::patient("a@x.com").to_user();

    let query = PatientBookingsQuery { patient: Some("b@x.com".to_string()) };
    let result = get_patient_bookings(State(config_for(&mock_server)), Extension(user), Query(query)).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_patient_bookings_for_own_email() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("patient", "eq.a@x.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::booking_response("Cleaning", "Jan 1, 2023", "a@x.com", "09:00 AM"),
            MockSupabaseResponses::booking_response("Whitening", "Jan 2, 2023", "a@x.com", "10:00 AM")
        ])))
        .mount(&mock_server)
        .await;

    let user = TestUser::patient("a@x.com").to_user();
    let query = PatientBookingsQuery { patient: Some("a@x.com".to_string()) };
    let bookings = get_patient_bookings(State(config_for(&mock_server)), Extension(user), Query(query))
        .await
        .unwrap()
        .0;

    assert_eq!(bookings.len(), 2);
    assert!(bookings.iter().all(|b| b.patient == "a@x.com"));
}

#[tokio::test]
async fn test_get_booking_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let user = TestUser::patient("a@x.com").to_user();
    let result = get_booking(State(config_for(&mock_server)), Extension(user), Path("missing".to_string())).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_mark_booking_paid_updates_and_records_payment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", "eq.booking-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "booking-1", "treatment": "Cleaning", "date": "Jan 1", "slot": "9AM", "patient": "a@x.com", "patientName": "Ann", "paid": false}
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/bookings"))
        .and(body_partial_json(json!({"paid": true, "transactionId": "pi_123"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "booking-1", "treatment": "Cleaning", "date": "Jan 1", "slot": "9AM", "patient": "a@x.com", "patientName": "Ann", "paid": true, "transactionId": "pi_123"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/payments"))
        .and(body_partial_json(json!({"booking": "booking-1", "transactionId": "pi_123", "amount": 25})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{"id": "payment-1"}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let user = TestUser::patient("a@x.com").to_user();
    let confirmation: PaymentConfirmation =
        serde_json::from_value(json!({"transactionId": "pi_123", "amount": 25})).unwrap();

    let updated = mark_booking_paid(
        State(config_for(&mock_server)),
        Extension(user),
        Path("booking-1".to_string()),
        Json(confirmation),
    )
    .await
    .unwrap()
    .0;

    assert!(updated.paid);
    assert_eq!(updated.transaction_id.as_deref(), Some("pi_123"));
}

#[tokio::test]
async fn test_mark_booking_paid_refuses_other_patients_booking() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::booking_response("Cleaning", "Jan 1", "someone@x.com", "9AM")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let user = TestUser::patient("a@x.com").to_user();
    let confirmation: PaymentConfirmation =
        serde_json::from_value(json!({"transactionId": "pi_123"})).unwrap();

    let result = mark_booking_paid(
        State(config_for(&mock_server)),
        Extension(user),
        Path("booking-1".to_string()),
        Json(confirmation),
    )
    .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}
