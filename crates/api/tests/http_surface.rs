//! Router-level tests covering role gating and handler wiring.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use bookslot_api::{router, AppState};
use bookslot_core::{
    AvailabilityService, BookingService, Clock, ExternalBusySource, LifecycleService,
};
use bookslot_domain::{
    AppointmentType, BookingConfig, BusyInterval, CalendarConfig, ManualBlock,
};
use bookslot_infra::database::{
    DatabaseManager, SqliteAppointmentRepository, SqliteAppointmentTypeRepository,
    SqliteCredentialStore, SqliteManualBlockRepository, SqliteOutboxRepository,
};
use bookslot_infra::integrations::calendar::CalendarOAuthManager;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

struct NoExternalBusy;

#[async_trait::async_trait]
impl ExternalBusySource for NoExternalBusy {
    async fn busy_between(
        &self,
        _instructor_id: Uuid,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Vec<BusyInterval> {
        Vec::new()
    }
}

struct TestApp {
    _temp_dir: TempDir,
    app: Router,
    types: Arc<SqliteAppointmentTypeRepository>,
}

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, hour, min, 0).unwrap()
}

fn test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("api-test.db");
    let db = DatabaseManager::new(path.to_str().expect("utf-8 path"), 4).expect("database");

    let appointments = Arc::new(SqliteAppointmentRepository::new(db.clone()));
    let types = Arc::new(SqliteAppointmentTypeRepository::new(db.clone()));
    let blocks = Arc::new(SqliteManualBlockRepository::new(db.clone()));
    let credentials = Arc::new(SqliteCredentialStore::new(db.clone()));
    let outbox = Arc::new(SqliteOutboxRepository::new(db.clone()));

    let calendar_config = CalendarConfig {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        redirect_uri: "http://localhost:8080/calendar/callback".to_string(),
        api_base_url: "http://localhost:1/".to_string(),
        auth_base_url: "http://localhost:1/".to_string(),
        state_secret: "state-secret".to_string(),
    };
    let oauth = Arc::new(CalendarOAuthManager::new(calendar_config, credentials).expect("oauth"));

    let clock = Arc::new(FixedClock(at(0, 0)));
    let availability = Arc::new(AvailabilityService::new(
        appointments.clone(),
        blocks.clone(),
        Arc::new(NoExternalBusy),
        BookingConfig::default(),
        clock.clone(),
    ));
    let booking = Arc::new(BookingService::new(
        availability.clone(),
        appointments.clone(),
        types.clone(),
        outbox.clone(),
        clock,
    ));
    let lifecycle = Arc::new(LifecycleService::new(appointments.clone(), outbox));

    let state = AppState {
        availability,
        booking,
        lifecycle,
        oauth,
        appointments,
        appointment_types: types.clone(),
        blocks,
    };

    TestApp { _temp_dir: temp_dir, app: router(state), types }
}

fn seed_type(app: &TestApp, instructor_id: Uuid) -> AppointmentType {
    let atype = AppointmentType {
        id: Uuid::now_v7(),
        instructor_id,
        title: "Lesson".to_string(),
        duration_minutes: 60,
        price_cents: 5000,
        requires_approval: false,
        active: true,
        created_at: at(0, 0),
    };
    app.types.insert(&atype).expect("seed appointment type");
    atype
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn post_json(uri: &str, user_id: Uuid, role: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-user-id", user_id.to_string())
        .header("x-role", role)
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn health_reports_ok() {
    let t = test_app();

    let response = t.app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn slots_listing_requires_no_auth() {
    let t = test_app();
    let instructor = Uuid::now_v7();
    let atype = seed_type(&t, instructor);

    let uri = format!(
        "/instructors/{instructor}/slots?date=2025-06-02&appointment_type_id={}",
        atype.id
    );
    let response = t.app.oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(8));
}

#[tokio::test]
async fn slots_with_foreign_appointment_type_are_rejected() {
    let t = test_app();
    let instructor = Uuid::now_v7();
    let atype = seed_type(&t, Uuid::now_v7());

    let uri = format!(
        "/instructors/{instructor}/slots?date=2025-06-02&appointment_type_id={}",
        atype.id
    );
    let response = t.app.oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_round_trip_returns_created() {
    let t = test_app();
    let instructor = Uuid::now_v7();
    let atype = seed_type(&t, instructor);
    let student = Uuid::now_v7();

    let request = post_json(
        &format!("/instructors/{instructor}/bookings"),
        student,
        "student",
        json!({
            "appointment_type_id": atype.id,
            "start": "2025-06-02T10:00:00Z",
            "end": "2025-06-02T11:00:00Z",
            "student": { "name": "Ada", "email": "ada@example.com" }
        }),
    );

    let response = t.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["student_id"], json!(student.to_string()));
}

#[tokio::test]
async fn double_booking_returns_conflict() {
    let t = test_app();
    let instructor = Uuid::now_v7();
    let atype = seed_type(&t, instructor);

    let make = |student: Uuid| {
        post_json(
            &format!("/instructors/{instructor}/bookings"),
            student,
            "student",
            json!({
                "appointment_type_id": atype.id,
                "start": "2025-06-02T10:00:00Z",
                "end": "2025-06-02T11:00:00Z",
                "student": { "name": "Ada", "email": "ada@example.com" }
            }),
        )
    };

    let first = t.app.clone().oneshot(make(Uuid::now_v7())).await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = t.app.oneshot(make(Uuid::now_v7())).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn students_cannot_create_blocks() {
    let t = test_app();
    let instructor = Uuid::now_v7();

    let request = post_json(
        &format!("/instructors/{instructor}/blocks"),
        Uuid::now_v7(),
        "student",
        json!({ "start": "2025-06-02T09:00:00Z", "end": "2025-06-02T12:00:00Z" }),
    );

    let response = t.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn instructors_manage_their_own_blocks() {
    let t = test_app();
    let instructor = Uuid::now_v7();

    let request = post_json(
        &format!("/instructors/{instructor}/blocks"),
        instructor,
        "instructor",
        json!({ "start": "2025-06-02T09:00:00Z", "end": "2025-06-02T12:00:00Z" }),
    );

    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let block: ManualBlock = serde_json::from_value(body_json(response).await).unwrap();

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/instructors/{instructor}/blocks/{}", block.id))
        .header("x-user-id", instructor.to_string())
        .header("x-role", "instructor")
        .body(Body::empty())
        .unwrap();
    let response = t.app.oneshot(delete).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn foreign_instructor_blocks_are_forbidden() {
    let t = test_app();
    let instructor = Uuid::now_v7();

    let request = post_json(
        &format!("/instructors/{instructor}/blocks"),
        Uuid::now_v7(),
        "instructor",
        json!({ "start": "2025-06-02T09:00:00Z", "end": "2025-06-02T12:00:00Z" }),
    );

    let response = t.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_identity_headers_are_forbidden() {
    let t = test_app();
    let instructor = Uuid::now_v7();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/instructors/{instructor}/blocks"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "start": "2025-06-02T09:00:00Z", "end": "2025-06-02T12:00:00Z" }).to_string(),
        ))
        .unwrap();

    let response = t.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn connect_returns_authorization_url_for_instructors() {
    let t = test_app();
    let instructor = Uuid::now_v7();

    let request = Request::builder()
        .uri("/calendar/connect")
        .header("x-user-id", instructor.to_string())
        .header("x-role", "instructor")
        .body(Body::empty())
        .unwrap();

    let response = t.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let url = body["authorization_url"].as_str().expect("url in body");
    assert!(url.contains("state="));
    assert!(url.contains("client_id=client"));
}

#[tokio::test]
async fn callback_with_garbage_state_is_forbidden() {
    let t = test_app();

    let response =
        t.app.oneshot(get("/calendar/callback?code=abc&state=not-a-token")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn confirm_requires_the_owning_instructor() {
    let t = test_app();
    let instructor = Uuid::now_v7();
    let atype = AppointmentType {
        id: Uuid::now_v7(),
        instructor_id: instructor,
        title: "Lesson".to_string(),
        duration_minutes: 60,
        price_cents: 5000,
        requires_approval: true,
        active: true,
        created_at: at(0, 0),
    };
    t.types.insert(&atype).expect("seed appointment type");

    let booking = post_json(
        &format!("/instructors/{instructor}/bookings"),
        Uuid::now_v7(),
        "student",
        json!({
            "appointment_type_id": atype.id,
            "start": "2025-06-02T10:00:00Z",
            "end": "2025-06-02T11:00:00Z",
            "student": { "name": "Ada", "email": "ada@example.com" }
        }),
    );
    let response = t.app.clone().oneshot(booking).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "pending");
    let appointment_id = body["id"].as_str().unwrap().to_string();

    // A different instructor cannot confirm.
    let foreign = post_json(
        &format!("/appointments/{appointment_id}/confirm"),
        Uuid::now_v7(),
        "instructor",
        json!({}),
    );
    let response = t.app.clone().oneshot(foreign).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let own = post_json(
        &format!("/appointments/{appointment_id}/confirm"),
        instructor,
        "instructor",
        json!({}),
    );
    let response = t.app.clone().oneshot(own).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "confirmed");

    // Confirming twice violates the transition table.
    let again = post_json(
        &format!("/appointments/{appointment_id}/confirm"),
        instructor,
        "instructor",
        json!({}),
    );
    let response = t.app.oneshot(again).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn student_can_cancel_their_own_booking_only() {
    let t = test_app();
    let instructor = Uuid::now_v7();
    let atype = seed_type(&t, instructor);
    let student = Uuid::now_v7();

    let booking = post_json(
        &format!("/instructors/{instructor}/bookings"),
        student,
        "student",
        json!({
            "appointment_type_id": atype.id,
            "start": "2025-06-02T10:00:00Z",
            "end": "2025-06-02T11:00:00Z",
            "student": { "name": "Ada", "email": "ada@example.com" }
        }),
    );
    let response = t.app.clone().oneshot(booking).await.unwrap();
    let appointment_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let other_student = post_json(
        &format!("/appointments/{appointment_id}/cancel"),
        Uuid::now_v7(),
        "student",
        json!({}),
    );
    let response = t.app.clone().oneshot(other_student).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let owner = post_json(
        &format!("/appointments/{appointment_id}/cancel"),
        student,
        "student",
        json!({}),
    );
    let response = t.app.oneshot(owner).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "cancelled");
}
