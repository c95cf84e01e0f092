// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use attendance_api::{
    ActionHistoryResponse, AttendanceView, CommandResponse, EventAttendanceResponse,
    ExecutionConfig, FinalizationRegistry, FinalizeEventResponse,
};
use attendance_audit::ActionType;
use attendance_domain::{AttendanceStatus, Role};
use attendance_persistence::Persistence;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::live::{LiveEvent, LiveEventBroadcaster};
use crate::store::PersistenceStore;
use crate::{AppState, ErrorResponse, build_router};

const EVENT: &str = "wedding-2025-02-14";
const VENDOR: &str = "vendor-dj";
const CUSTOMER: &str = "customer-ann";
const ADMIN: &str = "admin-ops";

/// Helper to create test app state with in-memory persistence.
fn create_test_app_state() -> AppState {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    AppState {
        persistence: PersistenceStore::shared(persistence),
        registry: Arc::new(FinalizationRegistry::new()),
        broadcaster: Arc::new(LiveEventBroadcaster::new()),
        config: ExecutionConfig::default(),
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn finalize(app: &Router) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        &format!("/events/{EVENT}/finalized"),
        Some(json!({ "actor_id": ADMIN, "actor_role": "admin" })),
    )
    .await
}

async fn open_record(app: &Router, vendor: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/attendance",
        Some(json!({
            "actor_id": ADMIN,
            "actor_role": "admin",
            "request_id": format!("open-{vendor}"),
            "event_id": EVENT,
            "vendor_id": vendor,
            "customer_id": CUSTOMER,
            "scheduled_start": "2025-02-14T10:00:00",
            "scheduled_end": "2025-02-14T22:00:00",
            "timezone": "UTC",
        })),
    )
    .await
}

async fn mark(
    app: &Router,
    which: &str,
    request_id: &str,
    claimed_at: &str,
) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        &format!("/attendance/{EVENT}/{VENDOR}/{which}"),
        Some(json!({
            "actor_id": VENDOR,
            "actor_role": "vendor",
            "request_id": request_id,
            "claimed_at": claimed_at,
            "latitude": 12.9716,
            "longitude": 77.5946,
        })),
    )
    .await
}

async fn vendor_mark_in(app: &Router, vendor: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        &format!("/attendance/{EVENT}/{vendor}/mark-in"),
        Some(json!({
            "actor_id": vendor,
            "actor_role": "vendor",
            "request_id": format!("{vendor}-in"),
            "claimed_at": "2025-02-14T10:05:00Z",
        })),
    )
    .await
}

async fn review(
    app: &Router,
    which: &str,
    actor: (&str, &str),
    request_id: &str,
    fields: Value,
) -> (StatusCode, Value) {
    let mut body = json!({
        "actor_id": actor.0,
        "actor_role": actor.1,
        "request_id": request_id,
    });
    if let (Some(body), Some(fields)) = (body.as_object_mut(), fields.as_object()) {
        body.extend(fields.clone());
    }
    send(
        app,
        "POST",
        &format!("/attendance/{EVENT}/{VENDOR}/{which}"),
        Some(body),
    )
    .await
}

fn error_kind(body: Value) -> String {
    serde_json::from_value::<ErrorResponse>(body).unwrap().error
}

#[tokio::test]
async fn test_full_attendance_flow_over_http() {
    let app: Router = build_router(create_test_app_state());
    assert_eq!(finalize(&app).await.0, StatusCode::OK);

    let (status, body) = open_record(&app, VENDOR).await;
    assert_eq!(status, StatusCode::OK);
    let opened: AttendanceView = serde_json::from_value(body).unwrap();
    assert_eq!(opened.status, AttendanceStatus::NotStarted);
    assert!(opened.is_finalized);

    let (status, body) = mark(&app, "mark-in", "vendor-in", "2025-02-14T10:15:00Z").await;
    assert_eq!(status, StatusCode::OK);
    let response: CommandResponse = serde_json::from_value(body).unwrap();
    assert_eq!(response.attendance.delay_minutes, Some(15));
    assert!(response.action.location.is_some());

    let customer = (CUSTOMER, "customer");
    let fields: Value = json!({ "fact": "mark_in" });
    let (status, _) = review(&app, "confirm", customer, "customer-in", fields).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = mark(&app, "mark-out", "vendor-out", "2025-02-14T22:30:00Z").await;
    assert_eq!(status, StatusCode::OK);
    let response: CommandResponse = serde_json::from_value(body).unwrap();
    assert_eq!(response.attendance.overtime_minutes, Some(30));

    let fields: Value = json!({ "fact": "mark_out" });
    let (status, _) = review(&app, "confirm", customer, "customer-out", fields).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", &format!("/attendance/{EVENT}/{VENDOR}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let view: AttendanceView = serde_json::from_value(body).unwrap();
    assert_eq!(view.status, AttendanceStatus::MarkOutConfirmed);
    assert_eq!(view.service_duration_minutes, Some(735));

    let (status, body) = send(
        &app,
        "GET",
        &format!("/attendance/{EVENT}/{VENDOR}/actions"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let history: ActionHistoryResponse = serde_json::from_value(body).unwrap();
    let types: Vec<ActionType> = history.actions.iter().map(|a| a.action_type).collect();
    assert_eq!(
        types,
        vec![
            ActionType::MarkIn,
            ActionType::ConfirmMarkIn,
            ActionType::MarkOut,
            ActionType::ConfirmMarkOut,
        ]
    );
    assert_eq!(history.actions[1].actor_role, Role::Customer);
}

#[tokio::test]
async fn test_commands_are_locked_until_event_is_finalized() {
    let app: Router = build_router(create_test_app_state());

    let (status, body) = open_record(&app, VENDOR).await;

    assert_eq!(status, StatusCode::LOCKED);
    assert_eq!(error_kind(body), "not_finalized");
}

#[tokio::test]
async fn test_vendor_cannot_confirm_own_submission() {
    let app: Router = build_router(create_test_app_state());
    finalize(&app).await;
    open_record(&app, VENDOR).await;
    mark(&app, "mark-in", "vendor-in", "2025-02-14T10:15:00Z").await;

    let (status, body) = review(
        &app,
        "confirm",
        (VENDOR, "vendor"),
        "vendor-confirm",
        json!({ "fact": "mark_in" }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_kind(body), "unauthorized");
}

#[tokio::test]
async fn test_unknown_role_is_unauthenticated() {
    let app: Router = build_router(create_test_app_state());
    finalize(&app).await;
    open_record(&app, VENDOR).await;

    let (status, body) = review(
        &app,
        "confirm",
        (CUSTOMER, "planner"),
        "planner-confirm",
        json!({ "fact": "mark_in" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_kind(body), "authentication_failed");
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let app: Router = build_router(create_test_app_state());

    let (status, body) = send(&app, "GET", &format!("/attendance/{EVENT}/nobody"), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_kind(body), "not_found");
}

#[tokio::test]
async fn test_out_of_order_command_is_conflict() {
    let app: Router = build_router(create_test_app_state());
    finalize(&app).await;
    open_record(&app, VENDOR).await;

    let (status, body) = mark(&app, "mark-out", "vendor-out", "2025-02-14T22:30:00Z").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_kind(body), "invalid_state");
}

#[tokio::test]
async fn test_blank_dispute_reason_is_bad_request() {
    let app: Router = build_router(create_test_app_state());
    finalize(&app).await;
    open_record(&app, VENDOR).await;
    mark(&app, "mark-in", "vendor-in", "2025-02-14T10:15:00Z").await;

    let (status, body) = review(
        &app,
        "dispute",
        (CUSTOMER, "customer"),
        "customer-dispute",
        json!({ "fact": "mark_in", "reason": "   " }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(body), "invalid_input");
}

#[tokio::test]
async fn test_dispute_freezes_record() {
    let app: Router = build_router(create_test_app_state());
    finalize(&app).await;
    open_record(&app, VENDOR).await;
    mark(&app, "mark-in", "vendor-in", "2025-02-14T10:15:00Z").await;

    let (status, body) = review(
        &app,
        "dispute",
        (CUSTOMER, "customer"),
        "customer-dispute",
        json!({ "fact": "mark_in", "reason": "Vendor arrived at 10:40" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let response: CommandResponse = serde_json::from_value(body).unwrap();
    assert!(response.attendance.is_disputed);

    let (status, _) = review(
        &app,
        "confirm",
        (ADMIN, "admin"),
        "admin-confirm",
        json!({ "fact": "mark_in" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_retried_request_is_replayed() {
    let app: Router = build_router(create_test_app_state());
    finalize(&app).await;
    open_record(&app, VENDOR).await;

    let (first_status, first) = mark(&app, "mark-in", "vendor-in", "2025-02-14T10:15:00Z").await;
    let (second_status, second) = mark(&app, "mark-in", "vendor-in", "2025-02-14T10:15:00Z").await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    let first: CommandResponse = serde_json::from_value(first).unwrap();
    let second: CommandResponse = serde_json::from_value(second).unwrap();
    assert!(!first.replayed);
    assert!(second.replayed);
    assert_eq!(first.action, second.action);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/attendance/{EVENT}/{VENDOR}/actions"),
        None,
    )
    .await;
    let history: ActionHistoryResponse = serde_json::from_value(body).unwrap();
    assert_eq!(history.actions.len(), 1);
}

#[tokio::test]
async fn test_duplicate_record_is_conflict() {
    let app: Router = build_router(create_test_app_state());
    finalize(&app).await;
    open_record(&app, VENDOR).await;

    let (status, body) = open_record(&app, VENDOR).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_kind(body), "duplicate");
}

#[tokio::test]
async fn test_only_admin_finalizes_events() {
    let app_state: AppState = create_test_app_state();
    let app: Router = build_router(app_state.clone());

    let (status, _) = send(
        &app,
        "POST",
        &format!("/events/{EVENT}/finalized"),
        Some(json!({ "actor_id": CUSTOMER, "actor_role": "customer" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = finalize(&app).await;
    assert_eq!(status, StatusCode::OK);
    let response: FinalizeEventResponse = serde_json::from_value(body).unwrap();
    assert!(response.newly_finalized);

    let (_, body) = finalize(&app).await;
    let response: FinalizeEventResponse = serde_json::from_value(body).unwrap();
    assert!(!response.newly_finalized);
}

#[tokio::test]
async fn test_event_listing_over_http() {
    let app: Router = build_router(create_test_app_state());
    finalize(&app).await;
    open_record(&app, "vendor-photo").await;
    open_record(&app, "vendor-cake").await;

    let (status, body) = send(&app, "GET", &format!("/events/{EVENT}/attendance"), None).await;

    assert_eq!(status, StatusCode::OK);
    let listing: EventAttendanceResponse = serde_json::from_value(body).unwrap();
    assert!(listing.is_finalized);
    let vendors: Vec<&str> = listing.records.iter().map(|r| r.vendor_id.as_str()).collect();
    assert_eq!(vendors, vec!["vendor-cake", "vendor-photo"]);
}

#[tokio::test]
async fn test_accepted_submission_is_broadcast() {
    let app_state: AppState = create_test_app_state();
    let mut rx = app_state.broadcaster.subscribe();
    let app: Router = build_router(app_state);

    finalize(&app).await;
    open_record(&app, VENDOR).await;
    mark(&app, "mark-in", "vendor-in", "2025-02-14T10:15:00Z").await;

    assert_eq!(
        rx.try_recv().unwrap(),
        LiveEvent::EventFinalized {
            event_id: String::from(EVENT)
        }
    );
    let LiveEvent::AttendanceChanged { notification } = rx.try_recv().unwrap() else {
        panic!("expected an attendance notification");
    };
    assert_eq!(notification.action_type, ActionType::MarkIn);
    assert_eq!(notification.recipient, Role::Customer);
    assert_eq!(notification.recipient_id, CUSTOMER);
}

#[tokio::test]
async fn test_file_store_runs_commands_on_separate_records_concurrently() {
    let path: std::path::PathBuf = std::env::temp_dir().join(format!(
        "attendance-server-store-{}.db",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let app_state = AppState {
        persistence: PersistenceStore::file(path.clone()).unwrap(),
        registry: Arc::new(FinalizationRegistry::new()),
        broadcaster: Arc::new(LiveEventBroadcaster::new()),
        config: ExecutionConfig::default(),
    };
    let app: Router = build_router(app_state);
    finalize(&app).await;
    open_record(&app, "vendor-photo").await;
    open_record(&app, "vendor-cake").await;

    let (photo, cake) = tokio::join!(
        vendor_mark_in(&app, "vendor-photo"),
        vendor_mark_in(&app, "vendor-cake")
    );
    assert_eq!(photo.0, StatusCode::OK);
    assert_eq!(cake.0, StatusCode::OK);

    let (status, body) = send(&app, "GET", &format!("/events/{EVENT}/attendance"), None).await;
    assert_eq!(status, StatusCode::OK);
    let listing: EventAttendanceResponse = serde_json::from_value(body).unwrap();
    assert!(
        listing
            .records
            .iter()
            .all(|r| r.status == AttendanceStatus::MarkInSubmitted)
    );
    assert_eq!(listing.records.len(), 2);

    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}

#[test]
fn test_execution_config_follows_cli_flags() {
    use clap::Parser;

    let args = crate::Args::parse_from([
        "attendance-server",
        "--location-timeout-ms",
        "250",
        "--max-conflict-retries",
        "5",
        "--max-clock-skew-secs",
        "60",
    ]);
    let config: ExecutionConfig = args.execution_config();

    assert_eq!(config.max_conflict_retries, 5);
    assert_eq!(config.location_timeout, std::time::Duration::from_millis(250));
    assert_eq!(config.policy.max_clock_skew, time::Duration::seconds(60));
    assert_eq!(args.port, 3000);
    assert_eq!(args.bind.to_string(), "127.0.0.1");
}
