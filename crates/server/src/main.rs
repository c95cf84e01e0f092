// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod live;
mod store;

#[cfg(test)]
mod tests;

use attendance::{Command, TransitionPolicy};
use attendance_api::{
    ActionHistoryResponse, ApiError, AttendanceView, AuthenticatedActor, Collaborators,
    CommandResponse, ConfirmRequest, CreateAttendanceRequest, DisputeRequest,
    EventAttendanceResponse, ExecutionConfig, FinalizationRegistry, FinalizeEventResponse,
    NoAddressResolver, ReportedLocation, SubmitMarkRequest, authenticate_stub, capture_location,
    confirm_command, create_attendance_record, dispute_command, execute_command, finalize_event,
    get_action_history, get_attendance, list_event_attendance, parse_record_key, parse_role,
    submit_command, translate_domain_error,
};
use attendance_audit::Cause;
use attendance_domain::{Location, MarkKind, RecordKey, Role, validate_identifier};
use attendance_persistence::Persistence;
use axum::{
    Json, Router,
    extract::{FromRef, Path, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use live::{LiveEvent, LiveEventBroadcaster, live_events_handler};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use store::{PersistenceHandle, PersistenceStore};
use time::OffsetDateTime;
use tracing::{error, info};

/// Attendance Server - HTTP server for vendor attendance tracking
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// How long a submission waits for a location fix, in milliseconds
    #[arg(long, default_value_t = 5000)]
    location_timeout_ms: u64,

    /// How often a command is re-applied after losing a concurrent write
    #[arg(long, default_value_t = 2)]
    max_conflict_retries: u32,

    /// How far a vendor's claimed time may run ahead of the server clock, in seconds
    #[arg(long, default_value_t = 300)]
    max_clock_skew_secs: u32,
}

impl Args {
    fn execution_config(&self) -> ExecutionConfig {
        ExecutionConfig {
            max_conflict_retries: self.max_conflict_retries,
            location_timeout: std::time::Duration::from_millis(self.location_timeout_ms),
            policy: TransitionPolicy {
                max_clock_skew: time::Duration::seconds(i64::from(self.max_clock_skew_secs)),
            },
        }
    }
}

/// Application state shared across handlers.
///
/// Each request checks out its own persistence; the finalization registry
/// and the live broadcaster synchronize internally.
#[derive(Clone)]
struct AppState {
    /// Attendance records and their action history.
    persistence: PersistenceStore,
    /// Finalized events.
    registry: Arc<FinalizationRegistry>,
    /// Live notification stream.
    broadcaster: Arc<LiveEventBroadcaster>,
    /// Retry and validation limits.
    config: ExecutionConfig,
}

impl FromRef<AppState> for Arc<LiveEventBroadcaster> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.broadcaster)
    }
}

/// API request for opening an attendance record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CreateAttendanceApiRequest {
    /// The actor performing this action.
    actor_id: String,
    /// The actor's role.
    actor_role: String,
    /// Client-supplied request id.
    request_id: String,
    /// The record to open.
    #[serde(flatten)]
    record: CreateAttendanceRequest,
}

/// API request for submitting a Mark-In or Mark-Out.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MarkApiRequest {
    /// The vendor submitting.
    actor_id: String,
    /// The actor's role.
    actor_role: String,
    /// Client-supplied request id.
    request_id: String,
    /// The claimed instant. Defaults to the server receipt time.
    #[serde(default)]
    claimed_at: Option<String>,
    /// IANA time zone for a local `claimed_at`.
    #[serde(default)]
    timezone: Option<String>,
    /// Device latitude, if the device has a fix.
    #[serde(default)]
    latitude: Option<f64>,
    /// Device longitude, if the device has a fix.
    #[serde(default)]
    longitude: Option<f64>,
    /// Optional notes.
    #[serde(default)]
    notes: Option<String>,
}

/// API request for confirming a submitted fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfirmApiRequest {
    /// The reviewing actor.
    actor_id: String,
    /// The actor's role.
    actor_role: String,
    /// Client-supplied request id.
    request_id: String,
    /// `mark_in` or `mark_out`.
    fact: String,
    /// Optional notes.
    #[serde(default)]
    notes: Option<String>,
}

/// API request for disputing a submitted fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DisputeApiRequest {
    /// The reviewing actor.
    actor_id: String,
    /// The actor's role.
    actor_role: String,
    /// Client-supplied request id.
    request_id: String,
    /// `mark_in` or `mark_out`.
    fact: String,
    /// Why the fact is disputed.
    reason: String,
}

/// API request from the upstream finalization service.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FinalizeApiRequest {
    /// The actor performing this action.
    actor_id: String,
    /// The actor's role.
    actor_role: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// A stable, machine-readable error kind.
    error: String,
    /// Error message naming the failed precondition.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error kind.
    kind: &'static str,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: self.kind.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let (status, kind): (StatusCode, &'static str) = match &err {
            ApiError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "invalid_input"),
            ApiError::AuthenticationFailed { .. } => {
                (StatusCode::UNAUTHORIZED, "authentication_failed")
            }
            ApiError::Unauthorized { .. } => (StatusCode::FORBIDDEN, "unauthorized"),
            ApiError::ResourceNotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::InvalidState { .. } => (StatusCode::CONFLICT, "invalid_state"),
            ApiError::Duplicate { .. } => (StatusCode::CONFLICT, "duplicate"),
            ApiError::ConcurrencyConflict { .. } => (StatusCode::CONFLICT, "concurrency_conflict"),
            ApiError::NotFinalized { .. } => (StatusCode::LOCKED, "not_finalized"),
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };
        Self {
            status,
            kind,
            message: err.to_string(),
        }
    }
}

/// Parses and authenticates the actor named in a request body.
fn authenticate(actor_id: &str, actor_role: &str) -> Result<AuthenticatedActor, HttpError> {
    let role: Role = parse_role(actor_role).map_err(ApiError::from)?;
    Ok(authenticate_stub(actor_id, role).map_err(ApiError::from)?)
}

/// Builds the audit cause for a write request.
fn request_cause(request_id: &str, description: String) -> Result<Cause, HttpError> {
    validate_identifier("Request id", request_id).map_err(translate_domain_error)?;
    Ok(Cause::new(request_id.trim().to_string(), description))
}

/// Runs a command against a record on a checked-out connection.
async fn run_command(
    app_state: &AppState,
    key: &RecordKey,
    command: &Command,
    actor: &AuthenticatedActor,
    cause: &Cause,
    received_at: OffsetDateTime,
) -> Result<Json<CommandResponse>, HttpError> {
    let collaborators: Collaborators<'_> = Collaborators {
        gate: app_state.registry.as_ref(),
        notifications: app_state.broadcaster.as_ref(),
        config: &app_state.config,
    };
    let mut persistence: PersistenceHandle = app_state.persistence.checkout().await?;
    let response: CommandResponse = execute_command(
        &mut persistence,
        &collaborators,
        key,
        command,
        actor,
        cause,
        received_at,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/attendance`.
///
/// Opens an attendance record for a booked vendor.
async fn handle_create_attendance(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateAttendanceApiRequest>,
) -> Result<Json<AttendanceView>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        event_id = %req.record.event_id,
        vendor_id = %req.record.vendor_id,
        "Handling create_attendance request"
    );

    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let cause: Cause = request_cause(&req.request_id, String::from("Open attendance record"))?;

    let mut persistence: PersistenceHandle = app_state.persistence.checkout().await?;
    let view: AttendanceView = create_attendance_record(
        &mut persistence,
        app_state.registry.as_ref(),
        &req.record,
        &actor,
        cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(view))
}

/// Handler for GET `/attendance/{event_id}/{vendor_id}`.
async fn handle_get_attendance(
    AxumState(app_state): AxumState<AppState>,
    Path((event_id, vendor_id)): Path<(String, String)>,
) -> Result<Json<AttendanceView>, HttpError> {
    let key: RecordKey = parse_record_key(&event_id, &vendor_id)?;

    let mut persistence: PersistenceHandle = app_state.persistence.checkout().await?;
    let view: AttendanceView =
        get_attendance(&mut persistence, app_state.registry.as_ref(), &key)?;
    drop(persistence);

    Ok(Json(view))
}

/// Handler for GET `/attendance/{event_id}/{vendor_id}/actions`.
async fn handle_get_actions(
    AxumState(app_state): AxumState<AppState>,
    Path((event_id, vendor_id)): Path<(String, String)>,
) -> Result<Json<ActionHistoryResponse>, HttpError> {
    let key: RecordKey = parse_record_key(&event_id, &vendor_id)?;

    let mut persistence: PersistenceHandle = app_state.persistence.checkout().await?;
    let history: ActionHistoryResponse = get_action_history(&mut persistence, &key)?;
    drop(persistence);

    Ok(Json(history))
}

/// Handler for GET `/events/{event_id}/attendance`.
async fn handle_list_event_attendance(
    AxumState(app_state): AxumState<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<EventAttendanceResponse>, HttpError> {
    let mut persistence: PersistenceHandle = app_state.persistence.checkout().await?;
    let listing: EventAttendanceResponse =
        list_event_attendance(&mut persistence, app_state.registry.as_ref(), &event_id)?;
    drop(persistence);

    Ok(Json(listing))
}

/// Handler for POST `/attendance/{event_id}/{vendor_id}/mark-in`.
async fn handle_mark_in(
    AxumState(app_state): AxumState<AppState>,
    Path((event_id, vendor_id)): Path<(String, String)>,
    Json(req): Json<MarkApiRequest>,
) -> Result<Json<CommandResponse>, HttpError> {
    submit_mark(&app_state, MarkKind::MarkIn, &event_id, &vendor_id, req).await
}

/// Handler for POST `/attendance/{event_id}/{vendor_id}/mark-out`.
async fn handle_mark_out(
    AxumState(app_state): AxumState<AppState>,
    Path((event_id, vendor_id)): Path<(String, String)>,
    Json(req): Json<MarkApiRequest>,
) -> Result<Json<CommandResponse>, HttpError> {
    submit_mark(&app_state, MarkKind::MarkOut, &event_id, &vendor_id, req).await
}

/// Captures the vendor's location and submits a Mark-In or Mark-Out.
///
/// Location capture happens before a connection is checked out so a slow
/// fix never holds one open.
async fn submit_mark(
    app_state: &AppState,
    kind: MarkKind,
    event_id: &str,
    vendor_id: &str,
    req: MarkApiRequest,
) -> Result<Json<CommandResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        request_id = %req.request_id,
        event_id,
        vendor_id,
        fact = %kind,
        "Handling submission"
    );

    let received_at: OffsetDateTime = OffsetDateTime::now_utc();
    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let key: RecordKey = parse_record_key(event_id, vendor_id)?;
    let cause: Cause = request_cause(&req.request_id, format!("Submit {kind}"))?;

    let provider: ReportedLocation = ReportedLocation::from_fields(req.latitude, req.longitude);
    let location: Option<Location> =
        capture_location(&provider, &NoAddressResolver, app_state.config.location_timeout).await;

    let submission: SubmitMarkRequest = SubmitMarkRequest {
        claimed_at: req.claimed_at,
        timezone: req.timezone,
        notes: req.notes,
    };
    let command: Command = submit_command(kind, &submission, location, received_at)?;

    run_command(app_state, &key, &command, &actor, &cause, received_at).await
}

/// Handler for POST `/attendance/{event_id}/{vendor_id}/confirm`.
async fn handle_confirm(
    AxumState(app_state): AxumState<AppState>,
    Path((event_id, vendor_id)): Path<(String, String)>,
    Json(req): Json<ConfirmApiRequest>,
) -> Result<Json<CommandResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        request_id = %req.request_id,
        event_id = %event_id,
        vendor_id = %vendor_id,
        fact = %req.fact,
        "Handling confirmation"
    );

    let received_at: OffsetDateTime = OffsetDateTime::now_utc();
    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let key: RecordKey = parse_record_key(&event_id, &vendor_id)?;
    let cause: Cause = request_cause(&req.request_id, format!("Confirm {}", req.fact))?;
    let command: Command = confirm_command(&ConfirmRequest {
        fact: req.fact,
        notes: req.notes,
    })?;

    run_command(&app_state, &key, &command, &actor, &cause, received_at).await
}

/// Handler for POST `/attendance/{event_id}/{vendor_id}/dispute`.
async fn handle_dispute(
    AxumState(app_state): AxumState<AppState>,
    Path((event_id, vendor_id)): Path<(String, String)>,
    Json(req): Json<DisputeApiRequest>,
) -> Result<Json<CommandResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        request_id = %req.request_id,
        event_id = %event_id,
        vendor_id = %vendor_id,
        fact = %req.fact,
        "Handling dispute"
    );

    let received_at: OffsetDateTime = OffsetDateTime::now_utc();
    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let key: RecordKey = parse_record_key(&event_id, &vendor_id)?;
    let cause: Cause = request_cause(&req.request_id, format!("Dispute {}", req.fact))?;
    let command: Command = dispute_command(&DisputeRequest {
        fact: req.fact,
        reason: req.reason,
    })?;

    run_command(&app_state, &key, &command, &actor, &cause, received_at).await
}

/// Handler for POST `/events/{event_id}/finalized`.
///
/// Called by the upstream finalization service once an event's vendor
/// roster is final.
async fn handle_finalize_event(
    AxumState(app_state): AxumState<AppState>,
    Path(event_id): Path<String>,
    Json(req): Json<FinalizeApiRequest>,
) -> Result<Json<FinalizeEventResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        event_id = %event_id,
        "Handling finalize_event request"
    );

    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let response: FinalizeEventResponse =
        finalize_event(app_state.registry.as_ref(), &event_id, &actor)?;

    if response.newly_finalized {
        app_state.broadcaster.broadcast(&LiveEvent::EventFinalized {
            event_id: response.event_id.clone(),
        });
    }

    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/attendance", post(handle_create_attendance))
        .route("/attendance/{event_id}/{vendor_id}", get(handle_get_attendance))
        .route(
            "/attendance/{event_id}/{vendor_id}/actions",
            get(handle_get_actions),
        )
        .route("/attendance/{event_id}/{vendor_id}/mark-in", post(handle_mark_in))
        .route(
            "/attendance/{event_id}/{vendor_id}/mark-out",
            post(handle_mark_out),
        )
        .route("/attendance/{event_id}/{vendor_id}/confirm", post(handle_confirm))
        .route("/attendance/{event_id}/{vendor_id}/dispute", post(handle_dispute))
        .route(
            "/events/{event_id}/attendance",
            get(handle_list_event_attendance),
        )
        .route("/events/{event_id}/finalized", post(handle_finalize_event))
        .route("/live", get(live_events_handler))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing attendance server");

    let persistence: PersistenceStore = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        PersistenceStore::file(PathBuf::from(db_path))?
    } else {
        info!("Using in-memory database");
        PersistenceStore::shared(Persistence::new_in_memory()?)
    };

    let config: ExecutionConfig = args.execution_config();
    info!(
        max_conflict_retries = config.max_conflict_retries,
        location_timeout_ms = args.location_timeout_ms,
        max_clock_skew_secs = args.max_clock_skew_secs,
        "Execution limits"
    );

    let app_state: AppState = AppState {
        persistence,
        registry: Arc::new(FinalizationRegistry::new()),
        broadcaster: Arc::new(LiveEventBroadcaster::new()),
        config,
    };

    let app: Router = build_router(app_state);

    let addr: SocketAddr = SocketAddr::new(args.bind, args.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

