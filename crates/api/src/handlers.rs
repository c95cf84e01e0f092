// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handlers: command execution and read projections.

use std::time::Duration;

use attendance::{
    Command, TransitionContext, TransitionPolicy, TransitionResult, apply, open_record,
};
use attendance_audit::{ActionType, AttendanceAction, Cause};
use attendance_domain::{
    AttendanceRecord, EventId, Location, MarkKind, RecordKey, Role, Schedule, VendorId,
    parse_event_instant, validate_identifier,
};
use attendance_persistence::{PersistedTransition, Persistence, PersistenceError};
use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::auth::AuthenticatedActor;
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::gate::{FinalizationGate, FinalizationRegistry};
use crate::location::DEFAULT_LOCATION_TIMEOUT;
use crate::notify::{AttendanceNotification, NotificationSink};
use crate::request_response::{
    ActionHistoryResponse, ActionView, AttendanceView, CommandResponse, ConfirmRequest,
    CreateAttendanceRequest, DisputeRequest, EventAttendanceResponse, FinalizeEventResponse,
    SubmitMarkRequest,
};

/// Default number of reload-and-retry rounds after a lost optimistic write.
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 2;

/// Limits and timeouts for command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// How many times a command is re-applied after a concurrency conflict.
    pub max_conflict_retries: u32,
    /// Bound on location acquisition for submissions.
    pub location_timeout: Duration,
    /// Validation limits handed to the transition engine.
    pub policy: TransitionPolicy,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
            policy: TransitionPolicy::default(),
        }
    }
}

/// The collaborators a command is executed against.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Read before every command.
    pub gate: &'a dyn FinalizationGate,
    /// Told about every accepted, non-replayed transition.
    pub notifications: &'a dyn NotificationSink,
    /// Retry and validation limits.
    pub config: &'a ExecutionConfig,
}

/// Builds a record key from path segments.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if either id is blank or too long.
pub fn parse_record_key(event_id: &str, vendor_id: &str) -> Result<RecordKey, ApiError> {
    validate_identifier("Event id", event_id).map_err(translate_domain_error)?;
    validate_identifier("Vendor id", vendor_id).map_err(translate_domain_error)?;
    Ok(RecordKey::new(EventId::new(event_id), VendorId::new(vendor_id)))
}

/// Builds a Mark-In or Mark-Out submission command.
///
/// A missing `claimed_at` means the vendor is claiming the receipt instant.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if `claimed_at` cannot be parsed.
pub fn submit_command(
    kind: MarkKind,
    request: &SubmitMarkRequest,
    location: Option<Location>,
    received_at: OffsetDateTime,
) -> Result<Command, ApiError> {
    let claimed_at: OffsetDateTime = match request.claimed_at.as_deref() {
        Some(value) => parse_event_instant(value, request.timezone.as_deref())
            .map_err(translate_domain_error)?,
        None => received_at,
    };
    let notes: Option<String> = request.notes.clone();
    Ok(match kind {
        MarkKind::MarkIn => Command::SubmitMarkIn {
            claimed_at,
            location,
            notes,
        },
        MarkKind::MarkOut => Command::SubmitMarkOut {
            claimed_at,
            location,
            notes,
        },
    })
}

/// Builds a confirmation command.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if the fact is not `mark_in` or `mark_out`.
pub fn confirm_command(request: &ConfirmRequest) -> Result<Command, ApiError> {
    let fact: MarkKind = request.fact.parse().map_err(translate_domain_error)?;
    Ok(Command::Confirm {
        fact,
        notes: request.notes.clone(),
    })
}

/// Builds a dispute command. The reason is validated by the engine.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if the fact is not `mark_in` or `mark_out`.
pub fn dispute_command(request: &DisputeRequest) -> Result<Command, ApiError> {
    let fact: MarkKind = request.fact.parse().map_err(translate_domain_error)?;
    Ok(Command::RaiseDispute {
        fact,
        reason: request.reason.clone(),
    })
}

/// Opens an attendance record for a booked vendor.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `gate` - The finalization gate for the event
/// * `request` - The record to open
/// * `actor` - The authenticated actor, who must be an admin
/// * `cause` - The request that carries the operation
/// * `received_at` - When the server received the request
///
/// # Errors
///
/// Returns an error if:
/// - The event is not finalized
/// - The actor is not an admin
/// - The schedule or any identifier is invalid
/// - A record already exists for the `(event, vendor)` pair
pub fn create_attendance_record(
    persistence: &mut Persistence,
    gate: &dyn FinalizationGate,
    request: &CreateAttendanceRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    received_at: OffsetDateTime,
) -> Result<AttendanceView, ApiError> {
    let timezone: Option<&str> = request.timezone.as_deref();
    let start: OffsetDateTime =
        parse_event_instant(&request.scheduled_start, timezone).map_err(translate_domain_error)?;
    let end: OffsetDateTime =
        parse_event_instant(&request.scheduled_end, timezone).map_err(translate_domain_error)?;
    let schedule: Schedule = Schedule::new(start, end).map_err(translate_domain_error)?;

    let is_finalized: bool = gate.is_finalized(&EventId::new(&request.event_id));
    let context: TransitionContext =
        TransitionContext::new(actor.to_audit_actor(), cause, is_finalized, received_at);

    let record: AttendanceRecord = open_record(
        &request.event_id,
        &request.vendor_id,
        &request.customer_id,
        schedule,
        &context,
    )
    .map_err(translate_core_error)?;

    let stored: AttendanceRecord = persistence
        .create_record(&record)
        .map_err(log_persistence_error)?;
    let record_id: i64 = require_record_id(&stored)?;

    info!(
        record_id,
        event_id = stored.event_id.value(),
        vendor_id = stored.vendor_id.value(),
        actor = %actor.id,
        "Opened attendance record"
    );

    Ok(AttendanceView::from_record(&stored, record_id, is_finalized))
}

/// Executes one command against the record identified by `key`.
///
/// The request id in `cause` makes execution idempotent: if it was already
/// applied to the record, the stored action is returned and nothing is
/// written. A lost optimistic write reloads the record and re-applies the
/// command, up to the configured number of retries.
///
/// # Errors
///
/// Returns an error if:
/// - The record does not exist
/// - The request id was already used for a different action or actor
/// - The engine refuses the command (gate, authorization, state, validation)
/// - Concurrent writers won every retry
/// - The database fails
pub fn execute_command(
    persistence: &mut Persistence,
    collaborators: &Collaborators<'_>,
    key: &RecordKey,
    command: &Command,
    actor: &AuthenticatedActor,
    cause: &Cause,
    received_at: OffsetDateTime,
) -> Result<CommandResponse, ApiError> {
    let action_type: ActionType = command.action_type();
    let mut retries: u32 = 0;

    loop {
        let record: AttendanceRecord = persistence
            .get_record(key)
            .map_err(log_persistence_error)?;
        let record_id: i64 = require_record_id(&record)?;

        if let Some(existing) = persistence
            .find_action_by_request_id(record_id, &cause.id)
            .map_err(log_persistence_error)?
        {
            return replay(
                &record,
                record_id,
                &existing,
                command,
                actor,
                collaborators.gate,
            );
        }

        let is_finalized: bool = collaborators.gate.is_finalized(&record.event_id);
        let context: TransitionContext = TransitionContext::new(
            actor.to_audit_actor(),
            cause.clone(),
            is_finalized,
            received_at,
        );
        let result: TransitionResult = apply(
            &record,
            command.clone(),
            &context,
            &collaborators.config.policy,
        )
        .map_err(translate_core_error)?;

        match persistence.persist_transition(&result) {
            Ok(persisted) => {
                return accepted(persisted, is_finalized, collaborators.notifications);
            }
            Err(err)
                if is_retryable(&err) && retries < collaborators.config.max_conflict_retries =>
            {
                retries += 1;
                warn!(
                    record_id,
                    action = %action_type,
                    attempt = retries,
                    error = %err,
                    "Lost a concurrent write; reloading and retrying"
                );
            }
            Err(err) => return Err(log_persistence_error(err)),
        }
    }
}

/// Returns the projection of one record.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the record does not exist.
pub fn get_attendance(
    persistence: &mut Persistence,
    gate: &dyn FinalizationGate,
    key: &RecordKey,
) -> Result<AttendanceView, ApiError> {
    let record: AttendanceRecord = persistence
        .get_record(key)
        .map_err(log_persistence_error)?;
    let record_id: i64 = require_record_id(&record)?;
    Ok(AttendanceView::from_record(
        &record,
        record_id,
        gate.is_finalized(&record.event_id),
    ))
}

/// Lists every record of an event, ordered by vendor id.
///
/// # Errors
///
/// Returns an error if the event id is invalid or the query fails.
pub fn list_event_attendance(
    persistence: &mut Persistence,
    gate: &dyn FinalizationGate,
    event_id: &str,
) -> Result<EventAttendanceResponse, ApiError> {
    validate_identifier("Event id", event_id).map_err(translate_domain_error)?;
    let event_id: EventId = EventId::new(event_id);
    let is_finalized: bool = gate.is_finalized(&event_id);

    let records: Vec<AttendanceRecord> = persistence
        .list_records_for_event(&event_id)
        .map_err(log_persistence_error)?;
    let records: Vec<AttendanceView> = records
        .iter()
        .map(|record| {
            require_record_id(record)
                .map(|record_id| AttendanceView::from_record(record, record_id, is_finalized))
        })
        .collect::<Result<_, _>>()?;

    Ok(EventAttendanceResponse {
        event_id: event_id.value().to_string(),
        is_finalized,
        records,
    })
}

/// Returns a record's audit history in sequence order.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the record does not exist.
pub fn get_action_history(
    persistence: &mut Persistence,
    key: &RecordKey,
) -> Result<ActionHistoryResponse, ApiError> {
    let record: AttendanceRecord = persistence
        .get_record(key)
        .map_err(log_persistence_error)?;
    let record_id: i64 = require_record_id(&record)?;
    let actions: Vec<AttendanceAction> = persistence
        .get_actions(record_id)
        .map_err(log_persistence_error)?;

    Ok(ActionHistoryResponse {
        event_id: record.event_id.value().to_string(),
        vendor_id: record.vendor_id.value().to_string(),
        record_id,
        actions: actions.iter().map(ActionView::from_action).collect(),
    })
}

/// Opens the finalization gate for an event.
///
/// This is the hook the upstream finalization service calls. Opening an
/// already open gate is a no-op.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the event id is invalid.
pub fn finalize_event(
    registry: &FinalizationRegistry,
    event_id: &str,
    actor: &AuthenticatedActor,
) -> Result<FinalizeEventResponse, ApiError> {
    if actor.role != Role::Admin {
        return Err(ApiError::Unauthorized {
            action: String::from("finalize_event"),
            message: format!(
                "{} '{}' may not finalize an event: only admin may finalize events",
                actor.role, actor.id
            ),
        });
    }
    validate_identifier("Event id", event_id).map_err(translate_domain_error)?;

    let event_id: EventId = EventId::new(event_id);
    let newly_finalized: bool = registry.mark_finalized(event_id.clone());
    let message: String = if newly_finalized {
        format!("Event '{}' finalized; attendance is open", event_id.value())
    } else {
        format!("Event '{}' was already finalized", event_id.value())
    };

    Ok(FinalizeEventResponse {
        event_id: event_id.value().to_string(),
        newly_finalized,
        message,
    })
}

fn replay(
    record: &AttendanceRecord,
    record_id: i64,
    existing: &AttendanceAction,
    command: &Command,
    actor: &AuthenticatedActor,
    gate: &dyn FinalizationGate,
) -> Result<CommandResponse, ApiError> {
    let action_type: ActionType = command.action_type();
    // Both dispute facts share one action type; a record holds at most one
    // dispute, so it names the fact the stored request disputed.
    let same_target: bool = match command {
        Command::RaiseDispute { fact, .. } => record
            .dispute
            .as_ref()
            .is_some_and(|dispute| dispute.fact == *fact),
        Command::SubmitMarkIn { .. } | Command::SubmitMarkOut { .. } | Command::Confirm { .. } => {
            true
        }
    };
    if existing.action_type != action_type || existing.actor.id != actor.id || !same_target {
        return Err(ApiError::InvalidInput {
            field: String::from("request_id"),
            message: format!(
                "Request '{}' was already used by {} '{}' for {} on this record",
                existing.cause.id, existing.actor.role, existing.actor.id, existing.action_type
            ),
        });
    }

    info!(
        record_id,
        request_id = %existing.cause.id,
        action = %action_type,
        "Replaying already applied request"
    );

    Ok(CommandResponse {
        attendance: AttendanceView::from_record(
            record,
            record_id,
            gate.is_finalized(&record.event_id),
        ),
        action: ActionView::from_action(existing),
        replayed: true,
        message: format!("Request '{}' was already applied", existing.cause.id),
    })
}

fn accepted(
    persisted: PersistedTransition,
    is_finalized: bool,
    notifications: &dyn NotificationSink,
) -> Result<CommandResponse, ApiError> {
    let PersistedTransition { record, action } = persisted;
    let record_id: i64 = require_record_id(&record)?;

    info!(
        record_id,
        event_id = record.event_id.value(),
        vendor_id = record.vendor_id.value(),
        action = %action.action_type,
        status = %record.status,
        version = record.version,
        "Attendance transition accepted"
    );

    let notification: AttendanceNotification =
        AttendanceNotification::for_transition(&record, record_id, &action);
    if let Err(err) = notifications.notify(&notification) {
        warn!(record_id, error = %err, "Failed to dispatch attendance notification");
    }

    Ok(CommandResponse {
        message: format!(
            "{} accepted; attendance is now {}",
            action.action_type, record.status
        ),
        attendance: AttendanceView::from_record(&record, record_id, is_finalized),
        action: ActionView::from_action(&action),
        replayed: false,
    })
}

const fn is_retryable(err: &PersistenceError) -> bool {
    matches!(
        err,
        PersistenceError::ConcurrencyConflict { .. } | PersistenceError::DuplicateRequest { .. }
    )
}

fn require_record_id(record: &AttendanceRecord) -> Result<i64, ApiError> {
    record.record_id.ok_or_else(|| ApiError::Internal {
        message: format!("Attendance record for {} has no database id", record.key()),
    })
}

fn log_persistence_error(err: PersistenceError) -> ApiError {
    let api_error: ApiError = translate_persistence_error(err);
    if matches!(api_error, ApiError::Internal { .. }) {
        error!(error = %api_error, "Persistence failure");
    }
    api_error
}
