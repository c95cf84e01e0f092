// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response data transfer objects.

use attendance_audit::{ActionType, AttendanceAction};
use attendance_domain::{
    AttendanceRecord, AttendanceStatus, Dispute, Location, MarkFact, Role, Schedule,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// API request to open an attendance record for a booked vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAttendanceRequest {
    /// The event the vendor is booked for.
    pub event_id: String,
    /// The booked vendor.
    pub vendor_id: String,
    /// The customer who owns the event.
    pub customer_id: String,
    /// Scheduled start, RFC 3339 or local `YYYY-MM-DDTHH:MM:SS`.
    pub scheduled_start: String,
    /// Scheduled end, RFC 3339 or local `YYYY-MM-DDTHH:MM:SS`.
    pub scheduled_end: String,
    /// IANA time zone for local scheduled times.
    pub timezone: Option<String>,
}

/// API request to submit a Mark-In or Mark-Out.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubmitMarkRequest {
    /// The instant the vendor claims. Defaults to the server receipt time.
    pub claimed_at: Option<String>,
    /// IANA time zone for a local `claimed_at`.
    pub timezone: Option<String>,
    /// Optional free-text notes.
    pub notes: Option<String>,
}

/// API request to confirm a submitted fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmRequest {
    /// The fact being confirmed: `mark_in` or `mark_out`.
    pub fact: String,
    /// Optional free-text notes.
    pub notes: Option<String>,
}

/// API request to dispute a submitted fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeRequest {
    /// The fact being disputed: `mark_in` or `mark_out`.
    pub fact: String,
    /// Why the fact is disputed.
    pub reason: String,
}

/// A read projection of one attendance record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceView {
    /// The record's database id.
    pub record_id: i64,
    /// The event the vendor is booked for.
    pub event_id: String,
    /// The booked vendor.
    pub vendor_id: String,
    /// The customer who owns the event.
    pub customer_id: String,
    /// The booked service window.
    pub schedule: Schedule,
    /// Current status.
    pub status: AttendanceStatus,
    /// The vendor's arrival claim.
    pub mark_in: Option<MarkFact>,
    /// The vendor's departure claim.
    pub mark_out: Option<MarkFact>,
    /// Signed minutes late at Mark-In. Negative means early.
    pub delay_minutes: Option<i64>,
    /// Signed minutes past the scheduled end at Mark-Out.
    pub overtime_minutes: Option<i64>,
    /// Minutes between the confirmed facts. Absent until both are confirmed.
    pub service_duration_minutes: Option<i64>,
    /// Whether a dispute froze the record.
    pub is_disputed: bool,
    /// The dispute, if any.
    pub dispute: Option<Dispute>,
    /// Whether no command can change the record any more.
    pub is_closed: bool,
    /// Whether the event's vendor roster is finalized, read at query time.
    pub is_finalized: bool,
    /// When the record was opened.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the record last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// The record's concurrency version.
    pub version: i64,
}

impl AttendanceView {
    /// Projects a persisted record.
    #[must_use]
    pub fn from_record(record: &AttendanceRecord, record_id: i64, is_finalized: bool) -> Self {
        Self {
            record_id,
            event_id: record.event_id.value().to_string(),
            vendor_id: record.vendor_id.value().to_string(),
            customer_id: record.customer_id.value().to_string(),
            schedule: record.schedule,
            status: record.status,
            mark_in: record.mark_in.clone(),
            mark_out: record.mark_out.clone(),
            delay_minutes: record.delay_minutes,
            overtime_minutes: record.overtime_minutes,
            service_duration_minutes: record.service_duration_minutes(),
            is_disputed: record.is_disputed(),
            dispute: record.dispute.clone(),
            is_closed: record.status.is_terminal(),
            is_finalized,
            created_at: record.created_at,
            updated_at: record.updated_at,
            version: record.version,
        }
    }
}

/// A read projection of one audit action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionView {
    /// Position in the record's history, starting at 1.
    pub sequence: i64,
    /// What happened.
    pub action_type: ActionType,
    /// When it happened.
    #[serde(with = "time::serde::rfc3339")]
    pub performed_at: OffsetDateTime,
    /// Who did it.
    pub actor_id: String,
    /// The role they acted in.
    pub actor_role: Role,
    /// The client request id that carried the command.
    pub request_id: String,
    /// Where the vendor was, for submissions.
    pub location: Option<Location>,
    /// Notes, or the dispute reason.
    pub notes: Option<String>,
    /// Status before the action.
    pub status_before: AttendanceStatus,
    /// Status after the action.
    pub status_after: AttendanceStatus,
}

impl ActionView {
    /// Projects a persisted action.
    #[must_use]
    pub fn from_action(action: &AttendanceAction) -> Self {
        Self {
            sequence: action.sequence.unwrap_or_default(),
            action_type: action.action_type,
            performed_at: action.performed_at,
            actor_id: action.actor.id.clone(),
            actor_role: action.actor.role,
            request_id: action.cause.id.clone(),
            location: action.location.clone(),
            notes: action.notes.clone(),
            status_before: action.status_before,
            status_after: action.status_after,
        }
    }
}

/// API response for an accepted or replayed command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The record after the command.
    pub attendance: AttendanceView,
    /// The action the command appended.
    pub action: ActionView,
    /// True if the request id had already been applied and nothing was written.
    pub replayed: bool,
    /// A success message.
    pub message: String,
}

/// API response listing an event's attendance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAttendanceResponse {
    /// The event.
    pub event_id: String,
    /// Whether the event's vendor roster is finalized.
    pub is_finalized: bool,
    /// One view per booked vendor, ordered by vendor id.
    pub records: Vec<AttendanceView>,
}

/// API response with a record's audit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionHistoryResponse {
    /// The record's event.
    pub event_id: String,
    /// The record's vendor.
    pub vendor_id: String,
    /// The record's database id.
    pub record_id: i64,
    /// Every action, ordered by sequence.
    pub actions: Vec<ActionView>,
}

/// API response after the upstream finalization hook fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeEventResponse {
    /// The event.
    pub event_id: String,
    /// False if the event was already finalized.
    pub newly_finalized: bool,
    /// A success message.
    pub message: String,
}
