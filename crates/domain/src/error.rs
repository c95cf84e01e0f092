// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;

/// Errors that can occur during domain validation.
///
/// Every variant describes a precondition the caller can act on. None of
/// them are raised after a state mutation has started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// An identifier is empty or malformed.
    #[error("Invalid {field}: {reason}")]
    InvalidIdentifier {
        /// The identifier field that failed validation.
        field: &'static str,
        /// Why the identifier was rejected.
        reason: String,
    },
    /// The scheduled window is not a forward interval.
    #[error("Invalid schedule: {reason}")]
    InvalidSchedule {
        /// Why the schedule was rejected.
        reason: String,
    },
    /// A timestamp could not be parsed.
    #[error("Failed to parse timestamp '{value}': {reason}")]
    InvalidTimestamp {
        /// The raw timestamp value.
        value: String,
        /// The parser's complaint.
        reason: String,
    },
    /// A local date-time was supplied without a time zone.
    #[error("Local time '{value}' requires a time zone")]
    MissingTimezone {
        /// The raw timestamp value.
        value: String,
    },
    /// The time zone name is not a known IANA zone.
    #[error("Unknown time zone '{0}'")]
    UnknownTimezone(String),
    /// A local time occurs twice in the zone (DST fall-back).
    #[error("Local time '{value}' is ambiguous in time zone {timezone}")]
    AmbiguousLocalTime {
        /// The raw timestamp value.
        value: String,
        /// The zone it was resolved in.
        timezone: String,
    },
    /// A local time does not exist in the zone (DST spring-forward).
    #[error("Local time '{value}' does not exist in time zone {timezone}")]
    NonexistentLocalTime {
        /// The raw timestamp value.
        value: String,
        /// The zone it was resolved in.
        timezone: String,
    },
    /// Coordinates are out of range or not finite.
    #[error("Invalid coordinates: {reason}")]
    InvalidCoordinates {
        /// Why the coordinates were rejected.
        reason: String,
    },
    /// A dispute was raised without a reason.
    #[error("A dispute requires a non-empty reason")]
    EmptyDisputeReason,
    /// A free-text field exceeded its maximum length.
    #[error("{field} is {length} characters long; the maximum is {max}")]
    TextTooLong {
        /// The field that was too long.
        field: &'static str,
        /// The submitted length in characters.
        length: usize,
        /// The allowed maximum.
        max: usize,
    },
    /// A submitted instant lies too far ahead of the server clock.
    #[error("Claimed time {claimed} is ahead of the server receipt time {received}")]
    ClaimedTimeInFuture {
        /// The instant the vendor claimed.
        claimed: OffsetDateTime,
        /// The instant the server received the submission.
        received: OffsetDateTime,
    },
    /// A Mark-Out was claimed before the confirmed Mark-In.
    #[error("Mark-Out at {mark_out} is earlier than the confirmed Mark-In at {mark_in}")]
    MarkOutBeforeMarkIn {
        /// The confirmed Mark-In instant.
        mark_in: OffsetDateTime,
        /// The claimed Mark-Out instant.
        mark_out: OffsetDateTime,
    },
    /// An attendance status string is not recognised.
    #[error("Invalid attendance status: {0}")]
    InvalidStatus(String),
    /// A role string is not recognised.
    #[error("Invalid role '{0}'. Must be 'vendor', 'customer' or 'admin'")]
    InvalidRole(String),
    /// A fact string is not recognised.
    #[error("Invalid attendance fact '{0}'. Must be 'mark_in' or 'mark_out'")]
    InvalidMarkKind(String),
    /// A record violates one of the attendance invariants.
    #[error("Attendance invariant violated: {0}")]
    InvariantViolation(String),
}
